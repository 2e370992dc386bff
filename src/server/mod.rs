mod handlers;
mod models;
mod process;
mod state;

pub use handlers::{router, run_server};
pub use models::{ProcessRequest, ProcessResponse};
pub use process::{handle_request, process_request};
pub use state::ServerState;
