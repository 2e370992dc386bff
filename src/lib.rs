//! JSON localization helper: validates locale-key payloads, builds a
//! translate or fill-empty prompt, and relays an OpenAI-compatible chat
//! completion back to the caller.

pub mod error;
pub mod logging;
pub mod messages;
pub mod providers;
pub mod server;
pub mod settings;
pub mod translations;
mod translator;

#[cfg(test)]
mod test_util;

pub use error::ProcessError;
pub use messages::Locale;
pub use providers::{OpenAI, Provider, ProviderResponse, ProviderUsage};
pub use server::{ProcessRequest, ProcessResponse, ServerState};
pub use translations::{Mode, PromptEnvelope, TranslateOptions};
pub use translator::Translator;
