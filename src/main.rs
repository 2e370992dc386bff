use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use locale_json_translator::server::{self, ProcessRequest, ServerState};
use locale_json_translator::settings;

#[derive(Parser, Debug)]
#[command(
    name = "locale-json-translator",
    version,
    about = "Translate or fill in locale JSON files with an LLM"
)]
struct Cli {
    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the processing endpoint over HTTP
    Serve {
        /// Listen address (default: settings [server] addr)
        #[arg(short = 'a', long = "addr")]
        addr: Option<String>,

        /// Default API key (overrides OPENAI_KEY / OPENAI_API_KEY)
        #[arg(short = 'k', long = "key")]
        key: Option<String>,
    },
    /// Process one locale JSON document and print the result
    Translate {
        /// Language of the keys/values in the input
        #[arg(short = 'L', long = "input-lang")]
        input_language: String,

        /// Target language
        #[arg(short = 'l', long = "lang")]
        output_language: String,

        /// Processing mode
        #[arg(
            short = 'm',
            long = "mode",
            default_value = "translate",
            value_parser = ["translate", "fillEmpty"]
        )]
        mode: String,

        /// API key (overrides environment variables)
        #[arg(short = 'k', long = "key")]
        key: Option<String>,

        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    locale_json_translator::logging::init(cli.verbose)?;

    let mut settings = settings::load_settings(cli.read_settings.as_deref())?;
    settings.apply_env();

    match cli.command {
        Command::Serve { addr, key } => {
            let default_key = settings::resolve_default_key(&settings, key.as_deref());
            if default_key.is_none() {
                tracing::warn!("no default API key configured; every request must supply one");
            }
            let addr = addr.unwrap_or_else(|| settings.addr.clone());
            let state = ServerState::from_settings(&settings, default_key);
            server::run_server(state, &addr).await
        }
        Command::Translate {
            input_language,
            output_language,
            mode,
            key,
            file,
        } => {
            let text = read_input(file)?;
            let default_key = settings::resolve_default_key(&settings, None);
            let state = ServerState::from_settings(&settings, default_key);
            let request = ProcessRequest {
                text: Some(text),
                input_language: Some(input_language),
                output_language: Some(output_language),
                mode: Some(mode),
                key,
            };
            let (_, response) = server::handle_request(&state, request).await;
            match (response.data, response.error) {
                (Some(data), _) => {
                    println!("{}", data);
                    Ok(())
                }
                (None, error) => Err(anyhow!(error.unwrap_or_default())),
            }
        }
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read input: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .with_context(|| "failed to read stdin")?;
            Ok(buffer)
        }
    }
}
