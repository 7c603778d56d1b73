use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::chat::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_RELAY_URL};
use crate::core::config::DEFAULT_CONFIG_FILE;

#[derive(Subcommand)]
enum Command {
    /// Run the relay server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, env = "PORT", default_value = "3000")]
        port: String,

        /// Config file consulted when ANTHROPIC_API_KEY isn't set
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Start a chat session against a running relay
    Chat {
        /// Chat endpoint of the relay
        #[arg(long, default_value = DEFAULT_RELAY_URL)]
        url: String,

        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Maximum length of each response
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port, config }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat {
            url,
            model,
            max_tokens,
        }) => {
            chat::run(&url, &model, max_tokens).await?;
        }
        None => {}
    }

    Ok(())
}
