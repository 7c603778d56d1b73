use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use crate::chat::{ChatSession, RelayClient, TerminalView};

pub async fn run(url: &str, model: &str, max_tokens: u32) -> Result<()> {
    // Keep logs off stdout where the transcript is printed
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let mut rl = DefaultEditor::new()?;
    let client = RelayClient::new(url);
    let mut session = ChatSession::new(model, max_tokens);
    let mut view = TerminalView::stdout();

    tracing::debug!("Chatting via {}", client.url());

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                session.send(&line, &client, &mut view).await;
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
