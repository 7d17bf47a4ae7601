use std::io::{self, Write};

use eyre::Result;
use log::{debug, warn};

use crate::output;
use crate::voice::{Unavailable, VoiceInput};

/// What the user picked from the input menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMethod {
    Text,
    Voice,
}

impl InputMethod {
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(InputMethod::Text),
            "2" => Some(InputMethod::Voice),
            _ => None,
        }
    }
}

/// A usable way of obtaining the query
#[derive(Debug, Clone)]
pub enum QuerySource {
    Text,
    Voice(VoiceInput),
}

impl QuerySource {
    /// Resolve `method` to a source, probing the voice capability.
    pub fn select(method: InputMethod) -> Self {
        Self::select_with(method, VoiceInput::detect)
    }

    /// Voice falls back to text when `detect` reports it unavailable.
    pub fn select_with(method: InputMethod, detect: impl FnOnce() -> Result<VoiceInput, Unavailable>) -> Self {
        match method {
            InputMethod::Text => QuerySource::Text,
            InputMethod::Voice => match detect() {
                Ok(voice) => QuerySource::Voice(voice),
                Err(reason) => {
                    warn!("Voice input unavailable: {reason}");
                    output::notice(&format!("Voice input unavailable: {reason}. Falling back to text input."));
                    QuerySource::Text
                }
            },
        }
    }

    /// Obtain one query; `None` means nothing usable was entered
    pub async fn read_query(&self, client: &reqwest::Client) -> Result<Option<String>> {
        match self {
            QuerySource::Text => {
                output::text_prompt();
                let line = read_line("> ").await?;
                Ok(normalize_query(&line))
            }
            QuerySource::Voice(voice) => {
                output::listening();
                match voice.listen(client).await {
                    Ok(text) => {
                        output::heard(&text);
                        Ok(normalize_query(&text))
                    }
                    Err(e) => {
                        warn!("Voice recognition failed: {e:#}");
                        output::error_line(&format!("Error during voice recognition: {e}"));
                        Ok(None)
                    }
                }
            }
        }
    }
}

/// Show the menu and read the query through the chosen strategy
pub async fn acquire_query(client: &reqwest::Client) -> Result<Option<String>> {
    output::header();
    output::menu();

    let choice = read_line("Select option (1-2): ").await?;
    let method = InputMethod::from_choice(&choice).unwrap_or_else(|| {
        output::notice("Invalid choice. Using text input instead.");
        InputMethod::Text
    });
    debug!("Input method: {method:?}");

    QuerySource::select(method).read_query(client).await
}

pub fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim();
    (!query.is_empty()).then(|| query.to_string())
}

/// Read one line from stdin without parking the async runtime
async fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(line)
}
