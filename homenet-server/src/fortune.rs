//! Footer fortune from an external command

use homenet_common::config::FortuneConfig;
use tokio::process::Command;
use tracing::{debug, warn};

const BOARD_TEXT_CLASS: &str = "text-gray-300";
const DEFAULT_TEXT_CLASS: &str = "text-gray-600 dark:text-gray-300";

/// Runs the configured fortune command, falling back to fixed text
#[derive(Debug, Clone)]
pub struct Fortune {
    command: String,
    args: Vec<String>,
    fallback: String,
}

impl Fortune {
    pub fn new(config: &FortuneConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.split_whitespace().map(str::to_string).collect(),
            fallback: config.fallback_msg.clone(),
        }
    }

    /// Trimmed command output, or the fallback on any failure or empty output
    pub async fn tell(&self) -> String {
        let output = match Command::new(&self.command).args(&self.args).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(command = %self.command, "Failed to run fortune command: {}", e);
                return self.fallback.clone();
            }
        };

        if !output.status.success() {
            warn!(command = %self.command, status = %output.status, "Fortune command failed");
            return self.fallback.clone();
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            debug!("Fortune command produced no output");
            return self.fallback.clone();
        }

        text
    }
}

/// Board pages have a dark background; everything else follows the theme
pub fn text_class(referer: Option<&str>) -> &'static str {
    match referer {
        Some(r) if r.contains("/movie-board") || r.contains("/tv-shows-board") => BOARD_TEXT_CLASS,
        _ => DEFAULT_TEXT_CLASS,
    }
}
