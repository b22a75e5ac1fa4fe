use std::process::{Command, Stdio};
use std::thread;
use tracing::info;

use crate::errors::AppError;

/// Hands a URL to something that can show it (browser, share sheet, ...).
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), AppError>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default)]
pub struct SystemOpener;

fn opener_program() -> &'static str {
    if cfg!(target_os = "windows") {
        // No shell in between, `&` in share URLs must reach the handler
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new(opener_program());
    cmd.arg(url);
    cmd
}

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), AppError> {
        let mut child = opener_command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Share(format!("Failed to launch URL opener: {}", e)))?;

        info!("Opened share URL (opener PID: {})", child.id());

        // Reap the opener in the background
        thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(())
    }
}
