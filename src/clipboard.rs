use arboard::Clipboard;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::errors::AppError;

/// Clipboard capability used by paste and copy.
#[async_trait]
pub trait ClipboardAccess: Send + Sync {
    async fn read_text(&self) -> Result<String, AppError>;
    fn write_text(&self, text: &str) -> Result<(), AppError>;
}

/// OS clipboard through `arboard`. A fresh handle is opened per call.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Fails when no clipboard is reachable (e.g. headless session).
    pub fn probe() -> Result<Self, AppError> {
        Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
        Ok(Self)
    }
}

fn read_text_impl() -> Result<String, AppError> {
    let mut clipboard = Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    clipboard
        .get_text()
        .map_err(|e| AppError::Clipboard(e.to_string()))
}

#[async_trait]
impl ClipboardAccess for SystemClipboard {
    async fn read_text(&self) -> Result<String, AppError> {
        tokio::task::spawn_blocking(read_text_impl)
            .await
            .map_err(|e| AppError::Clipboard(format!("Clipboard read task failed: {}", e)))?
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        let mut clipboard = Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }
}

/// In-process clipboard for sessions without a display.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(text.into()),
        }
    }
}

#[async_trait]
impl ClipboardAccess for MemoryClipboard {
    async fn read_text(&self) -> Result<String, AppError> {
        self.content
            .lock()
            .map(|content| content.clone())
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        let mut content = self
            .content
            .lock()
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        *content = text.to_string();
        Ok(())
    }
}
