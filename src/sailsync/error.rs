use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No recipients given")]
    EmptyRecipientList,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Local template not found: {0}")]
    ContentNotFound(String),

    #[error("Local template {0} had no content after waiting for the save to settle")]
    ContentNotReady(String),

    #[error("Template not found in Sailthru: {0}")]
    RemoteTemplateNotFound(String),

    #[error("Request to Sailthru failed: {0}")]
    Transport(String),

    #[error("Sailthru error: {0}")]
    Provider(String),

    #[error("Invalid template name: {0:?}")]
    InvalidTemplateName(String),

    #[error("Failed to write template {name}: {detail}")]
    Write { name: String, detail: String },

    #[error("{0}")]
    Usage(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Watcher error: {0}")]
    Watch(String),

    #[error("Watched file was removed: {0}")]
    WatchTerminated(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Errors that end the process rather than the current flow.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Config(_) | SyncError::WatchTerminated(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<notify::Error> for SyncError {
    fn from(err: notify::Error) -> Self {
        SyncError::Watch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
