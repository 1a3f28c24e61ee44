use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Model API error: {0}")]
    ModelApi(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl ScoutError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn model_api_error(msg: impl Into<String>) -> Self {
        Self::ModelApi(msg.into())
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn notification_error(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
