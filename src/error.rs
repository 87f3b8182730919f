use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ClipError {
    #[error("{0} is not set")]
    MissingConfig(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("config file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("title property not found in database schema")]
    TitlePropertyNotFound,

    #[error("memo property {0:?} is the database's title property")]
    MemoIsTitleProperty(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notion API error: {0}")]
    NotionServerError(NotionError),

    #[error("selection capture failed: {0}")]
    Capture(String),

    #[error("selection capture timed out after {0:?}")]
    CaptureTimeout(Duration),

    #[error("no text selected")]
    EmptySelection,
}

impl From<figment::Error> for ClipError {
    fn from(e: figment::Error) -> Self {
        ClipError::Config(Box::new(e))
    }
}

/// Coarse classification of a failure, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Schema,
    Transport,
    Capture,
}

impl ClipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipError::MissingConfig(_) | ClipError::Config(_) | ClipError::EnvFile(_) => {
                ErrorKind::Configuration
            }
            ClipError::TitlePropertyNotFound | ClipError::MemoIsTitleProperty(_) => {
                ErrorKind::Schema
            }
            ClipError::UrlParse(_)
            | ClipError::Reqwest(_)
            | ClipError::Json(_)
            | ClipError::Io(_)
            | ClipError::NotionServerError(_) => ErrorKind::Transport,
            ClipError::Capture(_) | ClipError::CaptureTimeout(_) | ClipError::EmptySelection => {
                ErrorKind::Capture
            }
        }
    }
}

/// Notion API error response body.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NotionError {
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for NotionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}
