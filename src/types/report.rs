use crate::error::{ClipError, ErrorKind};
use serde::Serialize;

/// Flat `{success, ...}` record handed to the shell.
///
/// Success carries the payload fields inline; failure carries the error
/// message verbatim plus its [`ErrorKind`].
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T: Serialize> From<Result<T, ClipError>> for Report<T> {
    fn from(result: Result<T, ClipError>) -> Self {
        match result {
            Ok(data) => Report {
                success: true,
                data: Some(data),
                error: None,
                kind: None,
            },
            Err(e) => Report {
                success: false,
                data: None,
                error: Some(e.to_string()),
                kind: Some(e.kind()),
            },
        }
    }
}
