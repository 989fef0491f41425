//! API client for Plaza servers

mod plaza;

pub use plaza::{login, CurrentUser, LoginResponse, PlazaClient, ProfileUpdate};

use thiserror::Error;

/// Errors produced at the Plaza API seam
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, bad body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local file for an upload could not be read
    #[error("could not read {path}: {source}")]
    Upload {
        /// Path the user supplied
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The server answered with a non-success status
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message parsed from the response body
        message: String,
    },
}

impl ApiError {
    /// Build a rejection from a status code and raw response body
    pub(crate) fn rejected(status: u16, body: &str) -> Self {
        Self::Rejected {
            status,
            message: detail_message(body, status),
        }
    }

    /// HTTP status of a server rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server answered 401
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether the server answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the server answered 409
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Extract the human-readable message from an error body.
///
/// Plaza sends either `{"detail": "..."}` or `{"detail": {"message": "...", ...}}`;
/// anything else falls back to a generic message carrying the status.
fn detail_message(body: &str, status: u16) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            serde_json::Value::String(s) => return s,
            serde_json::Value::Object(map) => {
                if let Some(message) = map.get("message").and_then(|v| v.as_str()) {
                    return message.to_string();
                }
            }
            _ => {}
        }
    }

    format!("Request failed (HTTP {status})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let err = ApiError::rejected(409, r#"{"detail": "Already liked."}"#);
        assert_eq!(err.to_string(), "Already liked.");
        assert!(err.is_conflict());
    }

    #[test]
    fn test_detail_object_with_message() {
        let body = r#"{"detail": {"message": "Image rejected by moderation.", "code": 7}}"#;
        let err = ApiError::rejected(400, body);
        assert_eq!(err.to_string(), "Image rejected by moderation.");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_detail_malformed_falls_back() {
        let err = ApiError::rejected(500, "<html>oops</html>");
        assert_eq!(err.to_string(), "Request failed (HTTP 500)");
    }

    #[test]
    fn test_detail_object_without_message_falls_back() {
        let err = ApiError::rejected(422, r#"{"detail": {"loc": ["body"]}}"#);
        assert_eq!(err.to_string(), "Request failed (HTTP 422)");
    }

    #[test]
    fn test_status_predicates() {
        assert!(ApiError::rejected(401, "{}").is_unauthorized());
        assert!(ApiError::rejected(404, "{}").is_not_found());
        assert!(!ApiError::rejected(404, "{}").is_conflict());
    }
}
