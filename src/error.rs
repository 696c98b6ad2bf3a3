//! Unified client error handling
//!
//! Every failure an action can hit maps onto one variant here, and every
//! variant has a message fit for the error region of the page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Required input missing; raised before any network I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status})")]
    Server { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to save document: {0}")]
    Download(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::Download(_) => "DOWNLOAD_ERROR",
        }
    }

    /// Message shown in the error region.
    ///
    /// A server-supplied message is shown verbatim; without one the
    /// status code is reported.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Network(msg) => format!("Could not reach the analysis service: {}", msg),
            Self::Server {
                message: Some(msg), ..
            } => msg.clone(),
            Self::Server {
                status,
                message: None,
            } => format!("HTTP error: status {}", status),
            Self::MalformedResponse(msg) => {
                format!("Invalid response from the analysis service: {}", msg)
            }
            Self::Download(msg) => format!("Could not save the synopsis: {}", msg),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Download(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = ClientError::Server {
            status: 500,
            message: Some("drug not found".to_string()),
        };
        assert_eq!(err.user_message(), "drug not found");
        assert_eq!(err.error_code(), "SERVER_ERROR");
    }

    #[test]
    fn missing_server_message_falls_back_to_status() {
        let err = ClientError::Server {
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message(), "HTTP error: status 502");
    }

    #[test]
    fn validation_message_is_unprefixed() {
        let err = ClientError::validation("Please enter the drug INN");
        assert_eq!(err.user_message(), "Please enter the drug INN");
    }
}
