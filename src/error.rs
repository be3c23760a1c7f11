use thiserror::Error;

pub const NO_FILE_MESSAGE: &str = "Please select an image first";
pub const SERVER_FALLBACK_MESSAGE: &str = "Failed to process image";
pub const TRANSPORT_MESSAGE: &str = "Failed to connect to server. Make sure the backend is running.";

/// Why an analysis attempt ended in `Failed`.
///
/// `Display` carries the diagnostic detail for logs; [`AnalysisError::user_message`]
/// is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// No image was selected when analysis was requested. Detected locally.
    #[error("no image selected")]
    NoFileSelected,
    /// The service answered but reported a failure.
    #[error("server reported failure: {}", .0.as_deref().unwrap_or("<no message>"))]
    Server(Option<String>),
    /// The request never produced a usable answer (connect, timeout, bad body).
    #[error("transport failure: {0}")]
    Transport(String),
}

impl AnalysisError {
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::NoFileSelected => NO_FILE_MESSAGE.to_string(),
            AnalysisError::Server(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            AnalysisError::Server(_) => SERVER_FALLBACK_MESSAGE.to_string(),
            AnalysisError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
        }
    }

    /// Short machine-readable kind used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::NoFileSelected => "local_validation",
            AnalysisError::Server(_) => "server_reported",
            AnalysisError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_falls_back_when_missing_or_blank() {
        assert_eq!(
            AnalysisError::Server(Some("model unavailable".into())).user_message(),
            "model unavailable"
        );
        assert_eq!(AnalysisError::Server(None).user_message(), SERVER_FALLBACK_MESSAGE);
        assert_eq!(
            AnalysisError::Server(Some("  ".into())).user_message(),
            SERVER_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn transport_detail_is_not_shown_to_user() {
        let err = AnalysisError::Transport("connection refused (os error 111)".into());
        assert_eq!(err.user_message(), TRANSPORT_MESSAGE);
        assert!(err.to_string().contains("os error 111"));
    }
}
