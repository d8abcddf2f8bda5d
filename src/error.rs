use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Please enter a description for your image.")]
    EmptyPrompt,
    #[error("An image is already being generated. Please wait for it to finish.")]
    GenerationInProgress,
    #[error("HuggingFace API token not configured")]
    CredentialMissing,
    #[error("Unknown style: {0}")]
    UnknownStyle(String),
    #[error("Unknown image size: {0}")]
    UnknownSize(String),
    #[error("History index {index} out of range (history holds {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by the inference collaborator, already sorted into the
/// category the user gets to see.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("Authentication failed: {0}")]
    Unauthorized(String),
    #[error("Model error: {0}")]
    ModelUnavailable(String),
    #[error("Error generating image: {0}")]
    Unclassified(String),
}

impl GenerationError {
    /// Categorize a raw error message. Matching is case-insensitive and
    /// checked in order: rate limit, authorization, model.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();

        if lowered.contains("rate limit") {
            GenerationError::RateLimited(message)
        } else if lowered.contains("authorization") || lowered.contains("unauthorized") {
            GenerationError::Unauthorized(message)
        } else if lowered.contains("model") {
            GenerationError::ModelUnavailable(message)
        } else {
            GenerationError::Unclassified(message)
        }
    }

    /// Categorize an HTTP failure, preferring the status code when it is
    /// unambiguous.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => GenerationError::RateLimited(message),
            401 | 403 => GenerationError::Unauthorized(message),
            404 | 503 => GenerationError::ModelUnavailable(message),
            _ => Self::classify(message),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GenerationError::RateLimited(msg)
            | GenerationError::Unauthorized(msg)
            | GenerationError::ModelUnavailable(msg)
            | GenerationError::Unclassified(msg) => msg,
        }
    }

    pub fn headline(&self) -> String {
        match self {
            GenerationError::RateLimited(_) => "Rate limit exceeded!".to_string(),
            GenerationError::Unauthorized(_) => "Authentication failed!".to_string(),
            GenerationError::ModelUnavailable(_) => "Model error!".to_string(),
            GenerationError::Unclassified(msg) => format!("Error generating image: {}", msg),
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => {
                "The free tier has limits. Please wait a few minutes and try again."
            }
            GenerationError::Unauthorized(_) => {
                "Your API token may be invalid or expired. Check that the token has Write \
                 permissions, that it is correctly copied to your .env file, and that you \
                 restarted the application after updating .env."
            }
            GenerationError::ModelUnavailable(_) => {
                "The model may be unavailable. This usually resolves itself quickly."
            }
            GenerationError::Unclassified(_) => "Please try again or try a different prompt.",
        }
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_message() {
        assert_eq!(
            GenerationError::classify("Rate Limit reached for free tier"),
            GenerationError::RateLimited("Rate Limit reached for free tier".into())
        );
        assert!(matches!(
            GenerationError::classify("401 Client Error: Unauthorized for url"),
            GenerationError::Unauthorized(_)
        ));
        assert!(matches!(
            GenerationError::classify("Invalid Authorization header"),
            GenerationError::Unauthorized(_)
        ));
        assert!(matches!(
            GenerationError::classify("Model black-forest-labs/FLUX.1-schnell is currently loading"),
            GenerationError::ModelUnavailable(_)
        ));
        assert!(matches!(
            GenerationError::classify("connection reset by peer"),
            GenerationError::Unclassified(_)
        ));
    }

    #[test]
    fn test_classify_order() {
        // "rate limit" wins over "model" when both appear
        assert!(matches!(
            GenerationError::classify("model hit rate limit"),
            GenerationError::RateLimited(_)
        ));
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            GenerationError::from_status(429, "slow down"),
            GenerationError::RateLimited(_)
        ));
        assert!(matches!(
            GenerationError::from_status(403, "forbidden"),
            GenerationError::Unauthorized(_)
        ));
        assert!(matches!(
            GenerationError::from_status(503, "loading"),
            GenerationError::ModelUnavailable(_)
        ));
        assert!(matches!(
            GenerationError::from_status(500, "internal failure"),
            GenerationError::Unclassified(_)
        ));
        assert!(matches!(
            GenerationError::from_status(400, "unknown model parameter"),
            GenerationError::ModelUnavailable(_)
        ));
    }

    #[test]
    fn test_unclassified_headline_carries_message() {
        let err = GenerationError::Unclassified("boom".into());
        assert_eq!(err.headline(), "Error generating image: boom");
        assert_eq!(err.message(), "boom");
    }
}
