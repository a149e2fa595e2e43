use std::fmt;

#[derive(Debug)]
pub enum ArtError {
    ValidationError(String),
    ConfigError(String),
    RequestError(String),
    TimeoutError(String),
    UpstreamError { status: u16, body: String },
    MalformedResponse(String),
    SerializationError(String),
    NoMediaFound(String),
}

impl fmt::Display for ArtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ArtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ArtError::RequestError(msg) => write!(f, "Request error: {}", msg),
            ArtError::TimeoutError(msg) => write!(f, "Timeout error: {}", msg),
            ArtError::UpstreamError { status, body } => {
                write!(f, "RunPod API error {}: {}", status, body)
            }
            ArtError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            ArtError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ArtError::NoMediaFound(msg) => write!(f, "No media in response: {}", msg),
        }
    }
}

impl std::error::Error for ArtError {}

impl ArtError {
    /// Stable machine-checkable category, independent of the message text.
    pub fn category(&self) -> &'static str {
        match self {
            ArtError::ValidationError(_) => "validation",
            ArtError::ConfigError(_) => "config",
            ArtError::RequestError(_) => "request",
            ArtError::TimeoutError(_) => "timeout",
            ArtError::UpstreamError { .. } => "upstream",
            ArtError::MalformedResponse(_) => "malformed_response",
            ArtError::SerializationError(_) => "serialization",
            ArtError::NoMediaFound(_) => "no_media",
        }
    }

    /// HTTP status the embedded handler surface answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ArtError::ValidationError(_) => 400,
            ArtError::ConfigError(_) => 500,
            ArtError::SerializationError(_) => 500,
            ArtError::TimeoutError(_) => 504,
            ArtError::RequestError(_) => 502,
            ArtError::UpstreamError { .. } => 502,
            ArtError::MalformedResponse(_) => 502,
            ArtError::NoMediaFound(_) => 502,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_stable() {
        assert_eq!(ArtError::ValidationError("x".into()).category(), "validation");
        assert_eq!(
            ArtError::UpstreamError {
                status: 503,
                body: "busy".into()
            }
            .category(),
            "upstream"
        );
        assert_eq!(ArtError::NoMediaFound("x".into()).category(), "no_media");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ArtError::ValidationError("empty".into()).http_status(), 400);
        assert_eq!(ArtError::ConfigError("no key".into()).http_status(), 500);
        assert_eq!(ArtError::TimeoutError("3 attempts".into()).http_status(), 504);
        assert_eq!(
            ArtError::UpstreamError {
                status: 404,
                body: "not found".into()
            }
            .http_status(),
            502
        );
    }

    #[test]
    fn test_upstream_display_carries_status_and_body() {
        let err = ArtError::UpstreamError {
            status: 429,
            body: "too many requests".into(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("too many requests"));
    }
}
