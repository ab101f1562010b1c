use thiserror::Error;

/// Main error type for llmgate
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Socket and file system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion API errors (network, auth, rate limit, malformed response)
    #[error("Completion API error: {0}")]
    Completion(String),

    /// Request params that do not match the method's schema
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient Result type using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_completion_error_display() {
        let err = GatewayError::Completion("OpenAI API error 401 Unauthorized".to_string());
        assert_eq!(
            err.to_string(),
            "Completion API error: OpenAI API error 401 Unauthorized"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let gateway_err: GatewayError = io_err.into();
        assert!(matches!(gateway_err, GatewayError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let gateway_err: GatewayError = json_err.into();
        assert!(matches!(gateway_err, GatewayError::Serialization(_)));
    }
}
