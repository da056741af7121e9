//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A platform facility is missing at runtime
    #[error("Platform facility not available: {0}")]
    Unavailable(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_names_the_facility() {
        let err = PlatformError::Unavailable("window".to_string());
        assert_eq!(err.to_string(), "Platform facility not available: window");
    }
}
