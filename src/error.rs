//! Error types for banner storage and export operations.

use thiserror::Error;

/// Primary error type for bannerkit operations.
#[derive(Error, Debug)]
pub enum BannerError {
    // Codec errors
    #[error("Malformed image data string: {0}")]
    Format(String),

    #[error("Failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    // Storage errors
    #[error("Structured store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage quota exceeded; delete some assets before saving more")]
    QuotaExceeded,

    #[error("Invalid stored record: {0}")]
    Validation(String),

    // Image errors
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    // Generation errors
    #[error("Image generation failed: {0}")]
    Generation(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BannerError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded | Self::Format(_) | Self::Network { .. } | Self::ConfigParse(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::QuotaExceeded => Some("Delete unused assets with: bannerkit asset delete <ID>"),
            Self::Network { .. } => Some("Check the URL and your network connection"),
            Self::ConfigParse(_) => Some("Check the config file syntax"),
            Self::Generation(_) => Some("Verify the generation endpoint and API key"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using BannerError.
pub type Result<T> = std::result::Result<T, BannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_is_recoverable() {
        assert!(BannerError::QuotaExceeded.is_user_recoverable());
        assert!(BannerError::QuotaExceeded.suggestion().is_some());
    }

    #[test]
    fn test_store_unavailable_not_user_facing() {
        let err = BannerError::StoreUnavailable("access denied".to_string());
        assert!(!err.is_user_recoverable());
        assert!(err.suggestion().is_none());
    }
}
