//! Conversion between image data URLs and raw byte buffers, plus remote
//! byte fetching for slides that only carry an external URL.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{BannerError, Result};

/// Decodes a `data:<mime>;base64,<payload>` string into raw bytes and the
/// declared mime type.
///
/// # Errors
///
/// Returns [`BannerError::Format`] unless the input has all three parts.
pub fn decode_data_url(input: &str) -> Result<(Vec<u8>, String)> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| BannerError::Format("missing data: scheme".to_string()))?;

    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| BannerError::Format("expected <mime>;base64,<payload>".to_string()))?;

    if mime.is_empty() {
        return Err(BannerError::Format("empty mime type".to_string()));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| BannerError::Format(format!("invalid base64 payload: {e}")))?;

    Ok((bytes, mime.to_string()))
}

/// Encodes raw bytes as a `data:` URL with the given mime type.
///
/// Output is deterministic for identical input.
#[must_use]
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Blocking HTTP fetcher for remote image bytes.
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Create a fetcher with the default 30-second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("bannerkit/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetches the raw bytes behind a URL.
    ///
    /// # Errors
    ///
    /// Returns [`BannerError::Network`] on transport failure or a non-success
    /// status.
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().map_err(|e| BannerError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(BannerError::Network {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().map_err(|e| BannerError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(url, len = bytes.len(), "Fetched remote image");
        Ok(bytes.to_vec())
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a slide image reference to raw bytes: embedded `data:` URLs are
/// decoded locally, anything else goes over the network.
pub fn bytes_from_url(fetcher: &ImageFetcher, url: &str) -> Result<Vec<u8>> {
    if url.starts_with("data:") {
        decode_data_url(url).map(|(bytes, _)| bytes)
    } else {
        fetcher.fetch_bytes(url)
    }
}
