//! Client for the external image-generation endpoint.
//!
//! One request, one response: the endpoint either returns an encoded image
//! string or an error message. Retrying is left to the caller.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BannerError, Result};

/// Request body for the generation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    /// Base64-encoded reference image for image-to-image generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<String>,
}

impl GenerateRequest {
    /// Text-to-image request.
    #[must_use]
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_base64: None,
            image_mime_type: None,
        }
    }

    /// Attach a reference image.
    #[must_use]
    pub fn with_image(mut self, base64: String, mime_type: String) -> Self {
        self.image_base64 = Some(base64);
        self.image_mime_type = Some(mime_type);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    image_url: Option<String>,
    error: Option<String>,
}

/// Blocking client for the generation endpoint.
pub struct GenerateClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GenerateClient {
    /// Create a client for an endpoint. Generation is slow; the request
    /// timeout is generous.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("bannerkit/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Runs one generation round trip and returns the encoded image string.
    ///
    /// # Errors
    ///
    /// [`BannerError::Network`] on transport failure,
    /// [`BannerError::Generation`] when the endpoint reports an error or an
    /// empty result.
    pub fn generate(&self, request: &GenerateRequest) -> Result<String> {
        debug!(endpoint = %self.endpoint, "Requesting image generation");

        let mut req = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| BannerError::Network {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let body: GenerateResponse = response.json().map_err(|e| BannerError::Network {
            url: self.endpoint.clone(),
            reason: format!("unreadable response: {e}"),
        })?;

        if let Some(error) = body.error {
            return Err(BannerError::Generation(error));
        }
        body.image_url
            .ok_or_else(|| BannerError::Generation("response contained no image".to_string()))
    }
}
