//! Core data types for assets, banners and slides.
//!
//! Wire names are camelCase so persisted records stay compatible with the
//! legacy flat-store arrays consumed during migration.

use std::fmt;

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display aspect ratio of a banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 widescreen.
    #[default]
    #[serde(rename = "16:9")]
    #[value(name = "16:9")]
    Ratio16x9,
    /// 3:1 leaderboard.
    #[serde(rename = "3:1")]
    #[value(name = "3:1")]
    Ratio3x1,
    /// 4:1 slim banner.
    #[serde(rename = "4:1")]
    #[value(name = "4:1")]
    Ratio4x1,
    /// 1:1 square.
    #[serde(rename = "1:1")]
    #[value(name = "1:1")]
    Ratio1x1,
}

impl AspectRatio {
    /// Width divided by height.
    #[must_use]
    pub fn ratio(self) -> f64 {
        match self {
            Self::Ratio16x9 => 16.0 / 9.0,
            Self::Ratio3x1 => 3.0,
            Self::Ratio4x1 => 4.0,
            Self::Ratio1x1 => 1.0,
        }
    }

    /// The canonical `w:h` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ratio16x9 => "16:9",
            Self::Ratio3x1 => "3:1",
            Self::Ratio4x1 => "4:1",
            Self::Ratio1x1 => "1:1",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = crate::error::BannerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "16:9" => Ok(Self::Ratio16x9),
            "3:1" => Ok(Self::Ratio3x1),
            "4:1" => Ok(Self::Ratio4x1),
            "1:1" => Ok(Self::Ratio1x1),
            other => Err(crate::error::BannerError::Validation(format!(
                "unknown aspect ratio: {other}"
            ))),
        }
    }
}

/// A persisted image record available for reuse across banners.
///
/// Assets are never mutated in place; they are created once and deleted by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Unique id (timestamp + random suffix).
    pub id: String,
    /// Image data URL, or an external URL.
    pub image_url: String,
    /// Display name (usually the original filename).
    pub name: String,
    /// RFC 3339 creation timestamp.
    pub uploaded_at: String,
}

impl Asset {
    /// Create a new asset stamped with the current time.
    #[must_use]
    pub fn new(image_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_asset_id(),
            image_url: image_url.into(),
            name: name.into(),
            uploaded_at: Utc::now().to_rfc3339(),
        }
    }
}

/// One image-plus-metadata unit within the live editor.
///
/// Slides are session state: they are not persisted on their own, only as
/// frozen copies inside a [`Banner`]. `image_bytes` carries raw bytes when the
/// editor already has them (an upload or a generation result) and is never
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Unique within its banner/session.
    pub id: String,
    /// Image data URL or external URL.
    pub image_url: String,
    /// Raw image bytes, when available in memory.
    #[serde(skip)]
    pub image_bytes: Option<Vec<u8>>,
    /// Product name shown in the caption overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Link target for the product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    /// Free-text caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Slide {
    /// Create a slide for an image URL.
    #[must_use]
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            id: new_slide_id(),
            image_url: image_url.into(),
            image_bytes: None,
            product_name: None,
            product_link: None,
            caption: None,
        }
    }

    /// Attach raw image bytes.
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.image_bytes = Some(bytes);
        self
    }

    /// Set the product name.
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Set the product link.
    pub fn with_product_link(mut self, link: impl Into<String>) -> Self {
        self.product_link = Some(link.into());
        self
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// A saved named snapshot of a slide sequence plus display settings.
///
/// The slide list is a frozen copy taken at save time; deleting an asset later
/// does not cascade into banners that referenced its image content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    /// Unique id (timestamp + random suffix).
    pub id: String,
    /// Frozen slide snapshots in display order.
    pub slides: Vec<Slide>,
    /// Display aspect ratio. Not cross-validated against slide content.
    pub aspect_ratio: AspectRatio,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Banner {
    /// Create a banner from a frozen slide list, stamped with the current time.
    #[must_use]
    pub fn new(slides: Vec<Slide>, aspect_ratio: AspectRatio, name: Option<String>) -> Self {
        Self {
            id: new_banner_id(),
            slides,
            aspect_ratio,
            created_at: Utc::now().to_rfc3339(),
            name,
        }
    }
}

/// Per-slide entry in the exported configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideConfig {
    /// Bundle-relative image path (`images/slide-<n>.png`).
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// The exported `banner-config.json` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerConfig {
    pub aspect_ratio: AspectRatio,
    pub slides: Vec<SlideConfig>,
    pub autoplay: bool,
    /// Autoplay interval in seconds.
    pub autoplay_speed: u32,
}

/// Generate an asset id.
#[must_use]
pub fn new_asset_id() -> String {
    tagged_id("asset")
}

/// Generate a banner id.
#[must_use]
pub fn new_banner_id() -> String {
    tagged_id("banner")
}

/// Generate a slide id.
#[must_use]
pub fn new_slide_id() -> String {
    tagged_id("slide")
}

/// Timestamp plus random suffix. Uniqueness is best-effort and not checked;
/// a collision would silently upsert over the earlier record.
fn tagged_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), &suffix[..7])
}
