//! Assembles the downloadable bundle for a slide list.

use std::io::{Cursor, Write};

use tracing::{debug, info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::template::render_carousel_html;
use crate::codec::{ImageFetcher, bytes_from_url};
use crate::error::{BannerError, Result};
use crate::model::{AspectRatio, BannerConfig, Slide, SlideConfig};

/// Inputs for a bundle export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub slides: Vec<Slide>,
    pub aspect_ratio: AspectRatio,
    pub autoplay: bool,
    /// Autoplay interval in seconds.
    pub autoplay_speed: u32,
}

/// Builds the export archive in memory.
///
/// The bundle contains `index.html`, one `images/slide-<n>.png` per slide
/// (1-indexed, list order) and `banner-config.json`. A slide whose image
/// cannot be retrieved gets an empty placeholder file; the export never
/// fails over a partially-broken slide list.
///
/// # Errors
///
/// The only hard failure is constructing the archive itself.
pub fn build_banner_zip(options: &ExportOptions, fetcher: &ImageFetcher) -> Result<Vec<u8>> {
    let image_bytes = collect_slide_bytes(&options.slides, fetcher);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default();

    let mut image_paths = Vec::with_capacity(image_bytes.len());
    for (i, bytes) in image_bytes.iter().enumerate() {
        let name = format!("images/slide-{}.png", i + 1);
        zip.start_file(name.as_str(), file_options).map_err(archive_error)?;
        zip.write_all(bytes)?;
        image_paths.push(name);
    }

    let html = render_carousel_html(
        &image_paths,
        options.aspect_ratio,
        options.autoplay,
        options.autoplay_speed,
        &options.slides,
    );
    zip.start_file("index.html", file_options).map_err(archive_error)?;
    zip.write_all(html.as_bytes())?;

    let config = BannerConfig {
        aspect_ratio: options.aspect_ratio,
        slides: options
            .slides
            .iter()
            .zip(&image_paths)
            .map(|(slide, path)| SlideConfig {
                image_url: path.clone(),
                product_name: slide.product_name.clone(),
                product_link: slide.product_link.clone(),
                caption: slide.caption.clone(),
            })
            .collect(),
        autoplay: options.autoplay,
        autoplay_speed: options.autoplay_speed,
    };
    let config_json = serde_json::to_string_pretty(&config)
        .map_err(|e| BannerError::Other(format!("Failed to serialize bundle config: {e}")))?;
    zip.start_file("banner-config.json", file_options).map_err(archive_error)?;
    zip.write_all(config_json.as_bytes())?;

    let cursor = zip.finish().map_err(archive_error)?;
    let bytes = cursor.into_inner();
    info!(
        slides = options.slides.len(),
        bytes = bytes.len(),
        "Bundle assembled"
    );
    Ok(bytes)
}

/// Resolves raw bytes for every slide. In-memory bytes win; otherwise the
/// image reference is decoded or fetched. Failures degrade to an empty
/// placeholder instead of aborting the export.
fn collect_slide_bytes(slides: &[Slide], fetcher: &ImageFetcher) -> Vec<Vec<u8>> {
    slides
        .iter()
        .map(|slide| {
            if let Some(bytes) = &slide.image_bytes {
                debug!(id = %slide.id, "Using in-memory image bytes");
                return bytes.clone();
            }
            match bytes_from_url(fetcher, &slide.image_url) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(id = %slide.id, error = %e, "Image unavailable, writing placeholder");
                    Vec::new()
                }
            }
        })
        .collect()
}

fn archive_error(e: zip::result::ZipError) -> BannerError {
    BannerError::Other(format!("Failed to build archive: {e}"))
}
