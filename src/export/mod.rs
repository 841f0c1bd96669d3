//! Static bundle export.
//!
//! Serializes a slide list into a portable archive: a self-contained
//! carousel document, sequentially named image files and a structured
//! configuration document.

mod packager;
mod template;

pub use packager::{ExportOptions, build_banner_zip};
pub use template::render_carousel_html;
