//! Self-contained carousel markup for exported bundles.
//!
//! The rendered document reproduces the live editor's carousel behavior with
//! no external script or style dependencies: cyclic next/prev navigation,
//! dot indicators, per-slide caption/product-link overlays, and autoplay
//! that resets its timer on manual navigation.

use serde::Serialize;

use crate::model::{AspectRatio, Slide};

/// Per-slide overlay data embedded in the markup's script block.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Overlay<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    product_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

/// Renders the exported `index.html` document.
#[must_use]
pub fn render_carousel_html(
    image_paths: &[String],
    aspect_ratio: AspectRatio,
    autoplay: bool,
    autoplay_speed: u32,
    slides: &[Slide],
) -> String {
    let ratio_percent = (1.0 / aspect_ratio.ratio()) * 100.0;
    let overlays: Vec<Overlay<'_>> = slides
        .iter()
        .map(|s| Overlay {
            product_name: s.product_name.as_deref(),
            product_link: s.product_link.as_deref(),
            caption: s.caption.as_deref(),
        })
        .collect();

    // Embedded data is produced by serde, so the arrays always parse.
    let paths_json = serde_json::to_string(image_paths).unwrap_or_else(|_| "[]".to_string());
    let slides_json = serde_json::to_string(&overlays).unwrap_or_else(|_| "[]".to_string());

    CAROUSEL_TEMPLATE
        .replace("{{RATIO_PERCENT}}", &ratio_percent.to_string())
        .replace("{{PATHS_JSON}}", &paths_json)
        .replace("{{SLIDES_JSON}}", &slides_json)
        .replace("{{AUTOPLAY}}", if autoplay { "true" } else { "false" })
        .replace("{{SPEED_MS}}", &(u64::from(autoplay_speed) * 1000).to_string())
}

const CAROUSEL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Banner Carousel</title>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, sans-serif; }
    .carousel { position: relative; width: 100%; overflow: hidden; }
    .carousel::before { content: ""; display: block; padding-top: {{RATIO_PERCENT}}%; }
    .carousel-inner { position: absolute; inset: 0; }
    .slide { position: absolute; inset: 0; opacity: 0; transition: opacity 0.3s; }
    .slide.active { opacity: 1; z-index: 1; }
    .slide img { width: 100%; height: 100%; object-fit: cover; display: block; }
    .slide-caption { position: absolute; bottom: 0; left: 0; right: 0; background: linear-gradient(transparent, rgba(0,0,0,0.7)); color: #fff; padding: 12px 16px; font-size: 14px; }
    .slide-caption a { color: #fff; font-weight: 600; }
    .dots { display: flex; justify-content: center; gap: 6px; padding: 12px; }
    .dot { width: 10px; height: 10px; border-radius: 50%; border: none; background: #ccc; cursor: pointer; }
    .dot.active { background: #333; }
    .arrows { position: absolute; top: 50%; transform: translateY(-50%); z-index: 2; background: rgba(255,255,255,0.8); border: none; width: 40px; height: 40px; border-radius: 50%; cursor: pointer; font-size: 20px; }
    .arrow-prev { left: 12px; }
    .arrow-next { right: 12px; }
  </style>
</head>
<body>
  <div class="carousel" id="carousel">
    <div class="carousel-inner" id="carouselInner"></div>
    <button type="button" class="arrows arrow-prev" id="prev" aria-label="Previous">&#10094;</button>
    <button type="button" class="arrows arrow-next" id="next" aria-label="Next">&#10095;</button>
  </div>
  <div class="dots" id="dots"></div>
  <script>
    (function() {
      var paths = {{PATHS_JSON}};
      var slidesData = {{SLIDES_JSON}};
      var current = 0;
      var autoplay = {{AUTOPLAY}};
      var autoplaySpeed = {{SPEED_MS}};
      var timer = null;
      var inner = document.getElementById("carouselInner");
      var dotsEl = document.getElementById("dots");
      function render() {
        inner.innerHTML = paths.map(function(url, i) {
          var d = slidesData[i] || {};
          var cap = (d.productName ? '<a href="' + (d.productLink || '#') + '">' + d.productName + '</a>' : '') + (d.caption ? '<p>' + d.caption + '</p>' : '');
          return '<div class="slide' + (i === current ? ' active' : '') + '"><img src="' + url + '" alt=""><div class="slide-caption">' + cap + '</div></div>';
        }).join("");
        dotsEl.innerHTML = paths.map(function(_, i) {
          return '<button type="button" class="dot' + (i === current ? ' active' : '') + '" data-idx="' + i + '" aria-label="Slide ' + (i + 1) + '"></button>';
        }).join("");
        dotsEl.querySelectorAll(".dot").forEach(function(btn) {
          btn.addEventListener("click", function() { goTo(parseInt(btn.getAttribute("data-idx"), 10)); resetTimer(); });
        });
      }
      function goTo(idx) {
        current = (idx + paths.length) % paths.length;
        inner.querySelectorAll(".slide").forEach(function(s, i) { s.classList.toggle("active", i === current); });
        dotsEl.querySelectorAll(".dot").forEach(function(d, i) { d.classList.toggle("active", i === current); });
      }
      document.getElementById("prev").onclick = function() { goTo(current - 1); resetTimer(); };
      document.getElementById("next").onclick = function() { goTo(current + 1); resetTimer(); };
      function resetTimer() {
        if (timer) clearInterval(timer);
        if (autoplay && paths.length > 1) timer = setInterval(function() { goTo(current + 1); }, autoplaySpeed);
      }
      render();
      resetTimer();
    })();
  </script>
</body>
</html>"#;
