//! End-to-end export: save a banner, reload it, package it, inspect the
//! archive.

use std::io::{Cursor, Read};

use tempfile::TempDir;
use zip::ZipArchive;

use bannerkit::codec::{ImageFetcher, encode_data_url};
use bannerkit::deck::SlideDeck;
use bannerkit::export::{ExportOptions, build_banner_zip};
use bannerkit::model::{AspectRatio, BannerConfig, Slide};
use bannerkit::store::StorageGateway;

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    buf
}

#[test]
fn saved_banner_exports_as_complete_bundle() {
    let dir = TempDir::new().unwrap();
    let gateway = StorageGateway::open(
        &dir.path().join("banners.db"),
        &dir.path().join("fallback"),
        0,
    );

    let mut deck = SlideDeck::new();
    deck.push(
        Slide::new(encode_data_url(&[1, 1], "image/png"))
            .with_product_name("Widget")
            .with_product_link("https://shop/widget"),
    );
    deck.push(Slide::new(encode_data_url(&[2, 2], "image/png")).with_caption("two"));
    deck.push(Slide::new(encode_data_url(&[3, 3], "image/png")));

    let banner = deck.freeze(AspectRatio::Ratio16x9, Some("launch".to_string()));
    gateway.save_banner(&banner).unwrap();

    // Reload through a fresh gateway, the way an export after restart would.
    drop(gateway);
    let gateway = StorageGateway::open(
        &dir.path().join("banners.db"),
        &dir.path().join("fallback"),
        0,
    );
    let reloaded = gateway
        .list_banners()
        .unwrap()
        .into_iter()
        .find(|b| b.id == banner.id)
        .unwrap();

    let options = ExportOptions {
        slides: reloaded.slides,
        aspect_ratio: reloaded.aspect_ratio,
        autoplay: true,
        autoplay_speed: 3,
    };
    let bytes = build_banner_zip(&options, &ImageFetcher::new()).unwrap();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "images/slide-1.png",
            "images/slide-2.png",
            "images/slide-3.png",
            "index.html",
            "banner-config.json",
        ]
    );

    // Image files carry the decoded bytes in slide order.
    assert_eq!(read_entry(&mut archive, "images/slide-1.png"), vec![1, 1]);
    assert_eq!(read_entry(&mut archive, "images/slide-3.png"), vec![3, 3]);

    let config: BannerConfig =
        serde_json::from_slice(&read_entry(&mut archive, "banner-config.json")).unwrap();
    assert_eq!(config.aspect_ratio, AspectRatio::Ratio16x9);
    assert_eq!(config.slides.len(), 3);
    assert_eq!(config.slides[0].product_name.as_deref(), Some("Widget"));
    assert_eq!(config.slides[1].caption.as_deref(), Some("two"));
    assert!(config.autoplay);
    assert_eq!(config.autoplay_speed, 3);

    let html = String::from_utf8(read_entry(&mut archive, "index.html")).unwrap();
    assert!(html.contains(r#"["images/slide-1.png","images/slide-2.png","images/slide-3.png"]"#));
    assert!(html.contains("var autoplaySpeed = 3000;"));
    assert!(html.contains(r#""productName":"Widget""#));
}

#[test]
fn export_tolerates_mixed_broken_slides() {
    // One good embedded image, one malformed data URL: the bundle is still
    // complete, with a placeholder for the broken slide.
    let options = ExportOptions {
        slides: vec![
            Slide::new(encode_data_url(&[7], "image/png")),
            Slide::new("data:image/png,not-base64"),
        ],
        aspect_ratio: AspectRatio::Ratio1x1,
        autoplay: false,
        autoplay_speed: 5,
    };

    let bytes = build_banner_zip(&options, &ImageFetcher::new()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    assert_eq!(read_entry(&mut archive, "images/slide-1.png"), vec![7]);
    assert!(read_entry(&mut archive, "images/slide-2.png").is_empty());

    let config: BannerConfig =
        serde_json::from_slice(&read_entry(&mut archive, "banner-config.json")).unwrap();
    assert_eq!(config.slides.len(), 2);
}
