//! Gateway-level storage tests across both backends.

use std::path::PathBuf;

use tempfile::TempDir;

use bannerkit::error::BannerError;
use bannerkit::model::{Asset, AspectRatio, Banner, Slide};
use bannerkit::store::{ASSET_CAP, FlatStore, LEGACY_ASSETS_KEY, StorageGateway};

fn asset(n: usize) -> Asset {
    Asset {
        id: format!("asset-{n:03}"),
        image_url: "data:image/png;base64,AAAA".to_string(),
        name: format!("img-{n:03}.png"),
        uploaded_at: format!("2026-01-01T00:00:{:02}Z", n % 60),
    }
}

fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (dir.path().join("banners.db"), dir.path().join("fallback"))
}

#[test]
fn structured_lifecycle() {
    let dir = TempDir::new().unwrap();
    let (db_path, flat_dir) = paths(&dir);

    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    assert!(gateway.is_structured());

    gateway.save_asset(&asset(1)).unwrap();
    gateway.save_asset(&asset(2)).unwrap();

    let banner = Banner::new(
        vec![Slide::new("data:image/png;base64,AA").with_caption("hi")],
        AspectRatio::Ratio3x1,
        Some("promo".to_string()),
    );
    gateway.save_banner(&banner).unwrap();

    assert_eq!(gateway.list_assets().unwrap().len(), 2);
    let banners = gateway.list_banners().unwrap();
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].slides[0].caption.as_deref(), Some("hi"));

    gateway.delete_asset("asset-001").unwrap();
    assert_eq!(gateway.list_assets().unwrap().len(), 1);

    gateway.delete_banner(&banner.id).unwrap();
    assert!(gateway.list_banners().unwrap().is_empty());

    // Data survives a reopen.
    drop(gateway);
    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    assert_eq!(gateway.list_assets().unwrap().len(), 1);
    assert_eq!(gateway.list_assets().unwrap()[0].id, "asset-002");
}

#[test]
fn fallback_enforces_asset_cap() {
    let dir = TempDir::new().unwrap();
    let (db_path, flat_dir) = paths(&dir);

    // A directory at the database path forces the flat backend.
    std::fs::create_dir_all(&db_path).unwrap();
    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    assert!(!gateway.is_structured());

    for n in 1..=ASSET_CAP + 1 {
        gateway.save_asset(&asset(n)).unwrap();
    }

    let listed = gateway.list_assets().unwrap();
    assert_eq!(listed.len(), ASSET_CAP);
    assert!(!listed.iter().any(|a| a.id == "asset-001"));
    assert!(listed.iter().any(|a| a.id == "asset-051"));
}

#[test]
fn fallback_surfaces_quota_exceeded() {
    let dir = TempDir::new().unwrap();
    let (db_path, flat_dir) = paths(&dir);
    std::fs::create_dir_all(&db_path).unwrap();

    // A quota too small even for a single record.
    let gateway = StorageGateway::open(&db_path, &flat_dir, 16);
    let err = gateway.save_asset(&asset(1)).unwrap_err();
    assert!(matches!(err, BannerError::QuotaExceeded));
    assert!(gateway.list_assets().unwrap().is_empty());
}

#[test]
fn migration_runs_at_most_once() {
    let dir = TempDir::new().unwrap();
    let (db_path, flat_dir) = paths(&dir);

    let legacy = FlatStore::with_quota(&flat_dir, 0);
    legacy.put_asset(&asset(1)).unwrap();
    legacy.put_asset(&asset(2)).unwrap();
    legacy
        .put_banner(&Banner::new(Vec::new(), AspectRatio::Ratio16x9, None))
        .unwrap();

    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    assert!(gateway.is_structured());
    assert_eq!(gateway.list_assets().unwrap().len(), 2);
    assert_eq!(gateway.list_banners().unwrap().len(), 1);
    assert!(!legacy.has_key(LEGACY_ASSETS_KEY));

    // A user deletion followed by a reopen must not resurrect the record.
    gateway.delete_asset("asset-001").unwrap();
    drop(gateway);

    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    let listed = gateway.list_assets().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "asset-002");
    assert_eq!(gateway.list_banners().unwrap().len(), 1);
}

#[test]
fn usage_is_best_effort_on_both_backends() {
    let dir = TempDir::new().unwrap();
    let (db_path, flat_dir) = paths(&dir);

    let gateway = StorageGateway::open(&db_path, &flat_dir, 0);
    let usage = gateway.storage_usage();
    assert!(usage.used > 0); // the database file exists
    assert_eq!(usage.quota, 0);

    let blocked = dir.path().join("blocked.db");
    std::fs::create_dir_all(&blocked).unwrap();
    let gateway = StorageGateway::open(&blocked, &flat_dir, 2048);
    let usage = gateway.storage_usage();
    assert_eq!(usage.quota, 2048);
}
