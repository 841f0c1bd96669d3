//! Flat key-value fallback store.
//!
//! Used when the structured database cannot be opened. Each collection is one
//! JSON-serialized array under a fixed key (a file named after the key), the
//! same layout legacy installations used, so this module doubles as the
//! migration source for the gateway.
//!
//! Writes are bounded by a byte quota across all keys. A write that would
//! exceed it fails with [`BannerError::QuotaExceeded`]; the asset put path
//! retries once after truncating to the most recent entries.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BannerError, Result};
use crate::model::{Asset, Banner};

/// Legacy fixed key for the asset collection.
pub const LEGACY_ASSETS_KEY: &str = "savedAssets";

/// Legacy fixed key for the banner collection.
pub const LEGACY_BANNERS_KEY: &str = "savedBanners";

/// Maximum number of assets kept in the flat store (insertion order; the
/// oldest entries are evicted first). Banners are not capped.
pub const ASSET_CAP: usize = 50;

/// Entries kept when a quota-exceeded write is retried.
const QUOTA_RETRY_KEEP: usize = 20;

/// Default byte quota across all keys.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Flat JSON file store rooted in a directory.
pub struct FlatStore {
    root: PathBuf,
    quota_bytes: u64,
}

impl FlatStore {
    /// Create a store with the default quota.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_quota(root, DEFAULT_QUOTA_BYTES)
    }

    /// Create a store with an explicit byte quota. A quota of 0 disables the
    /// ceiling.
    #[must_use]
    pub fn with_quota(root: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self {
            root: root.into(),
            quota_bytes,
        }
    }

    /// The configured quota in bytes (0 = unlimited).
    #[must_use]
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Total bytes currently stored across all keys.
    #[must_use]
    pub fn bytes_used(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };
        entries
            .filter_map(std::result::Result::ok)
            .filter_map(|e| e.metadata().ok())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum()
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Whether a key currently holds a value.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.key_path(key).is_file()
    }

    /// Reads a key's raw value, if present.
    #[must_use]
    pub fn read_key(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    /// Removes a key. Absent keys are a no-op.
    pub fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.is_file() {
            fs::remove_file(&path)?;
            debug!(key, "Flat store key removed");
        }
        Ok(())
    }

    /// Writes a key, enforcing the byte quota across all keys.
    fn write_key(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        if self.quota_bytes > 0 {
            let path = self.key_path(key);
            let others: u64 = fs::read_dir(&self.root)?
                .filter_map(std::result::Result::ok)
                .filter(|e| e.path() != path)
                .filter_map(|e| e.metadata().ok())
                .filter(|m| m.is_file())
                .map(|m| m.len())
                .sum();
            if others + value.len() as u64 > self.quota_bytes {
                return Err(BannerError::QuotaExceeded);
            }
        }

        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    // === Assets ===

    /// Upserts an asset, enforcing the collection cap, with one truncation
    /// retry if the write exceeds the quota.
    ///
    /// # Errors
    ///
    /// Returns [`BannerError::QuotaExceeded`] when the retry also fails; the
    /// new asset is not persisted in that case.
    pub fn put_asset(&self, asset: &Asset) -> Result<()> {
        let mut assets = self.stored_assets();
        match assets.iter_mut().find(|a| a.id == asset.id) {
            Some(slot) => *slot = asset.clone(),
            None => assets.push(asset.clone()),
        }

        if assets.len() > ASSET_CAP {
            let excess = assets.len() - ASSET_CAP;
            assets.drain(..excess);
            debug!(evicted = excess, "Asset cap reached, oldest entries evicted");
        }

        match self.write_assets(&assets) {
            Err(BannerError::QuotaExceeded) => {
                let keep = assets.len().min(QUOTA_RETRY_KEEP);
                let trimmed = assets[assets.len() - keep..].to_vec();
                warn!(
                    kept = keep,
                    "Quota exceeded, retrying with most recent entries only"
                );
                self.write_assets(&trimmed)
            }
            other => other,
        }
    }

    /// Returns stored assets that pass the shape check; invalid entries are
    /// silently dropped (and never rewritten here).
    #[must_use]
    pub fn assets_all(&self) -> Vec<Asset> {
        let (kept, dropped) = sanitize_assets(self.raw_values(LEGACY_ASSETS_KEY));
        if dropped > 0 {
            debug!(dropped, "Dropped invalid stored assets on read");
        }
        kept
    }

    /// Deletes an asset by id. Absent ids are a no-op.
    pub fn delete_asset(&self, id: &str) -> Result<()> {
        let mut assets = self.stored_assets();
        assets.retain(|a| a.id != id);
        self.write_assets(&assets)
    }

    /// Shape-valid stored assets, without the image-reference filter; this is
    /// what the write path upserts into.
    fn stored_assets(&self) -> Vec<Asset> {
        self.raw_values(LEGACY_ASSETS_KEY)
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }

    fn write_assets(&self, assets: &[Asset]) -> Result<()> {
        let json = serde_json::to_string(assets)
            .map_err(|e| BannerError::Other(format!("Failed to serialize assets: {e}")))?;
        self.write_key(LEGACY_ASSETS_KEY, &json)
    }

    // === Banners ===

    /// Upserts a banner. The banner collection is not capped.
    pub fn put_banner(&self, banner: &Banner) -> Result<()> {
        let mut banners = self.banners_all();
        match banners.iter_mut().find(|b| b.id == banner.id) {
            Some(slot) => *slot = banner.clone(),
            None => banners.push(banner.clone()),
        }
        self.write_banners(&banners)
    }

    /// Returns stored banners; entries that no longer parse are skipped.
    #[must_use]
    pub fn banners_all(&self) -> Vec<Banner> {
        self.raw_values(LEGACY_BANNERS_KEY)
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }

    /// Deletes a banner by id. Absent ids are a no-op.
    pub fn delete_banner(&self, id: &str) -> Result<()> {
        let mut banners = self.banners_all();
        banners.retain(|b| b.id != id);
        self.write_banners(&banners)
    }

    fn write_banners(&self, banners: &[Banner]) -> Result<()> {
        let json = serde_json::to_string(banners)
            .map_err(|e| BannerError::Other(format!("Failed to serialize banners: {e}")))?;
        self.write_key(LEGACY_BANNERS_KEY, &json)
    }

    /// Leniently parses a key's stored array. A missing or unreadable value
    /// yields an empty collection.
    fn raw_values(&self, key: &str) -> Vec<Value> {
        self.read_key(key)
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }
}

/// Shape check for stored assets: required fields present and an image
/// reference that survives persistence. Transient `blob:` object URLs are
/// session-scoped and unusable after reload, so they are dropped.
///
/// Returns the kept records and the dropped count.
pub fn sanitize_assets(raw: Vec<Value>) -> (Vec<Asset>, usize) {
    let total = raw.len();
    let kept: Vec<Asset> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value::<Asset>(v).ok())
        .filter(|a| is_persistable_image(&a.image_url))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

fn is_persistable_image(url: &str) -> bool {
    if url.is_empty() || url.starts_with("blob:") {
        return false;
    }
    url.starts_with("data:") || url.starts_with("http")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn asset(n: usize) -> Asset {
        Asset {
            id: format!("asset-{n:03}"),
            image_url: "data:image/png;base64,AAAA".to_string(),
            name: format!("img-{n:03}.png"),
            uploaded_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn store() -> (TempDir, FlatStore) {
        let dir = TempDir::new().unwrap();
        let store = FlatStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_put_and_get() {
        let (_dir, store) = store();
        store.put_asset(&asset(1)).unwrap();

        let all = store.assets_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "asset-001");
        assert_eq!(all[0].name, "img-001.png");
    }

    #[test]
    fn test_put_is_upsert() {
        let (_dir, store) = store();
        store.put_asset(&asset(1)).unwrap();

        let mut updated = asset(1);
        updated.name = "renamed.png".to_string();
        store.put_asset(&updated).unwrap();

        let all = store.assets_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "renamed.png");
    }

    #[test]
    fn test_asset_cap_evicts_oldest() {
        let (_dir, store) = store();
        for n in 1..=ASSET_CAP + 1 {
            store.put_asset(&asset(n)).unwrap();
        }

        let all = store.assets_all();
        assert_eq!(all.len(), ASSET_CAP);
        assert!(!all.iter().any(|a| a.id == "asset-001"));
        assert_eq!(all.last().unwrap().id, "asset-051");
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        store.put_asset(&asset(1)).unwrap();
        store.put_asset(&asset(2)).unwrap();

        store.delete_asset("asset-001").unwrap();
        let all = store.assets_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "asset-002");

        // Deleting an absent id is fine.
        store.delete_asset("asset-001").unwrap();
    }

    #[test]
    fn test_sanitize_drops_transient_and_malformed() {
        let raw: Vec<Value> = serde_json::from_str(
            r#"[
                {"id":"a","imageUrl":"data:image/png;base64,AA","name":"a","uploadedAt":"t"},
                {"id":"b","imageUrl":"blob:https://app/xyz","name":"b","uploadedAt":"t"},
                {"id":"c","imageUrl":"https://cdn/img.png","name":"c","uploadedAt":"t"},
                {"id":"d","name":"missing-url","uploadedAt":"t"},
                {"id":"e","imageUrl":"","name":"e","uploadedAt":"t"}
            ]"#,
        )
        .unwrap();

        let (kept, dropped) = sanitize_assets(raw);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 3);
        assert_eq!(kept[0].id, "a");
        assert_eq!(kept[1].id, "c");
    }

    #[test]
    fn test_dropped_entries_not_rewritten_on_read() {
        let (_dir, store) = store();
        store
            .write_key(
                LEGACY_ASSETS_KEY,
                r#"[{"id":"a","imageUrl":"blob:gone","name":"a","uploadedAt":"t"}]"#,
            )
            .unwrap();

        assert!(store.assets_all().is_empty());
        // The stored value is untouched until a caller explicitly re-saves.
        assert!(store.read_key(LEGACY_ASSETS_KEY).unwrap().contains("blob:gone"));
    }

    #[test]
    fn test_quota_truncates_to_most_recent() {
        let dir = TempDir::new().unwrap();

        // Find the serialized sizes so the quota sits between "all 21 fit"
        // and "the most recent 20 fit".
        let assets: Vec<Asset> = (1..=21).map(asset).collect();
        let full = serde_json::to_string(&assets).unwrap().len() as u64;
        let trimmed = serde_json::to_string(&assets[1..]).unwrap().len() as u64;
        let quota = (full + trimmed) / 2;

        let store = FlatStore::with_quota(dir.path(), quota);
        for a in &assets[..20] {
            store.put_asset(a).unwrap();
        }

        store.put_asset(&assets[20]).unwrap();

        let all = store.assets_all();
        assert_eq!(all.len(), QUOTA_RETRY_KEEP);
        assert!(!all.iter().any(|a| a.id == "asset-001"));
        assert_eq!(all.last().unwrap().id, "asset-021");
    }

    #[test]
    fn test_quota_exhausted_surfaces_error() {
        let dir = TempDir::new().unwrap();

        // Seed 20 assets without a ceiling, then reopen with a quota too
        // small even for the truncated retry.
        let seed = FlatStore::with_quota(dir.path(), 0);
        for n in 1..=20 {
            seed.put_asset(&asset(n)).unwrap();
        }

        let store = FlatStore::with_quota(dir.path(), 64);
        let err = store.put_asset(&asset(21)).unwrap_err();
        assert!(matches!(err, BannerError::QuotaExceeded));

        // The failed asset must not be visible.
        assert!(!store.assets_all().iter().any(|a| a.id == "asset-021"));
        assert_eq!(store.assets_all().len(), 20);
    }

    #[test]
    fn test_banners_uncapped() {
        let (_dir, store) = store();
        for n in 1..=ASSET_CAP + 5 {
            let banner = crate::model::Banner {
                id: format!("banner-{n:03}"),
                slides: Vec::new(),
                aspect_ratio: crate::model::AspectRatio::Ratio16x9,
                created_at: "2026-01-01T00:00:00Z".to_string(),
                name: None,
            };
            store.put_banner(&banner).unwrap();
        }
        assert_eq!(store.banners_all().len(), ASSET_CAP + 5);
    }

    #[test]
    fn test_bytes_used_tracks_files() {
        let (_dir, store) = store();
        assert_eq!(store.bytes_used(), 0);
        store.put_asset(&asset(1)).unwrap();
        assert!(store.bytes_used() > 0);
    }
}
