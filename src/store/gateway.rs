//! Storage gateway: one API over two backends.
//!
//! The backend is decided once when the gateway opens: the structured SQLite
//! store when it initializes, the flat store otherwise. The decision is not
//! retried for the gateway's lifetime. On the structured path the gateway
//! also performs a one-time migration of legacy flat-store data.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::db::SqliteStore;
use super::flat::{FlatStore, LEGACY_ASSETS_KEY, LEGACY_BANNERS_KEY};
use crate::error::Result;
use crate::model::{Asset, Banner};

/// Best-effort storage usage estimate.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StorageUsage {
    /// Bytes currently stored.
    pub used: u64,
    /// Known ceiling in bytes (0 when the backend has none to report).
    pub quota: u64,
}

enum Backend {
    Structured(SqliteStore),
    Flat(FlatStore),
}

/// Facade over the active storage backend.
pub struct StorageGateway {
    backend: Backend,
    db_path: PathBuf,
}

impl StorageGateway {
    /// Opens the gateway, preferring the structured store.
    ///
    /// Never fails: a structured store that cannot initialize selects the
    /// flat fallback instead. `flat_quota` of 0 disables the fallback
    /// store's byte ceiling.
    #[must_use]
    pub fn open(db_path: &Path, flat_dir: &Path, flat_quota: u64) -> Self {
        let flat = FlatStore::with_quota(flat_dir, flat_quota);

        let backend = match SqliteStore::open(db_path) {
            Ok(db) => {
                if let Err(e) = migrate_legacy(&db, &flat) {
                    warn!(error = %e, "Legacy migration incomplete");
                }
                Backend::Structured(db)
            }
            Err(e) => {
                warn!(error = %e, "Falling back to flat storage");
                Backend::Flat(flat)
            }
        };

        Self {
            backend,
            db_path: db_path.to_path_buf(),
        }
    }

    /// Whether the structured backend is active.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self.backend, Backend::Structured(_))
    }

    // === Assets ===

    /// Persists an asset (upsert by id).
    pub fn save_asset(&self, asset: &Asset) -> Result<()> {
        match &self.backend {
            Backend::Structured(db) => db.put_asset(asset),
            Backend::Flat(flat) => flat.put_asset(asset),
        }
    }

    /// Lists stored assets. The structured backend orders by upload time;
    /// the flat backend returns insertion order.
    pub fn list_assets(&self) -> Result<Vec<Asset>> {
        match &self.backend {
            Backend::Structured(db) => db.assets_by_uploaded_at(),
            Backend::Flat(flat) => Ok(flat.assets_all()),
        }
    }

    /// Deletes an asset by id. Absent ids are a no-op.
    pub fn delete_asset(&self, id: &str) -> Result<()> {
        match &self.backend {
            Backend::Structured(db) => db.delete_asset(id),
            Backend::Flat(flat) => flat.delete_asset(id),
        }
    }

    // === Banners ===

    /// Persists a banner (upsert by id).
    pub fn save_banner(&self, banner: &Banner) -> Result<()> {
        match &self.backend {
            Backend::Structured(db) => db.put_banner(banner),
            Backend::Flat(flat) => flat.put_banner(banner),
        }
    }

    /// Lists saved banners.
    pub fn list_banners(&self) -> Result<Vec<Banner>> {
        match &self.backend {
            Backend::Structured(db) => db.banners_all(),
            Backend::Flat(flat) => Ok(flat.banners_all()),
        }
    }

    /// Deletes a banner by id. Absent ids are a no-op.
    pub fn delete_banner(&self, id: &str) -> Result<()> {
        match &self.backend {
            Backend::Structured(db) => db.delete_banner(id),
            Backend::Flat(flat) => flat.delete_banner(id),
        }
    }

    /// Best-effort usage estimate. Never fails; reports `{0, 0}` when
    /// nothing can be measured.
    #[must_use]
    pub fn storage_usage(&self) -> StorageUsage {
        match &self.backend {
            Backend::Structured(_) => StorageUsage {
                used: fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0),
                quota: 0,
            },
            Backend::Flat(flat) => StorageUsage {
                used: flat.bytes_used(),
                quota: flat.quota_bytes(),
            },
        }
    }
}

/// One-time migration of legacy flat-store collections into the structured
/// store. Runs only when the target collection is empty; clears the legacy
/// key afterwards so the next open performs no work.
///
/// Not guarded against a racing second open: duplicate puts are upserts, but
/// a record the user deleted in between could be re-inserted. Accepted
/// best-effort behavior.
fn migrate_legacy(db: &SqliteStore, legacy: &FlatStore) -> Result<()> {
    if db.assets_all()?.is_empty() && legacy.has_key(LEGACY_ASSETS_KEY) {
        let assets = legacy.assets_all();
        for asset in &assets {
            db.put_asset(asset)?;
        }
        legacy.remove_key(LEGACY_ASSETS_KEY)?;
        info!(migrated = assets.len(), "Migrated legacy assets");
    }

    if db.banners_all()?.is_empty() && legacy.has_key(LEGACY_BANNERS_KEY) {
        let banners = legacy.banners_all();
        for banner in &banners {
            db.put_banner(banner)?;
        }
        legacy.remove_key(LEGACY_BANNERS_KEY)?;
        info!(migrated = banners.len(), "Migrated legacy banners");
    }

    Ok(())
}
