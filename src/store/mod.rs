//! Asset and banner persistence.
//!
//! Two backends behind one gateway: a versioned SQLite store (preferred) and
//! a flat JSON key-value store for environments where the database cannot be
//! opened. The backend is chosen once per gateway; legacy flat-store data is
//! migrated into the database the first time the structured backend opens.

mod db;
mod flat;
mod gateway;

pub use db::SqliteStore;
pub use flat::{ASSET_CAP, DEFAULT_QUOTA_BYTES, FlatStore, LEGACY_ASSETS_KEY, LEGACY_BANNERS_KEY, sanitize_assets};
pub use gateway::{StorageGateway, StorageUsage};
