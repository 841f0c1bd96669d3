//! SQLite-backed structured store for assets and banners.
//!
//! Two collections keyed by `id`, with a secondary ordering index on asset
//! upload time. The schema carries a single monotonically increasing version
//! in `PRAGMA user_version`; a version bump only ever creates collections
//! that are missing, existing ones are left untouched.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info, warn};

use crate::error::{BannerError, Result};
use crate::model::{Asset, AspectRatio, Banner, Slide};

/// Current schema version stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i32 = 1;

/// SQLite schema. Idempotent: safe to run against any prior version.
const SCHEMA_SQL: &str = r"
-- Reusable image assets
CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    image_url TEXT NOT NULL,
    name TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

-- Ordering index for asset listings
CREATE INDEX IF NOT EXISTS idx_assets_uploaded_at ON assets(uploaded_at);

-- Saved banner snapshots
CREATE TABLE IF NOT EXISTS banners (
    id TEXT PRIMARY KEY,
    slides_json TEXT NOT NULL,
    aspect_ratio TEXT NOT NULL,
    created_at TEXT NOT NULL,
    name TEXT
);
";

/// Database wrapper for the structured store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`BannerError::StoreUnavailable`] when the database cannot be
    /// opened or initialized; callers treat that as the signal to fall back
    /// to the flat store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BannerError::StoreUnavailable(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Opening banner database");
        let conn = Connection::open(path).map_err(unavailable)?;

        let store = Self { conn };
        store.init_schema()?;
        info!(path = %path.display(), "Banner database ready");
        Ok(store)
    }

    /// Creates an in-memory database (useful for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initializes the schema, creating any missing collections.
    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(unavailable)?;

        self.conn.execute_batch(SCHEMA_SQL).map_err(unavailable)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(unavailable)?;
            debug!(from = version, to = SCHEMA_VERSION, "Schema version updated");
        }
        Ok(())
    }

    // === Assets ===

    /// Upserts an asset by id.
    pub fn put_asset(&self, asset: &Asset) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO assets (id, image_url, name, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![asset.id, asset.image_url, asset.name, asset.uploaded_at],
            )
            .map_err(unavailable)?;
        debug!(id = %asset.id, "Asset stored");
        Ok(())
    }

    /// Returns all assets in implementation-defined order.
    pub fn assets_all(&self) -> Result<Vec<Asset>> {
        self.query_assets("SELECT id, image_url, name, uploaded_at FROM assets")
    }

    /// Returns all assets ordered by upload time (applies the secondary index).
    pub fn assets_by_uploaded_at(&self) -> Result<Vec<Asset>> {
        self.query_assets("SELECT id, image_url, name, uploaded_at FROM assets ORDER BY uploaded_at")
    }

    fn query_assets(&self, sql: &str) -> Result<Vec<Asset>> {
        let mut stmt = self.conn.prepare(sql).map_err(unavailable)?;
        let assets = stmt
            .query_map([], |row| {
                Ok(Asset {
                    id: row.get(0)?,
                    image_url: row.get(1)?,
                    name: row.get(2)?,
                    uploaded_at: row.get(3)?,
                })
            })
            .map_err(unavailable)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(unavailable)?;
        Ok(assets)
    }

    /// Deletes an asset by id. Absent ids are a no-op, not an error.
    pub fn delete_asset(&self, id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM assets WHERE id = ?1", params![id])
            .map_err(unavailable)?;
        if deleted > 0 {
            debug!(id, "Asset deleted");
        }
        Ok(())
    }

    // === Banners ===

    /// Upserts a banner by id.
    pub fn put_banner(&self, banner: &Banner) -> Result<()> {
        let slides_json = serde_json::to_string(&banner.slides)
            .map_err(|e| BannerError::Other(format!("Failed to serialize slides: {e}")))?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO banners (id, slides_json, aspect_ratio, created_at, name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    banner.id,
                    slides_json,
                    banner.aspect_ratio.as_str(),
                    banner.created_at,
                    banner.name,
                ],
            )
            .map_err(unavailable)?;
        debug!(id = %banner.id, slides = banner.slides.len(), "Banner stored");
        Ok(())
    }

    /// Returns all banners in implementation-defined order.
    ///
    /// Rows whose slide payload no longer parses are skipped; stored banners
    /// are tolerated as-is, not revalidated.
    pub fn banners_all(&self) -> Result<Vec<Banner>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, slides_json, aspect_ratio, created_at, name FROM banners")
            .map_err(unavailable)?;

        let rows: Vec<(String, String, String, String, Option<String>)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .map_err(unavailable)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(unavailable)?;

        let mut banners = Vec::with_capacity(rows.len());
        for (id, slides_json, aspect_ratio, created_at, name) in rows {
            let slides: Vec<Slide> = match serde_json::from_str(&slides_json) {
                Ok(slides) => slides,
                Err(e) => {
                    warn!(id, error = %e, "Skipping banner with unreadable slides");
                    continue;
                }
            };
            let aspect_ratio = aspect_ratio.parse().unwrap_or(AspectRatio::Ratio16x9);
            banners.push(Banner {
                id,
                slides,
                aspect_ratio,
                created_at,
                name,
            });
        }
        Ok(banners)
    }

    /// Deletes a banner by id. Absent ids are a no-op, not an error.
    pub fn delete_banner(&self, id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM banners WHERE id = ?1", params![id])
            .map_err(unavailable)?;
        if deleted > 0 {
            debug!(id, "Banner deleted");
        }
        Ok(())
    }
}

fn unavailable(e: rusqlite::Error) -> BannerError {
    BannerError::StoreUnavailable(e.to_string())
}
