use crate::fingerprint::feature_cache_key;
use crate::model::FeatureVector;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Persistent FeatureVector cache keyed by (creative_id, asset content hash).
///
/// Extraction is deterministic over asset bytes, so a hit is always valid;
/// the extractor version is folded into the key (see `feature_cache_key`)
/// so logic changes invalidate instead of serving stale vectors.
pub struct FeatureCache {
    conn: Mutex<Connection>,
}

impl FeatureCache {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS feature_cache (
                cache_key   TEXT PRIMARY KEY,
                creative_id TEXT NOT NULL,
                asset_hash  TEXT NOT NULL,
                features    TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(
        &self,
        creative_id: &str,
        asset_hash: &str,
    ) -> anyhow::Result<Option<FeatureVector>> {
        let key = feature_cache_key(creative_id, asset_hash);
        let conn = self.conn.lock().expect("feature cache mutex poisoned");
        let raw: Option<String> = conn
            .query_row(
                "SELECT features FROM feature_cache WHERE cache_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, asset_hash: &str, features: &FeatureVector) -> anyhow::Result<()> {
        let key = feature_cache_key(&features.creative_id, asset_hash);
        let json = serde_json::to_string(features)?;
        let conn = self.conn.lock().expect("feature cache mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO feature_cache (cache_key, creative_id, asset_hash, features)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, features.creative_id, asset_hash, json],
        )?;
        Ok(())
    }
}
