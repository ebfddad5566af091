use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Content address of a creative asset. Feature extraction is deterministic
/// over asset bytes, so this is the cache identity for a FeatureVector.
pub fn asset_content_hash(bytes: &[u8]) -> String {
    sha256_hex(bytes)
}

/// Cache key for a computed FeatureVector.
///
/// The crate version is folded in so a change to extraction logic invalidates
/// every cached vector instead of serving stale features.
pub fn feature_cache_key(creative_id: &str, asset_hash: &str) -> String {
    let mut h = Sha256::new();
    h.update(creative_id.as_bytes());
    h.update(b"\n");
    h.update(asset_hash.as_bytes());
    h.update(b"\n");
    h.update(env!("CARGO_PKG_VERSION").as_bytes());
    format!("{:x}", h.finalize())
}
