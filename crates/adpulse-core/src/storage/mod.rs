pub mod feature_cache;
