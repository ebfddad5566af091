pub mod config;
pub mod engine;
pub mod errors;
pub mod fatigue;
pub mod fingerprint;
pub mod guardrail;
pub mod model;
pub mod perf;
pub mod providers;
pub mod ranker;
pub mod signals;
pub mod storage;
