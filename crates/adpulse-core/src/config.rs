use crate::errors::OptimizerError;
use crate::model::TrendMetric;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizerConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default)]
    pub trend_metric: TrendMetric,
    /// Below this many impressions in the window the classification is forced
    /// to fresh (insufficient volume to call fatigue). 0 disables the floor.
    #[serde(default)]
    pub min_window_impressions: u64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub weights: ComponentWeights,
    #[serde(default)]
    pub novelty: NoveltyConfig,
    #[serde(default)]
    pub slope: SlopeConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guardrails: Vec<GuardrailRuleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            trend_metric: TrendMetric::Ctr,
            min_window_impressions: 0,
            thresholds: Thresholds::default(),
            weights: ComponentWeights::default(),
            novelty: NoveltyConfig::default(),
            slope: SlopeConfig::default(),
            ranking: RankingConfig::default(),
            guardrails: Vec::new(),
            parallel: None,
        }
    }
}

fn default_window_days() -> u32 {
    7
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    pub fresh_max: f64,
    pub fatigued_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fresh_max: 0.3,
            fatigued_min: 0.6,
        }
    }
}

/// Fusion weights. Components reported unknown are excluded and the weights
/// of the remaining components renormalized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComponentWeights {
    pub trend: f64,
    pub novelty: f64,
    #[serde(default)]
    pub quality: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            trend: 1.0,
            novelty: 1.0,
            quality: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NoveltyConfig {
    /// How many most-recently-shown creatives form the comparison set.
    pub recent_set_size: usize,
    /// Hamming distances at or above this cap count as fully novel.
    pub distance_cap_bits: u32,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            recent_set_size: 10,
            distance_cap_bits: crate::signals::phash::HASH_BITS,
        }
    }
}

/// Relative metric decline per day, mapped linearly onto [0, 1] between
/// `threshold` and `cutoff`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SlopeConfig {
    pub threshold: f64,
    pub cutoff: f64,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            threshold: 0.02,
            cutoff: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankingConfig {
    pub lift_weight: f64,
    pub novelty_weight: f64,
    pub max_per_cluster: usize,
    pub shortlist: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            lift_weight: 0.6,
            novelty_weight: 0.4,
            max_per_cluster: 2,
            shortlist: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardrailRuleConfig {
    MinActiveCreatives {
        #[serde(default = "default_min_active")]
        min_active: u32,
    },
    BlockedTerms {
        #[serde(default)]
        terms: Vec<String>,
        #[serde(default)]
        patterns: Vec<String>,
    },
    SpendShareReview {
        max_share: f64,
    },
}

fn default_min_active() -> u32 {
    1
}

impl OptimizerConfig {
    /// Construction-time validation; every scoring entry point assumes a
    /// validated config.
    pub fn validate(&self) -> Result<(), OptimizerError> {
        let fail = |msg: String| Err(OptimizerError::ConfigInvalid(msg));

        if self.window_days < 1 {
            return fail("window_days must be >= 1".into());
        }
        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.fresh_max) || !(0.0..=1.0).contains(&t.fatigued_min) {
            return fail(format!(
                "thresholds must be in [0, 1], got fresh_max={} fatigued_min={}",
                t.fresh_max, t.fatigued_min
            ));
        }
        if t.fresh_max >= t.fatigued_min {
            return fail(format!(
                "fresh_max ({}) must be below fatigued_min ({})",
                t.fresh_max, t.fatigued_min
            ));
        }
        let w = &self.weights;
        if w.trend < 0.0 || w.novelty < 0.0 || w.quality < 0.0 {
            return fail("component weights must be non-negative".into());
        }
        if w.trend + w.novelty + w.quality <= 0.0 {
            return fail("at least one component weight must be positive".into());
        }
        if self.novelty.recent_set_size < 1 {
            return fail("novelty.recent_set_size must be >= 1".into());
        }
        let cap = self.novelty.distance_cap_bits;
        if cap < 1 || cap > crate::signals::phash::HASH_BITS {
            return fail(format!(
                "novelty.distance_cap_bits must be in 1..={}, got {}",
                crate::signals::phash::HASH_BITS,
                cap
            ));
        }
        let s = &self.slope;
        if s.threshold < 0.0 {
            return fail("slope.threshold must be >= 0".into());
        }
        if s.cutoff <= s.threshold {
            return fail(format!(
                "slope.cutoff ({}) must exceed slope.threshold ({})",
                s.cutoff, s.threshold
            ));
        }
        let r = &self.ranking;
        if r.lift_weight < 0.0 || r.novelty_weight < 0.0 {
            return fail("ranking weights must be non-negative".into());
        }
        if r.lift_weight + r.novelty_weight <= 0.0 {
            return fail("at least one ranking weight must be positive".into());
        }
        if r.max_per_cluster < 1 {
            return fail("ranking.max_per_cluster must be >= 1".into());
        }
        if r.shortlist < 1 {
            return fail("ranking.shortlist must be >= 1".into());
        }
        for rule in &self.guardrails {
            if let GuardrailRuleConfig::SpendShareReview { max_share } = rule {
                if !(*max_share > 0.0 && *max_share <= 1.0) {
                    return fail(format!(
                        "spend_share_review.max_share must be in (0, 1], got {max_share}"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Loads and validates a YAML config.
///
/// Unknown keys fail in strict mode and are logged otherwise, so a typoed
/// threshold never silently falls back to a default.
pub fn load_config(path: &Path, strict: bool) -> Result<OptimizerConfig, OptimizerError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        OptimizerError::ConfigInvalid(format!("failed to read config {}: {}", path.display(), e))
    })?;
    load_config_str(&raw, strict)
}

pub fn load_config_str(raw: &str, strict: bool) -> Result<OptimizerConfig, OptimizerError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: OptimizerConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| OptimizerError::ConfigInvalid(format!("failed to parse YAML: {e}")))?;

    if !ignored_keys.is_empty() {
        let meaningful: Vec<_> = ignored_keys
            .iter()
            .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
            .collect();
        if !meaningful.is_empty() {
            if strict {
                return Err(OptimizerError::ConfigInvalid(format!(
                    "unknown config fields in strict mode: {meaningful:?}"
                )));
            }
            tracing::warn!(fields = ?meaningful, "ignoring unknown config fields");
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), OptimizerError> {
    std::fs::write(
        path,
        r#"window_days: 7
trend_metric: ctr
min_window_impressions: 500
thresholds:
  fresh_max: 0.3
  fatigued_min: 0.6
weights:
  trend: 1.0
  novelty: 1.0
  quality: 0.0
novelty:
  recent_set_size: 10
  distance_cap_bits: 64
slope:
  threshold: 0.02
  cutoff: 0.25
ranking:
  lift_weight: 0.6
  novelty_weight: 0.4
  max_per_cluster: 2
  shortlist: 10
guardrails:
  - type: min_active_creatives
    min_active: 1
  - type: blocked_terms
    terms: ["cure", "guarantee", "clickbait", "shockingly", "you won't believe"]
  - type: spend_share_review
    max_share: 0.5
"#,
    )
    .map_err(|e| OptimizerError::ConfigInvalid(format!("failed to write sample config: {e}")))?;
    Ok(())
}
