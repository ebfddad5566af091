use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A creative is immutable once created; a revised asset or copy is a new
/// creative carrying `derived_from` as a lookup reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creative {
    pub creative_id: String,
    pub platform: String,
    #[serde(rename = "creative_type")]
    pub kind: CreativeKind,
    pub asset: AssetRef,
    pub first_seen: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeKind {
    Image,
    Video,
    Carousel,
    Text,
}

impl CreativeKind {
    /// Whether this kind carries a visual asset the extractor can decode.
    pub fn has_visual_asset(&self) -> bool {
        !matches!(self, CreativeKind::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AssetRef {
    Uri { uri: String },
    ContentHash { sha256: String },
}

/// One row per creative per day, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub creative_id: String,
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
}

/// Explicit unknown-aware state for optional signals.
///
/// Unknown means "not measured", which downstream fusion excludes entirely;
/// it is never collapsed into a zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum Signal<T> {
    Known(T),
    Unknown,
}

impl<T> Signal<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Signal::Known(v) => Some(v),
            Signal::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Signal::Unknown)
    }
}

/// Deterministically derived from the creative's asset bytes and copy text.
/// Cached keyed by (creative_id, asset content hash, extractor version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub creative_id: String,
    pub ahash: u64,
    pub dhash: u64,
    pub dominant_colors: Vec<String>,
    /// Mean grayscale brightness in [0, 1].
    pub brightness: f64,
    /// Shannon entropy of the grayscale histogram, in bits.
    pub entropy: f64,
    /// Fraction of the image area covered by overlay text, when an OCR pass
    /// was available.
    pub overlay_text_density: Signal<f64>,
    pub text_length: u32,
    pub copy_readability: Signal<f64>,
}

impl FeatureVector {
    pub fn hashes(&self) -> HashPair {
        HashPair {
            ahash: self.ahash,
            dhash: self.dhash,
        }
    }
}

/// The two perceptual hashes of a creative, as used for novelty distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashPair {
    pub ahash: u64,
    pub dhash: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Fresh,
    Warning,
    Fatigued,
}

/// Per-component contributions that went into a fused fatigue score.
/// `None` marks a component that was unknown and excluded from fusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_component: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novelty_component: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_component: Option<f64>,
}

/// Recomputed on demand from PerformanceRecord + FeatureVector; never the
/// source of truth for performance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueScore {
    pub creative_id: String,
    pub as_of: NaiveDate,
    pub score: f64,
    pub classification: Classification,
    pub factors: ContributingFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum ConceptSource {
    New,
    Creative { creative_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptCandidate {
    pub concept_id: String,
    #[serde(flatten)]
    pub source: ConceptSource,
    pub predicted_lift_proxy: f64,
    /// Min Hamming distance (bits) to the recently-shown set.
    pub novelty_distance: u32,
    pub cluster_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    RotateAsset,
    UpdateCopy,
    Pause,
}

/// Created by the engine from fatigue classifications; the guardrail gate
/// only annotates a verdict, it never mutates the action itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub action_type: ActionKind,
    pub creative_id: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_copy: Option<String>,
}

/// CTR with a confidence marker; zero impressions yields 0.0 flagged
/// low-confidence rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    pub value: f64,
    pub low_confidence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum Cpa {
    PerConversion(f64),
    NoConversions,
}

/// Trend over the window. `InsufficientData` is a reported state, not an
/// error: it means "no trend claim possible", which is different from flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Trend {
    Slope {
        per_day: f64,
        /// Slope divided by the window mean of the metric, so thresholds are
        /// scale-free across ad sets.
        relative_per_day: f64,
        points: u32,
    },
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Ctr,
    Cpa,
}

impl Default for TrendMetric {
    fn default() -> Self {
        TrendMetric::Ctr
    }
}

/// Rolling-window aggregation output for one creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub creative_id: String,
    pub window_days: u32,
    pub days_observed: u32,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
    pub ctr: Ratio,
    pub cpa: Cpa,
    /// Impressions per observed day; exposure-rate proxy in the absence of
    /// per-user reach data.
    pub frequency: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend_share: Option<f64>,
    pub trend: Trend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_unknown_is_not_a_value() {
        let s: Signal<f64> = Signal::Unknown;
        assert!(s.is_unknown());
        assert_eq!(s.known(), None);
        assert_eq!(*Signal::Known(0.4).known().unwrap(), 0.4);
    }

    #[test]
    fn creative_round_trips_through_json() {
        let c = Creative {
            creative_id: "cr_1".into(),
            platform: "meta".into(),
            kind: CreativeKind::Image,
            asset: AssetRef::Uri {
                uri: "gs://b/cr_1.png".into(),
            },
            first_seen: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            copy_text: Some("hello".into()),
            derived_from: None,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"creative_type\":\"image\""));
        let back: Creative = serde_json::from_str(&json).unwrap();
        assert_eq!(back.creative_id, c.creative_id);
        assert_eq!(back.kind, CreativeKind::Image);
    }

    #[test]
    fn text_kind_has_no_visual_asset() {
        assert!(!CreativeKind::Text.has_visual_asset());
        assert!(CreativeKind::Carousel.has_visual_asset());
    }

    #[test]
    fn concept_source_tags_flatten() {
        let c = ConceptCandidate {
            concept_id: "k1".into(),
            source: ConceptSource::Creative {
                creative_id: "cr_9".into(),
            },
            predicted_lift_proxy: 0.8,
            novelty_distance: 12,
            cluster_id: "ugc".into(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["source"], "creative");
        assert_eq!(json["creative_id"], "cr_9");
    }
}
