use crate::config::OptimizerConfig;
use crate::model::{
    Classification, ContributingFactors, FatigueScore, FeatureVector, HashPair, Trend,
    TrendMetric, WindowMetrics,
};
use crate::signals::phash;
use chrono::NaiveDate;

/// Trend contribution in [0, 1], or None when no trend claim is possible.
///
/// Decline means falling CTR or rising CPA; it maps linearly from the
/// configured threshold to the saturating cutoff, so a worsening trend can
/// never lower the component.
pub fn trend_component(trend: &Trend, metric: TrendMetric, cfg: &OptimizerConfig) -> Option<f64> {
    let Trend::Slope {
        relative_per_day, ..
    } = trend
    else {
        return None;
    };
    let decline = match metric {
        TrendMetric::Ctr => -relative_per_day,
        TrendMetric::Cpa => *relative_per_day,
    };
    let s = &cfg.slope;
    if decline <= s.threshold {
        return Some(0.0);
    }
    Some(((decline - s.threshold) / (s.cutoff - s.threshold)).min(1.0))
}

/// Novelty-risk contribution in [0, 1], or None when there is nothing to
/// compare against (no visual features, or an empty recent set).
///
/// Small Hamming distance to a recently-shown creative means near-duplicate
/// look, which raises fatigue risk. Linear distance-to-score mapping capped
/// at `distance_cap_bits`.
pub fn novelty_component(
    visual: Option<&FeatureVector>,
    recent: &[HashPair],
    cfg: &OptimizerConfig,
) -> Option<f64> {
    let fv = visual?;
    let d = min_distance(fv.hashes(), recent)?;
    let cap = f64::from(cfg.novelty.distance_cap_bits);
    Some(1.0 - (f64::from(d).min(cap) / cap))
}

/// Min Hamming distance from `hashes` to the recent set, taking the closer
/// of the aHash and dHash views per neighbor.
pub fn min_distance(hashes: HashPair, recent: &[HashPair]) -> Option<u32> {
    recent
        .iter()
        .map(|r| phash::hamming(hashes.ahash, r.ahash).min(phash::hamming(hashes.dhash, r.dhash)))
        .min()
}

/// Fuses the available components into a bounded fatigue score.
///
/// Unknown components are excluded and the remaining weights renormalized;
/// an unknown is never treated as a zero. `quality` is an optional external
/// score in [0, 1] where 1 is best, contributed as fatigue risk 1 - q.
pub fn score(
    cfg: &OptimizerConfig,
    metrics: &WindowMetrics,
    visual: Option<&FeatureVector>,
    recent: &[HashPair],
    quality: Option<f64>,
    as_of: NaiveDate,
) -> FatigueScore {
    let factors = ContributingFactors {
        trend_component: trend_component(&metrics.trend, cfg.trend_metric, cfg),
        novelty_component: novelty_component(visual, recent, cfg),
        quality_component: quality.map(|q| 1.0 - q.clamp(0.0, 1.0)),
    };

    let available: Vec<(f64, f64)> = [
        (cfg.weights.trend, factors.trend_component),
        (cfg.weights.novelty, factors.novelty_component),
        (cfg.weights.quality, factors.quality_component),
    ]
    .into_iter()
    .filter_map(|(w, c)| match c {
        Some(v) if w > 0.0 => Some((w, v)),
        _ => None,
    })
    .collect();

    let weight_sum: f64 = available.iter().map(|(w, _)| w).sum();
    let (value, mut note) = if weight_sum > 0.0 {
        let fused = available.iter().map(|(w, v)| w * v).sum::<f64>() / weight_sum;
        (fused.clamp(0.0, 1.0), None)
    } else {
        (0.0, Some("no usable signals".to_string()))
    };

    let mut classification = classify(value, cfg);
    if cfg.min_window_impressions > 0 && metrics.impressions < cfg.min_window_impressions {
        classification = Classification::Fresh;
        note = Some(format!(
            "insufficient recent volume (<{} impressions)",
            cfg.min_window_impressions
        ));
    }

    FatigueScore {
        creative_id: metrics.creative_id.clone(),
        as_of,
        score: value,
        classification,
        factors,
        note,
    }
}

pub fn classify(score: f64, cfg: &OptimizerConfig) -> Classification {
    if score >= cfg.thresholds.fatigued_min {
        Classification::Fatigued
    } else if score < cfg.thresholds.fresh_max {
        Classification::Fresh
    } else {
        Classification::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cpa, Ratio};

    fn cfg() -> OptimizerConfig {
        OptimizerConfig::default()
    }

    fn metrics(trend: Trend, impressions: u64) -> WindowMetrics {
        WindowMetrics {
            creative_id: "cr_1".into(),
            window_days: 7,
            days_observed: 7,
            impressions,
            clicks: 200,
            conversions: 10,
            spend: 100.0,
            ctr: Ratio {
                value: 0.02,
                low_confidence: false,
            },
            cpa: Cpa::PerConversion(10.0),
            frequency: impressions as f64 / 7.0,
            spend_share: None,
            trend,
        }
    }

    fn slope(relative: f64) -> Trend {
        Trend::Slope {
            per_day: relative * 0.02,
            relative_per_day: relative,
            points: 7,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[test]
    fn trend_component_saturates_at_cutoff() {
        let c = cfg();
        assert_eq!(trend_component(&slope(-0.01), TrendMetric::Ctr, &c), Some(0.0));
        assert_eq!(trend_component(&slope(-0.40), TrendMetric::Ctr, &c), Some(1.0));
        let mid = trend_component(&slope(-0.135), TrendMetric::Ctr, &c).unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rising_cpa_raises_the_cpa_component() {
        let c = cfg();
        assert!(trend_component(&slope(0.30), TrendMetric::Cpa, &c).unwrap() > 0.9);
        assert_eq!(trend_component(&slope(-0.30), TrendMetric::Cpa, &c), Some(0.0));
    }

    #[test]
    fn insufficient_data_excludes_the_trend_component() {
        let c = cfg();
        assert_eq!(
            trend_component(&Trend::InsufficientData, TrendMetric::Ctr, &c),
            None
        );
    }

    #[test]
    fn near_duplicate_look_scores_high_novelty_risk() {
        let c = cfg();
        let fv = FeatureVector {
            creative_id: "cr_1".into(),
            ahash: 0xffff_0000_ffff_0000,
            dhash: 0x0f0f_0f0f_0f0f_0f0f,
            dominant_colors: vec![],
            brightness: 0.5,
            entropy: 4.0,
            overlay_text_density: crate::model::Signal::Unknown,
            text_length: 0,
            copy_readability: crate::model::Signal::Unknown,
        };
        // Distance 2 of 64 bits on the dhash view.
        let recent = vec![HashPair {
            ahash: !fv.ahash,
            dhash: fv.dhash ^ 0b11,
        }];
        let n = novelty_component(Some(&fv), &recent, &c).unwrap();
        assert!((n - (1.0 - 2.0 / 64.0)).abs() < 1e-9);

        // Empty recent set: unknown, not maximal risk.
        assert_eq!(novelty_component(Some(&fv), &[], &c), None);
        assert_eq!(novelty_component(None, &recent, &c), None);
    }

    #[test]
    fn unknown_components_renormalize_weights() {
        let c = cfg();
        // Only the trend component is available; score must equal it.
        let got = score(
            &c,
            &metrics(slope(-0.25), 10_000),
            None,
            &[],
            None,
            as_of(),
        );
        assert_eq!(got.factors.novelty_component, None);
        let trend = got.factors.trend_component.unwrap();
        assert!((got.score - trend).abs() < 1e-9);
    }

    #[test]
    fn no_signals_at_all_is_fresh_with_a_note() {
        let c = cfg();
        let got = score(
            &c,
            &metrics(Trend::InsufficientData, 10_000),
            None,
            &[],
            None,
            as_of(),
        );
        assert_eq!(got.score, 0.0);
        assert_eq!(got.classification, Classification::Fresh);
        assert!(got.note.unwrap().contains("no usable signals"));
    }

    #[test]
    fn trend_monotonicity_holds_with_novelty_fixed() {
        let c = cfg();
        let fv = FeatureVector {
            creative_id: "cr_1".into(),
            ahash: 0,
            dhash: 0,
            dominant_colors: vec![],
            brightness: 0.5,
            entropy: 4.0,
            overlay_text_density: crate::model::Signal::Unknown,
            text_length: 0,
            copy_readability: crate::model::Signal::Unknown,
        };
        let recent = vec![HashPair {
            ahash: 0xff,
            dhash: 0xff,
        }];
        let mut prev = -1.0;
        for step in 0..=40 {
            let relative = -(step as f64) * 0.01;
            let s = score(
                &c,
                &metrics(slope(relative), 10_000),
                Some(&fv),
                &recent,
                None,
                as_of(),
            );
            assert!(
                s.score >= prev - 1e-12,
                "score decreased at relative {relative}: {prev} -> {}",
                s.score
            );
            assert!((0.0..=1.0).contains(&s.score));
            prev = s.score;
        }
    }

    #[test]
    fn novelty_monotonicity_holds_with_trend_fixed() {
        let c = cfg();
        let recent = vec![HashPair { ahash: 0, dhash: 0 }];
        let mut prev = 2.0;
        for d in 0..=64u32 {
            // Exactly d bits set on both hash views: distance to recent is d.
            let pattern = if d == 64 { !0u64 } else { (1u64 << d) - 1 };
            let fv = FeatureVector {
                creative_id: "cr_1".into(),
                ahash: pattern,
                dhash: pattern,
                dominant_colors: vec![],
                brightness: 0.5,
                entropy: 4.0,
                overlay_text_density: crate::model::Signal::Unknown,
                text_length: 0,
                copy_readability: crate::model::Signal::Unknown,
            };
            assert_eq!(min_distance(fv.hashes(), &recent), Some(d));
            let s = score(
                &c,
                &metrics(slope(-0.10), 10_000),
                Some(&fv),
                &recent,
                None,
                as_of(),
            );
            assert!(
                s.score <= prev + 1e-12,
                "score increased as distance grew at d={d}"
            );
            assert!((0.0..=1.0).contains(&s.score));
            prev = s.score;
        }
    }

    #[test]
    fn volume_floor_forces_fresh() {
        let mut c = cfg();
        c.min_window_impressions = 500;
        let fv = FeatureVector {
            creative_id: "cr_1".into(),
            ahash: 0,
            dhash: 0,
            dominant_colors: vec![],
            brightness: 0.5,
            entropy: 4.0,
            overlay_text_density: crate::model::Signal::Unknown,
            text_length: 0,
            copy_readability: crate::model::Signal::Unknown,
        };
        let recent = vec![HashPair { ahash: 0, dhash: 0 }];
        let s = score(
            &c,
            &metrics(slope(-0.40), 100),
            Some(&fv),
            &recent,
            None,
            as_of(),
        );
        assert_eq!(s.classification, Classification::Fresh);
        assert!(s.note.unwrap().contains("insufficient recent volume"));
        // The score itself is still reported honestly.
        assert!(s.score > 0.9);
    }

    #[test]
    fn quality_component_is_inverted_and_weighted() {
        let mut c = cfg();
        c.weights.quality = 1.0;
        let s = score(
            &c,
            &metrics(slope(-0.25), 10_000),
            None,
            &[],
            Some(0.2),
            as_of(),
        );
        let t = s.factors.trend_component.unwrap();
        let q = s.factors.quality_component.unwrap();
        assert!((q - 0.8).abs() < 1e-9);
        assert!((s.score - (t + q) / 2.0).abs() < 1e-9);
    }
}
