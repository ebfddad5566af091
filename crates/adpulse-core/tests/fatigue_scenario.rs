//! End-to-end scoring scenarios over the aggregator + scorer, with the
//! default configuration.

use adpulse_core::config::OptimizerConfig;
use adpulse_core::fatigue;
use adpulse_core::model::{
    Classification, FeatureVector, HashPair, PerformanceRecord, Signal, TrendMetric,
};
use adpulse_core::perf::{aggregate, AggregateContext};
use chrono::NaiveDate;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
}

/// 7 days of CTR declining 2.5% -> 1.0%.
fn declining_week(creative_id: &str) -> Vec<PerformanceRecord> {
    (0..7)
        .map(|i| PerformanceRecord {
            creative_id: creative_id.into(),
            date: day(1 + i),
            impressions: 10_000,
            clicks: 250 - 25 * u64::from(i),
            conversions: 5,
            spend: 40.0,
        })
        .collect()
}

fn features(creative_id: &str, ahash: u64, dhash: u64) -> FeatureVector {
    FeatureVector {
        creative_id: creative_id.into(),
        ahash,
        dhash,
        dominant_colors: vec![],
        brightness: 0.5,
        entropy: 4.0,
        overlay_text_density: Signal::Unknown,
        text_length: 20,
        copy_readability: Signal::Known(0.8),
    }
}

#[test]
fn declining_ctr_with_near_duplicate_look_is_fatigued() {
    let cfg = OptimizerConfig::default();
    let ctx = AggregateContext {
        window_days: cfg.window_days,
        metric: TrendMetric::Ctr,
        adset_spend: None,
    };
    let records = declining_week("cr_1");
    let metrics = aggregate("cr_1", &records, &ctx).unwrap();

    let fv = features("cr_1", 0xffff_0000_ffff_0000, 0x0f0f_0f0f_0f0f_0f0f);
    // Minimum Hamming distance 2 of 64 bits to the recent set.
    let recent = vec![
        HashPair {
            ahash: !fv.ahash,
            dhash: fv.dhash ^ 0b11,
        },
        HashPair {
            ahash: !fv.ahash,
            dhash: !fv.dhash,
        },
    ];

    let score = fatigue::score(&cfg, &metrics, Some(&fv), &recent, None, day(7));
    assert!(
        (0.0..=1.0).contains(&score.score),
        "score out of bounds: {}",
        score.score
    );
    assert_eq!(score.classification, Classification::Fatigued);
    assert!(score.factors.trend_component.unwrap() > 0.3);
    assert!(score.factors.novelty_component.unwrap() > 0.9);
}

#[test]
fn stable_ctr_with_novel_look_is_fresh() {
    let cfg = OptimizerConfig::default();
    let ctx = AggregateContext {
        window_days: cfg.window_days,
        metric: TrendMetric::Ctr,
        adset_spend: None,
    };
    let records: Vec<PerformanceRecord> = (0..7)
        .map(|i| PerformanceRecord {
            creative_id: "cr_2".into(),
            date: day(1 + i),
            impressions: 10_000,
            clicks: 200,
            conversions: 5,
            spend: 40.0,
        })
        .collect();
    let metrics = aggregate("cr_2", &records, &ctx).unwrap();

    let fv = features("cr_2", 0, 0);
    let recent = vec![HashPair {
        ahash: !0,
        dhash: !0,
    }];
    let score = fatigue::score(&cfg, &metrics, Some(&fv), &recent, None, day(7));
    assert_eq!(score.classification, Classification::Fresh);
}

#[test]
fn classification_is_consistent_with_thresholds() {
    let cfg = OptimizerConfig::default();
    for score_value in [0.0, 0.1, 0.29, 0.3, 0.45, 0.59, 0.6, 0.8, 1.0] {
        let c = fatigue::classify(score_value, &cfg);
        if score_value < cfg.thresholds.fresh_max {
            assert_eq!(c, Classification::Fresh, "at {score_value}");
        } else if score_value >= cfg.thresholds.fatigued_min {
            assert_eq!(c, Classification::Fatigued, "at {score_value}");
        } else {
            assert_eq!(c, Classification::Warning, "at {score_value}");
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    let cfg = OptimizerConfig::default();
    let ctx = AggregateContext {
        window_days: cfg.window_days,
        metric: TrendMetric::Ctr,
        adset_spend: Some(500.0),
    };
    let records = declining_week("cr_1");
    let fv = features("cr_1", 0x1234, 0x5678);
    let recent = vec![HashPair {
        ahash: 0x1230,
        dhash: 0x5670,
    }];

    let run = || {
        let metrics = aggregate("cr_1", &records, &ctx).unwrap();
        fatigue::score(&cfg, &metrics, Some(&fv), &recent, None, day(7))
    };
    let a = run();
    let b = run();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
