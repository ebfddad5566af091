use crate::errors::OptimizerError;
use crate::model::{Cpa, PerformanceRecord, Ratio, Trend, TrendMetric, WindowMetrics};
use chrono::Duration;

/// Inputs the aggregator needs beyond the records themselves. `adset_spend`
/// is the window spend across the whole ad set; without it spend_share
/// cannot be claimed and stays None.
#[derive(Debug, Clone, Copy)]
pub struct AggregateContext {
    pub window_days: u32,
    pub metric: TrendMetric,
    pub adset_spend: Option<f64>,
}

/// Rolling-window aggregation for a single creative.
///
/// Records are re-validated even though connectors claim to deduplicate:
/// a duplicated (creative_id, date) fails here rather than being silently
/// summed, since a silent merge would mask upstream data-quality bugs.
pub fn aggregate(
    creative_id: &str,
    records: &[PerformanceRecord],
    ctx: &AggregateContext,
) -> Result<WindowMetrics, OptimizerError> {
    let mut rows: Vec<&PerformanceRecord> = records
        .iter()
        .filter(|r| r.creative_id == creative_id)
        .collect();
    rows.sort_by_key(|r| r.date);

    for pair in rows.windows(2) {
        if pair[0].date == pair[1].date {
            return Err(OptimizerError::DuplicateRecord {
                creative_id: creative_id.to_string(),
                date: pair[0].date,
            });
        }
    }

    let windowed: Vec<&PerformanceRecord> = match rows.last() {
        Some(last) => {
            let cutoff = last.date - Duration::days(i64::from(ctx.window_days) - 1);
            rows.iter().copied().filter(|r| r.date >= cutoff).collect()
        }
        None => Vec::new(),
    };

    let impressions: u64 = windowed.iter().map(|r| r.impressions).sum();
    let clicks: u64 = windowed.iter().map(|r| r.clicks).sum();
    let conversions: u64 = windowed.iter().map(|r| r.conversions).sum();
    let spend: f64 = windowed.iter().map(|r| r.spend).sum();
    let days_observed = windowed.len() as u32;

    let ctr = if impressions == 0 {
        Ratio {
            value: 0.0,
            low_confidence: true,
        }
    } else {
        Ratio {
            value: clicks as f64 / impressions as f64,
            low_confidence: false,
        }
    };
    let cpa = if conversions == 0 {
        Cpa::NoConversions
    } else {
        Cpa::PerConversion(spend / conversions as f64)
    };
    let frequency = if days_observed == 0 {
        0.0
    } else {
        impressions as f64 / f64::from(days_observed)
    };
    let spend_share = match ctx.adset_spend {
        Some(total) if total > 0.0 => Some((spend / total).clamp(0.0, 1.0)),
        _ => None,
    };

    Ok(WindowMetrics {
        creative_id: creative_id.to_string(),
        window_days: ctx.window_days,
        days_observed,
        impressions,
        clicks,
        conversions,
        spend,
        ctr,
        cpa,
        frequency,
        spend_share,
        trend: trend_over(&windowed, ctx.metric),
    })
}

/// Least-squares slope of the selected metric over the windowed days.
/// Fewer than 2 usable points means no trend claim, which is a different
/// statement than a zero (flat) slope.
fn trend_over(windowed: &[&PerformanceRecord], metric: TrendMetric) -> Trend {
    let Some(first) = windowed.first() else {
        return Trend::InsufficientData;
    };
    let origin = first.date;

    let points: Vec<(f64, f64)> = windowed
        .iter()
        .filter_map(|r| {
            let x = (r.date - origin).num_days() as f64;
            match metric {
                TrendMetric::Ctr if r.impressions > 0 => {
                    Some((x, r.clicks as f64 / r.impressions as f64))
                }
                TrendMetric::Cpa if r.conversions > 0 => {
                    Some((x, r.spend / r.conversions as f64))
                }
                _ => None,
            }
        })
        .collect();

    if points.len() < 2 {
        return Trend::InsufficientData;
    }

    let per_day = least_squares_slope(&points);
    let mean = points.iter().map(|(_, y)| y).sum::<f64>() / points.len() as f64;
    let relative_per_day = if mean > 0.0 { per_day / mean } else { 0.0 };

    Trend::Slope {
        per_day,
        relative_per_day,
        points: points.len() as u32,
    }
}

fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return 0.0;
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    sxy / sxx
}
