use crate::config::OptimizerConfig;
use crate::fatigue;
use crate::fingerprint::asset_content_hash;
use crate::guardrail::{gate_actions, ActionContext, GatedAction, GuardrailRule};
use crate::model::{
    ActionKind, Classification, Creative, FatigueScore, FeatureVector, HashPair,
    PerformanceRecord, ProposedAction, WindowMetrics,
};
use crate::perf::{aggregate, AggregateContext};
use crate::providers::quality::QualityProvider;
use crate::signals::{self, OcrResult};
use crate::storage::feature_cache::FeatureCache;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Everything the pipeline needs for one creative, fetched upfront by the
/// caller. No stage inside the engine performs I/O beyond the optional
/// feature cache and quality provider.
#[derive(Debug, Clone)]
pub struct CreativeInput {
    pub creative: Creative,
    pub asset_bytes: Option<Vec<u8>>,
    pub records: Vec<PerformanceRecord>,
    pub ocr: Option<OcrResult>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCreative {
    pub creative_id: String,
    pub metrics: WindowMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    pub fatigue: FatigueScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCreative {
    pub creative_id: String,
    pub reason: String,
}

/// Batch output: successes and per-item failures side by side, plus the
/// guardrail-gated action proposals. One bad creative never aborts the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub as_of: NaiveDate,
    pub scored: Vec<ScoredCreative>,
    pub skipped: Vec<SkippedCreative>,
    pub actions: Vec<GatedAction>,
}

struct Staged {
    creative: Creative,
    active: bool,
    metrics: WindowMetrics,
    features: Option<FeatureVector>,
}

pub struct Runner {
    pub config: Arc<OptimizerConfig>,
    pub quality: Arc<dyn QualityProvider>,
    pub rules: Vec<Arc<dyn GuardrailRule>>,
    pub cache: Option<Arc<FeatureCache>>,
}

impl Runner {
    /// Runs extract -> aggregate -> score -> propose -> gate over a batch.
    ///
    /// Extraction and aggregation are independent per creative and run under
    /// bounded parallelism; output order follows input order regardless of
    /// completion order, so identical inputs give identical reports.
    pub async fn score_batch(
        &self,
        inputs: Vec<CreativeInput>,
        as_of: NaiveDate,
    ) -> anyhow::Result<BatchReport> {
        let parallel = self.config.parallel.unwrap_or(4).max(1);
        let sem = Arc::new(Semaphore::new(parallel));
        let mut handles = Vec::with_capacity(inputs.len());

        for input in inputs {
            let permit = sem.clone().acquire_owned().await?;
            let config = self.config.clone();
            let cache = self.cache.clone();
            let h = tokio::spawn(async move {
                let _permit = permit;
                stage_creative(&config, cache.as_deref(), input)
            });
            handles.push(h);
        }

        let mut staged: Vec<Staged> = Vec::new();
        let mut skipped: Vec<SkippedCreative> = Vec::new();
        for h in handles {
            match h.await {
                Ok(Ok(s)) => staged.push(s),
                Ok(Err(skip)) => skipped.push(skip),
                Err(e) => skipped.push(SkippedCreative {
                    creative_id: "unknown".into(),
                    reason: format!("task error: {e}"),
                }),
            }
        }

        // Spend share needs the ad-set total, known only once every window
        // is aggregated.
        let total_spend: f64 = staged.iter().map(|s| s.metrics.spend).sum();
        if total_spend > 0.0 {
            for s in &mut staged {
                s.metrics.spend_share = Some((s.metrics.spend / total_spend).clamp(0.0, 1.0));
            }
        }

        let recent = recent_hashes(&staged, self.config.novelty.recent_set_size);

        let mut scored: Vec<ScoredCreative> = Vec::with_capacity(staged.len());
        for s in &staged {
            let recent_for: Vec<HashPair> = recent
                .iter()
                .filter(|(id, _)| id != &s.creative.creative_id)
                .map(|(_, pair)| *pair)
                .collect();

            let quality = match self.quality.quality(&s.creative, None).await {
                Ok(q) => q,
                Err(e) => {
                    tracing::warn!(
                        creative_id = %s.creative.creative_id,
                        error = %e,
                        "quality provider failed; continuing on deterministic signals"
                    );
                    None
                }
            };

            let fatigue_score = fatigue::score(
                &self.config,
                &s.metrics,
                s.features.as_ref(),
                &recent_for,
                quality,
                as_of,
            );
            scored.push(ScoredCreative {
                creative_id: s.creative.creative_id.clone(),
                metrics: s.metrics.clone(),
                features: s.features.clone(),
                fatigue: fatigue_score,
            });
        }

        let active_in_adset = staged.iter().filter(|s| s.active).count() as u32;
        let proposals = propose_actions(
            scored
                .iter()
                .zip(staged.iter())
                .filter(|(_, s)| s.active)
                .map(|(sc, _)| sc),
        );
        let actions = gate_actions(proposals, &self.rules, |action| {
            let spend_share = scored
                .iter()
                .find(|sc| sc.creative_id == action.creative_id)
                .and_then(|sc| sc.metrics.spend_share);
            ActionContext {
                active_in_adset,
                spend_share,
            }
        });

        Ok(BatchReport {
            as_of,
            scored,
            skipped,
            actions,
        })
    }
}

fn stage_creative(
    config: &OptimizerConfig,
    cache: Option<&FeatureCache>,
    input: CreativeInput,
) -> Result<Staged, SkippedCreative> {
    let creative_id = input.creative.creative_id.clone();
    let skip = |reason: String| SkippedCreative {
        creative_id: creative_id.clone(),
        reason,
    };

    let features = if input.creative.kind.has_visual_asset() {
        let bytes = input
            .asset_bytes
            .as_deref()
            .ok_or_else(|| skip("asset unreadable: no asset bytes provided".into()))?;
        let asset_hash = asset_content_hash(bytes);

        let cached = cache
            .map(|c| c.get(&creative_id, &asset_hash))
            .transpose()
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "feature cache read failed; extracting");
                None
            })
            .flatten();
        let fv = match cached {
            Some(fv) => fv,
            None => {
                let fv = signals::extract(&input.creative, bytes, input.ocr.as_ref())
                    .map_err(|e| skip(e.to_string()))?;
                if let Some(c) = cache {
                    if let Err(e) = c.put(&asset_hash, &fv) {
                        tracing::debug!(error = %e, "feature cache write failed");
                    }
                }
                fv
            }
        };
        Some(fv)
    } else {
        None
    };

    let ctx = AggregateContext {
        window_days: config.window_days,
        metric: config.trend_metric,
        adset_spend: None,
    };
    let metrics =
        aggregate(&creative_id, &input.records, &ctx).map_err(|e| skip(e.to_string()))?;

    Ok(Staged {
        creative: input.creative,
        active: input.active,
        metrics,
        features,
    })
}

/// The N most recently introduced creatives with visual features, as the
/// novelty comparison set. Sorted by first_seen then id, so the recent set
/// is deterministic.
fn recent_hashes(staged: &[Staged], n: usize) -> Vec<(String, HashPair)> {
    let mut with_features: Vec<&Staged> =
        staged.iter().filter(|s| s.features.is_some()).collect();
    with_features.sort_by(|a, b| {
        b.creative
            .first_seen
            .cmp(&a.creative.first_seen)
            .then_with(|| a.creative.creative_id.cmp(&b.creative.creative_id))
    });
    with_features
        .into_iter()
        .take(n)
        .map(|s| {
            let fv = s.features.as_ref().expect("filtered on features");
            (s.creative.creative_id.clone(), fv.hashes())
        })
        .collect()
}

/// Classification-driven action proposals: fatigued creatives get paused,
/// warnings get fresh copy. Fresh creatives generate nothing.
pub fn propose_actions<'a>(
    scored: impl Iterator<Item = &'a ScoredCreative>,
) -> Vec<ProposedAction> {
    let mut actions = Vec::new();
    for sc in scored {
        match sc.fatigue.classification {
            Classification::Fatigued => actions.push(ProposedAction {
                action_type: ActionKind::Pause,
                creative_id: sc.creative_id.clone(),
                rationale: format!(
                    "fatigued (score {:.3}); pause and rotate in a ranked concept",
                    sc.fatigue.score
                ),
                proposed_copy: None,
            }),
            Classification::Warning => actions.push(ProposedAction {
                action_type: ActionKind::UpdateCopy,
                creative_id: sc.creative_id.clone(),
                rationale: format!(
                    "fatigue risk (score {:.3}); refresh the copy before performance decays",
                    sc.fatigue.score
                ),
                proposed_copy: None,
            }),
            Classification::Fresh => {}
        }
    }
    actions
}
