use crate::config::RankingConfig;
use crate::model::ConceptCandidate;
use std::collections::HashMap;

/// Ranks candidate next concepts.
///
/// The ranking key is a weighted combination of the lift proxy and the
/// novelty distance, each min-max normalized over the candidate set so the
/// weights are comparable. Ties break on `concept_id` ascending, which keeps
/// the output deterministic for identical inputs.
///
/// Diversity: no more than `max_per_cluster` candidates of the same
/// cluster_id may sit above any candidate of another cluster; overflow
/// candidates are demoted below all cap-satisfying candidates, keeping their
/// relative order within the demoted group.
pub fn rank(cfg: &RankingConfig, candidates: Vec<ConceptCandidate>) -> Vec<ConceptCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let lift_norm = min_max(candidates.iter().map(|c| c.predicted_lift_proxy));
    let novelty_norm = min_max(candidates.iter().map(|c| f64::from(c.novelty_distance)));

    let mut keyed: Vec<(f64, ConceptCandidate)> = candidates
        .into_iter()
        .map(|c| {
            let key = cfg.lift_weight * lift_norm.apply(c.predicted_lift_proxy)
                + cfg.novelty_weight * novelty_norm.apply(f64::from(c.novelty_distance));
            (key, c)
        })
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| {
        kb.total_cmp(ka).then_with(|| a.concept_id.cmp(&b.concept_id))
    });

    let mut kept = Vec::with_capacity(keyed.len());
    let mut demoted = Vec::new();
    let mut per_cluster: HashMap<String, usize> = HashMap::new();
    for (_, c) in keyed {
        let seen = per_cluster.entry(c.cluster_id.clone()).or_insert(0);
        if *seen < cfg.max_per_cluster {
            *seen += 1;
            kept.push(c);
        } else {
            demoted.push(c);
        }
    }
    kept.extend(demoted);
    kept
}

/// Ranked shortlist truncated to the configured length.
pub fn shortlist(cfg: &RankingConfig, candidates: Vec<ConceptCandidate>) -> Vec<ConceptCandidate> {
    let mut out = rank(cfg, candidates);
    out.truncate(cfg.shortlist);
    out
}

struct MinMax {
    min: f64,
    span: f64,
}

impl MinMax {
    fn apply(&self, v: f64) -> f64 {
        if self.span > 0.0 {
            (v - self.min) / self.span
        } else {
            // Constant column: contributes equally to every candidate.
            0.5
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> MinMax {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    MinMax {
        min,
        span: max - min,
    }
}
