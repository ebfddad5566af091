use super::{exit_codes, load_config_or_exit, read_json};
use crate::cli::args::ScoreArgs;
use adpulse_core::engine::runner::{BatchReport, CreativeInput, Runner};
use adpulse_core::model::{Classification, Creative, PerformanceRecord};
use adpulse_core::providers::quality::{HttpQualityProvider, NullQualityProvider, QualityProvider};
use adpulse_core::signals::OcrResult;
use adpulse_core::storage::feature_cache::FeatureCache;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// One entry of the creatives manifest: the creative record plus where its
/// asset bytes live on disk and whether it is currently serving.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(flatten)]
    creative: Creative,
    #[serde(default)]
    asset_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    ocr: Option<OcrResult>,
}

fn default_true() -> bool {
    true
}

pub async fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let cfg = match load_config_or_exit(&args.config, args.strict) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let manifest: Vec<ManifestEntry> = read_json(&args.creatives)?;
    let records: Vec<PerformanceRecord> = read_json(&args.performance)?;

    let as_of = match args.as_of.or_else(|| records.iter().map(|r| r.date).max()) {
        Some(d) => d,
        None => {
            eprintln!("error: no performance records and no --as-of date");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let quality: Arc<dyn QualityProvider> = match &args.quality_endpoint {
        Some(endpoint) => Arc::new(HttpQualityProvider::new(endpoint.clone())?),
        None => Arc::new(NullQualityProvider),
    };
    let cache = match &args.cache {
        Some(path) => Some(Arc::new(FeatureCache::open(path)?)),
        None => None,
    };
    let rules = if cfg.guardrails.is_empty() {
        adpulse_rules::default_rules()
    } else {
        adpulse_rules::rules_from_config(&cfg.guardrails)
    };

    let inputs: Vec<CreativeInput> = manifest
        .into_iter()
        .map(|entry| {
            let asset_bytes = entry.asset_path.as_ref().and_then(|p| {
                let resolved = match &args.assets_dir {
                    Some(dir) => dir.join(p),
                    None => p.clone(),
                };
                match std::fs::read(&resolved) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        eprintln!("warn: could not read asset {}: {e}", resolved.display());
                        None
                    }
                }
            });
            let creative_id = entry.creative.creative_id.clone();
            CreativeInput {
                creative: entry.creative,
                asset_bytes,
                records: records
                    .iter()
                    .filter(|r| r.creative_id == creative_id)
                    .cloned()
                    .collect(),
                ocr: entry.ocr,
                active: entry.active,
            }
        })
        .collect();

    let runner = Runner {
        config: Arc::new(cfg),
        quality,
        rules,
        cache,
    };
    let report = runner.score_batch(inputs, as_of).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }
    Ok(exit_codes::OK)
}

fn print_text(report: &BatchReport) {
    println!("as of {}", report.as_of);
    println!();
    for s in &report.scored {
        let marker = match s.fatigue.classification {
            Classification::Fresh => "fresh   ",
            Classification::Warning => "warning ",
            Classification::Fatigued => "fatigued",
        };
        println!(
            "  {marker}  {:<16} score {:.3}  ctr {:.2}%  spend {:.2}",
            s.creative_id,
            s.fatigue.score,
            s.metrics.ctr.value * 100.0,
            s.metrics.spend,
        );
        if let Some(note) = &s.fatigue.note {
            println!("            {note}");
        }
    }
    for sk in &report.skipped {
        println!("  skipped   {:<16} {}", sk.creative_id, sk.reason);
    }
    if !report.actions.is_empty() {
        println!();
        println!("proposed actions:");
        for a in &report.actions {
            println!(
                "  {:?} {} -> {:?}  ({})",
                a.action.action_type, a.action.creative_id, a.verdict.status, a.action.rationale
            );
            for reason in &a.verdict.reasons {
                println!("      {reason}");
            }
        }
    }
}
