use super::{exit_codes, load_config_or_exit, read_json};
use crate::cli::args::RankArgs;
use adpulse_core::model::{ConceptCandidate, ConceptSource};
use adpulse_core::ranker;

pub fn run(args: RankArgs) -> anyhow::Result<i32> {
    let cfg = match load_config_or_exit(&args.config, args.strict) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let candidates: Vec<ConceptCandidate> = read_json(&args.candidates)?;
    let shortlist = ranker::shortlist(&cfg.ranking, candidates);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&shortlist)?),
        _ => {
            for (i, c) in shortlist.iter().enumerate() {
                let source = match &c.source {
                    ConceptSource::New => "new".to_string(),
                    ConceptSource::Creative { creative_id } => format!("from {creative_id}"),
                };
                println!(
                    "{:>3}. {:<16} cluster {:<10} lift {:.3}  novelty {:>3} bits  ({source})",
                    i + 1,
                    c.concept_id,
                    c.cluster_id,
                    c.predicted_lift_proxy,
                    c.novelty_distance,
                );
            }
        }
    }
    Ok(exit_codes::OK)
}
