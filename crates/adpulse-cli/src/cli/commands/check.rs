use super::{exit_codes, load_config_or_exit, read_json};
use crate::cli::args::CheckArgs;
use adpulse_core::guardrail::{evaluate_action, ActionContext, GatedAction, VerdictStatus};
use adpulse_core::model::ProposedAction;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CheckEntry {
    action: ProposedAction,
    #[serde(default)]
    context: ActionContext,
}

pub fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let cfg = match load_config_or_exit(&args.config, args.strict) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let rules = if cfg.guardrails.is_empty() {
        adpulse_rules::default_rules()
    } else {
        adpulse_rules::rules_from_config(&cfg.guardrails)
    };

    let entries: Vec<CheckEntry> = read_json(&args.actions)?;
    let gated: Vec<GatedAction> = entries
        .into_iter()
        .map(|e| {
            let verdict = evaluate_action(&e.action, &e.context, &rules);
            GatedAction {
                action: e.action,
                verdict,
            }
        })
        .collect();

    let any_blocked = gated
        .iter()
        .any(|g| g.verdict.status == VerdictStatus::Blocked);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&gated)?),
        _ => {
            for g in &gated {
                println!(
                    "{:?} {} -> {:?}",
                    g.action.action_type, g.action.creative_id, g.verdict.status
                );
                for reason in &g.verdict.reasons {
                    println!("    {reason}");
                }
            }
        }
    }

    if any_blocked {
        Ok(exit_codes::BLOCKED)
    } else {
        Ok(exit_codes::OK)
    }
}
