use crate::model::ProposedAction;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ad-set facts a rule may consult. Built by the caller per action; the
/// rules themselves stay pure functions over (action, context).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    /// Creatives currently serving in the same ad set.
    pub active_in_adset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDecision {
    Approve,
    NeedsReview(String),
    Block(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Approved,
    NeedsReview,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// `rule_name: reason` entries, sorted, so the verdict is independent of
    /// rule-set ordering.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn approved() -> Self {
        Verdict {
            status: VerdictStatus::Approved,
            reasons: Vec::new(),
        }
    }
}

/// The action together with its annotated verdict; the action itself is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatedAction {
    pub action: ProposedAction,
    pub verdict: Verdict,
}

/// A single policy check. Rules must be independent of each other and of
/// evaluation order; extending the rule set must never change the outcome
/// of unrelated actions.
pub trait GuardrailRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, action: &ProposedAction, ctx: &ActionContext)
        -> anyhow::Result<RuleDecision>;
}

/// Evaluates every rule and folds the decisions: any block wins, otherwise
/// any review request wins, otherwise approved.
///
/// A rule that fails to evaluate contributes `needs_review` for that rule
/// only; a broken rule must never silently pass an action.
pub fn evaluate_action(
    action: &ProposedAction,
    ctx: &ActionContext,
    rules: &[Arc<dyn GuardrailRule>],
) -> Verdict {
    let mut status = VerdictStatus::Approved;
    let mut reasons = Vec::new();

    for rule in rules {
        let decision = match rule.evaluate(action, ctx) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(rule = rule.name(), error = %e, "guardrail rule failed; defaulting to needs_review");
                RuleDecision::NeedsReview(format!("rule evaluation failed: {e}"))
            }
        };
        match decision {
            RuleDecision::Approve => {}
            RuleDecision::NeedsReview(reason) => {
                if status == VerdictStatus::Approved {
                    status = VerdictStatus::NeedsReview;
                }
                reasons.push(format!("{}: {}", rule.name(), reason));
            }
            RuleDecision::Block(reason) => {
                status = VerdictStatus::Blocked;
                reasons.push(format!("{}: {}", rule.name(), reason));
            }
        }
    }

    reasons.sort();
    Verdict { status, reasons }
}

/// Annotates a batch of actions. Contexts are produced per action by the
/// caller; the gate never mutates the actions.
pub fn gate_actions(
    actions: Vec<ProposedAction>,
    rules: &[Arc<dyn GuardrailRule>],
    mut ctx_for: impl FnMut(&ProposedAction) -> ActionContext,
) -> Vec<GatedAction> {
    actions
        .into_iter()
        .map(|action| {
            let ctx = ctx_for(&action);
            let verdict = evaluate_action(&action, &ctx, rules);
            GatedAction { action, verdict }
        })
        .collect()
}
