use adpulse_core::guardrail::{ActionContext, GuardrailRule, RuleDecision};
use adpulse_core::model::ProposedAction;

/// Stand-in for a rule whose configuration failed to compile. Always
/// requests review, carrying the original error, so a typo in a rule config
/// surfaces on every action instead of silently waving actions through.
pub struct PoisonedRule {
    name: &'static str,
    error: String,
}

impl PoisonedRule {
    pub fn new(name: &'static str, error: String) -> Self {
        Self { name, error }
    }
}

impl GuardrailRule for PoisonedRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn evaluate(
        &self,
        _action: &ProposedAction,
        _ctx: &ActionContext,
    ) -> anyhow::Result<RuleDecision> {
        Ok(RuleDecision::NeedsReview(format!(
            "rule configuration invalid: {}",
            self.error
        )))
    }
}
