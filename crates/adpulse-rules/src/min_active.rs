use adpulse_core::guardrail::{ActionContext, GuardrailRule, RuleDecision};
use adpulse_core::model::{ActionKind, ProposedAction};

/// Never pause down to (or below) the configured number of active creatives
/// in the ad set; an ad set with nothing left to serve spends blind.
pub struct MinActiveCreativesRule {
    min_active: u32,
}

impl MinActiveCreativesRule {
    pub fn new(min_active: u32) -> Self {
        Self { min_active }
    }
}

impl GuardrailRule for MinActiveCreativesRule {
    fn name(&self) -> &'static str {
        "min_active_creatives"
    }

    fn evaluate(
        &self,
        action: &ProposedAction,
        ctx: &ActionContext,
    ) -> anyhow::Result<RuleDecision> {
        if action.action_type != ActionKind::Pause {
            return Ok(RuleDecision::Approve);
        }
        if ctx.active_in_adset <= self.min_active {
            return Ok(RuleDecision::Block(format!(
                "pausing would leave fewer than {} active creative(s) ({} currently active)",
                self.min_active, ctx.active_in_adset
            )));
        }
        Ok(RuleDecision::Approve)
    }
}
