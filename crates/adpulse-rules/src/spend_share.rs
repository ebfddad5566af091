use adpulse_core::guardrail::{ActionContext, GuardrailRule, RuleDecision};
use adpulse_core::model::ProposedAction;

/// Any action against a creative carrying more than the configured share of
/// ad-set spend goes to a human first; automated changes to the biggest
/// spender are where mistakes cost the most.
pub struct SpendShareReviewRule {
    max_share: f64,
}

impl SpendShareReviewRule {
    pub fn new(max_share: f64) -> Self {
        Self { max_share }
    }
}

impl GuardrailRule for SpendShareReviewRule {
    fn name(&self) -> &'static str {
        "spend_share_review"
    }

    fn evaluate(
        &self,
        _action: &ProposedAction,
        ctx: &ActionContext,
    ) -> anyhow::Result<RuleDecision> {
        match ctx.spend_share {
            Some(share) if share > self.max_share => Ok(RuleDecision::NeedsReview(format!(
                "creative carries {:.0}% of ad-set spend (review threshold {:.0}%)",
                share * 100.0,
                self.max_share * 100.0
            ))),
            _ => Ok(RuleDecision::Approve),
        }
    }
}
