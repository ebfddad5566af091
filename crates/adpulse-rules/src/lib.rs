use std::sync::Arc;

use adpulse_core::config::GuardrailRuleConfig;
use adpulse_core::guardrail::GuardrailRule;

mod blocked_terms;
mod min_active;
mod poisoned;
mod spend_share;

pub use blocked_terms::BlockedTermsRule;
pub use min_active::MinActiveCreativesRule;
pub use spend_share::SpendShareReviewRule;

/// The rule set used when no guardrails are configured.
pub fn default_rules() -> Vec<Arc<dyn GuardrailRule>> {
    vec![
        Arc::new(MinActiveCreativesRule::new(1)),
        Arc::new(BlockedTermsRule::with_default_terms()),
        Arc::new(SpendShareReviewRule::new(0.5)),
    ]
}

/// Builds the rule set from config.
///
/// A rule whose config cannot be compiled (a malformed regex, say) is
/// replaced by a poisoned rule that always requests review: a broken rule is
/// fatal for that rule only and must never silently pass actions.
pub fn rules_from_config(configs: &[GuardrailRuleConfig]) -> Vec<Arc<dyn GuardrailRule>> {
    configs
        .iter()
        .map(|cfg| match cfg {
            GuardrailRuleConfig::MinActiveCreatives { min_active } => {
                Arc::new(MinActiveCreativesRule::new(*min_active)) as Arc<dyn GuardrailRule>
            }
            GuardrailRuleConfig::BlockedTerms { terms, patterns } => {
                match BlockedTermsRule::new(terms.clone(), patterns) {
                    Ok(rule) => Arc::new(rule) as Arc<dyn GuardrailRule>,
                    Err(e) => {
                        tracing::warn!(error = %e, "blocked_terms rule failed to compile");
                        Arc::new(poisoned::PoisonedRule::new("blocked_terms", e.to_string()))
                    }
                }
            }
            GuardrailRuleConfig::SpendShareReview { max_share } => {
                Arc::new(SpendShareReviewRule::new(*max_share))
            }
        })
        .collect()
}
