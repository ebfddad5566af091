use adpulse_core::guardrail::{ActionContext, GuardrailRule, RuleDecision};
use adpulse_core::model::{ActionKind, ProposedAction};
use regex::Regex;

const DEFAULT_TERMS: &[&str] = &[
    "cure",
    "guarantee",
    "clickbait",
    "shockingly",
    "you won't believe",
];

/// Blocks copy changes whose proposed text contains a disallowed term.
/// Terms match case-insensitively as substrings; patterns are regexes.
pub struct BlockedTermsRule {
    terms: Vec<String>,
    patterns: Vec<Regex>,
}

impl BlockedTermsRule {
    pub fn new(terms: Vec<String>, patterns: &[String]) -> anyhow::Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| anyhow::anyhow!("invalid pattern {p:?}: {e}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            terms: terms.into_iter().map(|t| t.to_lowercase()).collect(),
            patterns: compiled,
        })
    }

    pub fn with_default_terms() -> Self {
        Self {
            terms: DEFAULT_TERMS.iter().map(|t| t.to_string()).collect(),
            patterns: Vec::new(),
        }
    }
}

impl GuardrailRule for BlockedTermsRule {
    fn name(&self) -> &'static str {
        "blocked_terms"
    }

    fn evaluate(
        &self,
        action: &ProposedAction,
        _ctx: &ActionContext,
    ) -> anyhow::Result<RuleDecision> {
        if action.action_type != ActionKind::UpdateCopy {
            return Ok(RuleDecision::Approve);
        }
        let Some(copy) = action.proposed_copy.as_deref() else {
            // Copy not drafted yet: nothing to screen, a human sees it later.
            return Ok(RuleDecision::Approve);
        };
        let lower = copy.to_lowercase();
        for term in &self.terms {
            if lower.contains(term) {
                return Ok(RuleDecision::Block(format!("disallowed term {term:?}")));
            }
        }
        for pattern in &self.patterns {
            if pattern.is_match(copy) {
                return Ok(RuleDecision::Block(format!(
                    "matched disallowed pattern {:?}",
                    pattern.as_str()
                )));
            }
        }
        Ok(RuleDecision::Approve)
    }
}
