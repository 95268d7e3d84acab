//! Proposal screening against catalogued failures
//!
//! Screening runs before anything else in a cycle: a proposal that looks
//! like a known failure is blocked outright and returned to its author
//! with the matching pattern's root cause and preventive rule. It never
//! reaches the critic or a vote.

use super::pattern::{FailureCategory, FailurePattern};
use crate::decision::proposal::Proposal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One pattern that matched a screened proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    pub similarity: f64,
    pub root_cause: String,
    pub preventive_rule: String,
}

/// Result of screening a proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenVerdict {
    Clear,
    Blocked {
        matches: Vec<PatternMatch>,
        /// Highest similarity among the matches.
        confidence: f64,
    },
}

impl ScreenVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScreenVerdict::Blocked { .. })
    }
}

/// Append-only catalog of failure patterns with similarity screening.
///
/// # Example
///
/// ```
/// use boardroom_domain::{AgentRole, FailureLibrary, FailurePattern, Proposal};
///
/// let mut library = FailureLibrary::new(0.75);
/// library.record(FailurePattern::new(
///     "fp-001",
///     "social media scheduling tool with no market demand research",
///     "no demand validation before build",
///     "validate demand with a landing page first",
/// ));
///
/// let proposal = Proposal::new(
///     "p-1",
///     AgentRole::Ceo,
///     "Scheduling tool",
///     "a social media scheduling tool with no market demand research done",
/// );
/// assert!(library.screen(&proposal).is_blocked());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureLibrary {
    patterns: Vec<FailurePattern>,
    threshold: f64,
}

impl FailureLibrary {
    pub fn new(threshold: f64) -> Self {
        Self {
            patterns: Vec::new(),
            threshold,
        }
    }

    pub fn with_patterns(threshold: f64, patterns: Vec<FailurePattern>) -> Self {
        Self {
            patterns,
            threshold,
        }
    }

    /// Append a pattern. Existing entries are never edited or removed.
    pub fn record(&mut self, pattern: FailurePattern) {
        self.patterns.push(pattern);
    }

    /// Screen a proposal against every catalogued pattern.
    pub fn screen(&self, proposal: &Proposal) -> ScreenVerdict {
        let text = format!("{} {}", proposal.title, proposal.description);

        let mut matches: Vec<PatternMatch> = self
            .patterns
            .iter()
            .filter_map(|pattern| {
                let similarity = similarity(pattern, &text);
                (similarity >= self.threshold).then(|| PatternMatch {
                    pattern_id: pattern.id.clone(),
                    similarity,
                    root_cause: pattern.root_cause.clone(),
                    preventive_rule: pattern.preventive_rule.clone(),
                })
            })
            .collect();

        if matches.is_empty() {
            return ScreenVerdict::Clear;
        }

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        let confidence = matches[0].similarity;
        ScreenVerdict::Blocked {
            matches,
            confidence,
        }
    }

    pub fn patterns(&self) -> &[FailurePattern] {
        &self.patterns
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Similarity between a pattern and proposal text, in [0, 1].
///
/// Weighted blend: 0.4 for a failure-category match plus 0.6 times the
/// fraction of signature tokens present in the proposal text. Tokens
/// shorter than three characters are noise and ignored.
fn similarity(pattern: &FailurePattern, text: &str) -> f64 {
    let category_score = if FailureCategory::categorize(text) == pattern.category {
        0.4
    } else {
        0.0
    };

    let signature_tokens = tokenize(&pattern.signature);
    if signature_tokens.is_empty() {
        return category_score;
    }
    let text_tokens = tokenize(text);
    let hits = signature_tokens
        .iter()
        .filter(|token| text_tokens.contains(*token))
        .count();

    category_score + 0.6 * (hits as f64 / signature_tokens.len() as f64)
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 3)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::role::AgentRole;

    fn proposal(description: &str) -> Proposal {
        Proposal::new("p-1", AgentRole::Ceo, "Proposal", description)
    }

    fn pattern(signature: &str) -> FailurePattern {
        FailurePattern::new("fp-001", signature, "root cause", "preventive rule")
    }

    #[test]
    fn test_identical_signature_scores_full() {
        let library = FailureLibrary::with_patterns(
            0.75,
            vec![pattern("competitor crowded market with weak demand timing")],
        );
        let verdict =
            library.screen(&proposal("competitor crowded market with weak demand timing"));

        match verdict {
            ScreenVerdict::Blocked { confidence, .. } => {
                assert!((confidence - 1.0).abs() < 1e-9);
            }
            ScreenVerdict::Clear => panic!("expected block"),
        }
    }

    #[test]
    fn test_unrelated_proposal_clears() {
        let library = FailureLibrary::with_patterns(
            0.75,
            vec![pattern("budget overrun from unbounded consulting spend")],
        );
        assert_eq!(
            library.screen(&proposal("an internal wiki cleanup sprint")),
            ScreenVerdict::Clear
        );
    }

    #[test]
    fn test_block_carries_citation() {
        let library = FailureLibrary::with_patterns(
            0.75,
            vec![pattern("schedule slip from scope underestimate on rewrite")],
        );
        let verdict = library.screen(&proposal(
            "full rewrite, likely schedule slip given scope underestimate",
        ));

        match verdict {
            ScreenVerdict::Blocked { matches, .. } => {
                assert_eq!(matches[0].pattern_id, "fp-001");
                assert_eq!(matches[0].root_cause, "root cause");
                assert_eq!(matches[0].preventive_rule, "preventive rule");
            }
            ScreenVerdict::Clear => panic!("expected block"),
        }
    }

    #[test]
    fn test_threshold_is_respected() {
        // Category match alone contributes 0.4, below a 0.75 threshold.
        let library = FailureLibrary::with_patterns(
            0.75,
            vec![pattern("crash outage in payment bug handler")],
        );
        let verdict = library.screen(&proposal("a technical error in unrelated tooling"));
        assert_eq!(verdict, ScreenVerdict::Clear);
    }

    #[test]
    fn test_record_is_append_only() {
        let mut library = FailureLibrary::new(0.75);
        library.record(pattern("first"));
        library.record(FailurePattern::new("fp-002", "second", "cause", "rule"));

        assert_eq!(library.len(), 2);
        assert_eq!(library.patterns()[0].id, "fp-001");
        assert_eq!(library.patterns()[1].id, "fp-002");
    }

    #[test]
    fn test_best_match_first() {
        let library = FailureLibrary::with_patterns(
            0.3,
            vec![
                FailurePattern::new("fp-far", "schedule estimate", "c", "r"),
                FailurePattern::new(
                    "fp-near",
                    "schedule slip from scope underestimate",
                    "c",
                    "r",
                ),
            ],
        );
        let verdict = library.screen(&proposal("schedule slip from scope underestimate"));
        match verdict {
            ScreenVerdict::Blocked { matches, confidence } => {
                assert_eq!(matches[0].pattern_id, "fp-near");
                assert_eq!(confidence, matches[0].similarity);
            }
            ScreenVerdict::Clear => panic!("expected block"),
        }
    }
}
