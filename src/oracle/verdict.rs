use serde::{Deserialize, Serialize};

/// Tri-state outcome of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Deny,
    /// The oracle answered, but with neither canonical token.
    Uncertain,
}

/// Reduces the oracle's raw completion to a verdict.
///
/// The completion is untrusted free text: it may ramble, echo the action
/// payload, or contain both tokens. The scan is case-insensitive and ALLOW
/// takes priority when both appear, matching the upstream prompt contract.
pub fn parse_verdict(raw: &str) -> Verdict {
    let upper = raw.to_uppercase();
    if upper.contains("ALLOW") {
        Verdict::Allow
    } else if upper.contains("DENY") {
        Verdict::Deny
    } else {
        Verdict::Uncertain
    }
}
