use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{BlockedFeedback, FailMode, PolicyConfig};
use crate::errors::{WardenError, WardenResult};
use crate::oracle::{IntentOracle, Verdict};
use crate::pipeline::types::{BlockedResult, Conversation, Role, ToolCall};

/// Outcome of one filtering pass. Blocked results are individually
/// addressable by the denied call's id regardless of the feedback mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterReport {
    pub admitted: usize,
    pub blocked: Vec<BlockedResult>,
}

/// Pipeline element that gates a turn's proposed tool calls behind per-call
/// authorization before the executor sees them.
pub struct ActionFilterStage {
    oracle: Arc<dyn IntentOracle>,
    policy: PolicyConfig,
}

impl ActionFilterStage {
    pub fn new(oracle: Arc<dyn IntentOracle>, policy: PolicyConfig) -> Self {
        Self { oracle, policy }
    }

    /// Classifies every proposed call in the latest turn against
    /// `user_intent`, rewrites the turn to the admitted subset, and returns
    /// one [`BlockedResult`] per denied call.
    ///
    /// Ineligible latest turns (wrong role, no calls) pass through untouched.
    /// Calls are judged sequentially, in list order, each in isolation; the
    /// rewrite preserves relative order on both sides of the partition.
    pub async fn filter(
        &self,
        user_intent: &str,
        conversation: &mut Conversation,
    ) -> WardenResult<FilterReport> {
        let Some(last) = conversation.last() else {
            return Ok(FilterReport::default());
        };
        if last.role != Role::Assistant || last.tool_calls.is_empty() {
            return Ok(FilterReport::default());
        }

        if user_intent.trim().is_empty() {
            return Err(WardenError::Contract(
                "user intent must be a non-empty string".into(),
            ));
        }
        let mut seen = HashSet::new();
        for call in &last.tool_calls {
            if !seen.insert(call.id.as_str()) {
                return Err(WardenError::Contract(format!(
                    "duplicate tool call id `{}` in turn",
                    call.id
                )));
            }
        }

        let proposed = last.tool_calls.clone();
        let total = proposed.len();
        let mut admitted: Vec<ToolCall> = Vec::with_capacity(total);
        let mut blocked: Vec<BlockedResult> = Vec::new();

        for call in proposed {
            if self.judge(user_intent, &call).await {
                admitted.push(call);
            } else {
                tracing::warn!(id = %call.id, tool = %call.name, "tool call denied");
                blocked.push(BlockedResult::from_call(&call));
            }
        }

        tracing::info!(
            total,
            admitted = admitted.len(),
            blocked = blocked.len(),
            "turn filtered"
        );

        let admitted_count = admitted.len();
        // An all-denied turn keeps an empty list: downstream must see
        // "no actions to execute", not "actions pending".
        conversation.replace_latest_tool_calls(admitted);

        if self.policy.blocked_feedback == BlockedFeedback::Inject {
            for result in &blocked {
                conversation.push(result.clone().into_turn());
            }
        }

        Ok(FilterReport {
            admitted: admitted_count,
            blocked,
        })
    }

    /// Reduces one call's verdict to admit/deny. Ambiguity and oracle
    /// failures both fall back to the configured fail mode.
    async fn judge(&self, user_intent: &str, call: &ToolCall) -> bool {
        let action = call.describe();
        match self.oracle.classify(user_intent, &action).await {
            Ok(Verdict::Allow) => true,
            Ok(Verdict::Deny) => false,
            Ok(Verdict::Uncertain) => {
                tracing::warn!(id = %call.id, tool = %call.name, "ambiguous verdict, applying fail mode");
                self.fail_default()
            }
            Err(e) => {
                tracing::warn!(id = %call.id, tool = %call.name, error = %e, "oracle failure, applying fail mode");
                self.fail_default()
            }
        }
    }

    fn fail_default(&self) -> bool {
        self.policy.fail_mode == FailMode::Open
    }
}
