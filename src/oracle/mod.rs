pub mod client;
pub mod prompt;
pub mod verdict;

use async_trait::async_trait;
use thiserror::Error;

pub use client::OracleClient;
pub use verdict::Verdict;

/// Failures of a single classification attempt. Recoverable: the filter stage
/// reduces them to admit/deny via the configured fail mode, never to a crash.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Unavailable(String),

    #[error("oracle returned malformed response: {0}")]
    MalformedResponse(String),
}

/// Decision service that judges one proposed action against the user's intent.
/// Implementations must be freely shareable across turns; `classify` keeps no
/// state between calls.
#[async_trait]
pub trait IntentOracle: Send + Sync {
    /// Classifies `action` (canonical `name(arguments)` rendering) against
    /// `user_intent`. Exactly one outbound request, no retries.
    async fn classify(&self, user_intent: &str, action: &str) -> Result<Verdict, OracleError>;
}
