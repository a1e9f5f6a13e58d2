pub mod config;
pub mod errors;
pub mod oracle;
pub mod pipeline;

pub use config::{load_config, BlockedFeedback, FailMode, OracleConfig, PolicyConfig, WardenConfig};
pub use errors::{WardenError, WardenResult};
pub use oracle::{IntentOracle, OracleClient, OracleError, Verdict};
pub use pipeline::{ActionFilterStage, BlockedResult, Conversation, FilterReport, Role, ToolCall, Turn};

/// Installs the global tracing subscriber. Call once, early, from the host
/// process; honors `RUST_LOG`.
pub fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
