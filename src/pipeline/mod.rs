pub mod stage;
pub mod types;

pub use stage::{ActionFilterStage, FilterReport};
pub use types::{BlockedResult, Conversation, Role, ToolCall, Turn};
