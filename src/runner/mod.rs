mod orchestrator;
mod retry;

pub use orchestrator::Pipeline;
pub use retry::{build_subtasks_with_retry, Decomposition};
