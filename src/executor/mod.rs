mod languages;
mod local_executor;
mod workspace;

pub use languages::Language;
pub use local_executor::LocalExecutor;
pub use workspace::Workspace;

use std::time::Duration;

use crate::types::{
    ExecutionError,
    ExecutionPayload,
    ExecutionResult,
};

/// Boundary between the request pipeline and whatever actually runs the
/// untrusted code. `LocalExecutor` spawns host processes directly; a
/// container- or jail-backed implementation plugs in behind this trait.
#[async_trait::async_trait]
pub trait CodeExecutor {
    async fn execute(
        payload: &ExecutionPayload,
        deadline: Duration,
    ) -> Result<ExecutionResult, ExecutionError>;
}
