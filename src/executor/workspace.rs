use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use log::warn;
use tempfile::TempDir;
use uuid::Uuid;

use crate::types::ExecutionError;

/// Ephemeral working area for a single execution. Every request gets its
/// own uuid-keyed directory under the system temp dir, so concurrent
/// executions can never see each other's staged files.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> Result<Self, ExecutionError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("crucible-{}-", Uuid::new_v4()))
            .tempdir()
            .map_err(ExecutionError::StagingError)?;
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn stage(&self, name: &str, contents: &str) -> Result<PathBuf, ExecutionError> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).map_err(ExecutionError::StagingError)?;
        Ok(path)
    }

    /// Removes the working area and everything staged or built inside it.
    /// Removal errors are logged and never mask the execution result.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove working area {:?}: {}", path, e);
        }
    }
}
