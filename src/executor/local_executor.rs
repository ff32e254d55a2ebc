use std::path::Path;
use std::process::{
    Output,
    Stdio,
};
use std::time::Duration;

use log::debug;
use tokio::process::Command;
use tokio::time::{
    timeout_at,
    Instant,
};

use crate::executor::{
    CodeExecutor,
    Language,
    Workspace,
};
use crate::types::{
    ExecutionError,
    ExecutionPayload,
    ExecutionResult,
};

const INPUT_FILE: &str = "input.txt";

/// Runs submissions as child processes on the host. Each execution gets a
/// private working area, a scrubbed environment and its own process group,
/// and is killed as a whole when the deadline fires.
pub struct LocalExecutor;

#[async_trait::async_trait]
impl CodeExecutor for LocalExecutor {
    async fn execute(
        payload: &ExecutionPayload,
        deadline: Duration,
    ) -> Result<ExecutionResult, ExecutionError> {
        if payload.language.is_empty() || payload.code.is_empty() {
            return Err(ExecutionError::InvalidRequest);
        }
        let language =
            Language::from_tag(&payload.language).ok_or(ExecutionError::UnsupportedLanguage)?;

        let workspace = Workspace::create()?;
        let result = run_in_workspace(&workspace, language, payload, deadline).await;
        workspace.cleanup();
        result
    }
}

async fn run_in_workspace(
    workspace: &Workspace,
    language: Language,
    payload: &ExecutionPayload,
    deadline: Duration,
) -> Result<ExecutionResult, ExecutionError> {
    // Compile and run draw down the same budget.
    let deadline = Instant::now() + deadline;

    let stdin_path = match &payload.input {
        Some(input) => Some(workspace.stage(INPUT_FILE, input)?),
        None => None,
    };
    if let Some(name) = language.source_file() {
        workspace.stage(name, &payload.code)?;
    }

    if let Some(compile) = language.compile_command() {
        let compiled = run_phase(compile, workspace, None, deadline).await?;
        if !compiled.status.success() {
            return Err(ExecutionError::CompileFailed(
                String::from_utf8_lossy(&compiled.stderr).to_string(),
            ));
        }
    }

    let ran = run_phase(
        language.run_command(&payload.code),
        workspace,
        stdin_path.as_deref(),
        deadline,
    )
    .await?;
    if !ran.status.success() {
        return Err(ExecutionError::RuntimeFailed(
            String::from_utf8_lossy(&ran.stderr).to_string(),
        ));
    }

    Ok(ExecutionResult {
        output: String::from_utf8_lossy(&ran.stdout).to_string(),
    })
}

/// Runs one phase of the pipeline inside the working area, in its own
/// process group so the deadline can take down the whole tree, compiler
/// children included.
async fn run_phase(
    mut cmd: Command,
    workspace: &Workspace,
    stdin_path: Option<&Path>,
    deadline: Instant,
) -> Result<Output, ExecutionError> {
    let stdin = match stdin_path {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(ExecutionError::StagingError)?;
            Stdio::from(file)
        }
        None => Stdio::null(),
    };

    // PATH is the only variable the child gets to see.
    let path_env = std::env::var("PATH")
        .unwrap_or_else(|_| "/usr/local/bin:/usr/bin:/bin".to_string());

    cmd.current_dir(workspace.path())
        .env_clear()
        .env("PATH", &path_env)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd
        .spawn()
        .map_err(|e| ExecutionError::RuntimeFailed(e.to_string()))?;
    let pid = child.id();

    match timeout_at(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ExecutionError::RuntimeFailed(e.to_string())),
        Err(_) => {
            // The direct child is already gone (kill_on_drop); sweep
            // whatever it spawned.
            kill_process_group(pid);
            Err(ExecutionError::Timeout)
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{
        killpg,
        Signal,
    };
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!("Process group {} already gone: {}", pid, e);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
