use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("`{cmd}` timed out after {secs}s")]
    Timeout { cmd: String, secs: u64 },
    #[error("failed to execute `{cmd}`: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{cmd}` exited with {status}: {stderr}")]
    Failed {
        cmd: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("non-UTF8 output from `{0}`")]
    NonUtf8(String),
}

/// Run a command with arguments and a timeout, returning trimmed stdout.
///
/// Stdout can carry secrets (keychain passwords), so it is never logged.
pub async fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> Result<String, ProcessError> {
    tracing::debug!("running `{}` with {} args", cmd, args.len());
    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new(cmd)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| ProcessError::Timeout {
        cmd: cmd.to_string(),
        secs: timeout.as_secs(),
    })?
    .map_err(|source| ProcessError::Spawn {
        cmd: cmd.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ProcessError::Failed {
            cmd: cmd.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8(output.stdout).map_err(|_| ProcessError::NonUtf8(cmd.to_string()))?;
    Ok(stdout.trim().to_string())
}

/// Check if a binary exists in PATH. Returns the full path if found.
pub fn which(binary: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|p| p.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn which_returns_none_for_nonexistent() {
        assert!(which("cud_missing_secret_helper_xyz").is_none());
    }

    #[tokio::test]
    async fn run_command_trims_stdout() {
        let result = run_command("printf", &["  hunter2\\n"], Duration::from_secs(5)).await;
        assert_eq!(result.unwrap(), "hunter2");
    }

    #[tokio::test]
    async fn non_zero_exit_is_failed() {
        let err = run_command("false", &[], Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, ProcessError::Failed { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = run_command("cud_missing_secret_helper_xyz", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
