//! Git command runner.
//!
//! Provides a wrapper around git commands with captured stdout/stderr and
//! structured error handling. Used to read commit ids of local work trees and
//! remote repositories.

use crate::error::{DetectError, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(DetectError::GitError)` - On non-zero exit code or if git cannot be started
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    debug!(cwd = %cwd.display(), ?args, "Running git");

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            DetectError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(DetectError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Returns true if `path` is inside a git work tree.
pub fn is_repository<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.is_dir() {
        return false;
    }

    matches!(
        run_git(path, &["rev-parse", "--is-inside-work-tree"]),
        Ok(output) if output.stdout == "true"
    )
}

/// Commit id of `HEAD` in the work tree at `path`.
pub fn head_commit<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(run_git(path, &["rev-parse", "HEAD"])?.stdout)
}

/// Commit id of `HEAD` in the remote repository at `url`, via `git ls-remote`.
pub fn remote_head_commit(url: &str) -> Result<String> {
    let output = run_git(std::env::temp_dir(), &["ls-remote", url, "HEAD"])?;

    output
        .stdout
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| DetectError::GitError(format!("{} has no HEAD", url)))
}
