//! Version-control synchronization for a collection directory.
//!
//! Persistence changes are pushed by delegating to an external `git`
//! process: stage-all, commit, push, run sequentially in the collection's
//! directory. The working directory is passed explicitly to each
//! invocation; the process-wide current directory is never touched, so the
//! operation is safe to call repeatedly or from multiple collections.
//!
//! Each step's exit status is checked and surfaced as
//! [`crate::Error::Sync`] naming the failing step.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Default commit message for [`push`].
pub const DEFAULT_COMMIT_MESSAGE: &str = "new annotations";

/// Default branch pushed to.
pub const DEFAULT_BRANCH: &str = "master";

/// Stage, commit and push the contents of `dir`.
///
/// Runs `git add .`, `git commit -m <message>` and
/// `git push origin <branch>` in `dir`. Fails on the first step whose exit
/// status is non-zero.
pub fn push(dir: &Path, message: &str, branch: &str) -> Result<()> {
    run_git(dir, "add", &["add", "."])?;
    run_git(dir, "commit", &["commit", "-m", message])?;
    run_git(dir, "push", &["push", "origin", branch])?;
    log::info!("pushed annotations from {}", dir.display());
    Ok(())
}

fn run_git(dir: &Path, step: &'static str, args: &[&str]) -> Result<()> {
    let status = Command::new("git").args(args).current_dir(dir).status()?;
    if !status.success() {
        return Err(Error::sync(step, dir, status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        // Either git is unavailable (IO error) or `git add` runs in a
        // non-repository and exits non-zero (Sync error). Both surface.
        let result = push(dir.path(), DEFAULT_COMMIT_MESSAGE, DEFAULT_BRANCH);
        assert!(result.is_err());
    }
}
