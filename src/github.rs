//! Publishing a paper directory to GitHub through the `git` and `gh` CLIs.

use crate::error::{Nb2PaperError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

const GIT_HINT: &str = "Install git: https://git-scm.com/downloads";
const GH_HINT: &str = "GitHub CLI (gh) not found. Install: brew install gh";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    pub repository: String,
    pub branch: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCreated {
    pub repository: String,
    pub url: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCreated {
    pub repository: String,
    pub version: String,
    pub url: String,
}

/// Commit everything in `dir` and push it to `repo` (`owner/name`).
///
/// A directory without `.git` is initialised and given an `origin` remote
/// pointing at `https://github.com/<repo>.git` first.
pub async fn push_to_github(
    dir: &Path,
    repo: &str,
    message: &str,
    branch: &str,
) -> Result<PushResult> {
    if !dir.is_dir() {
        return Err(Nb2PaperError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    if !dir.join(".git").exists() {
        tracing::info!(path = %dir.display(), "initialising git repo");
        run_git(dir, &["init"]).await?;
        let remote = format!("https://github.com/{repo}.git");
        run_git(dir, &["remote", "add", "origin", remote.as_str()]).await?;
    }

    run_git(dir, &["add", "."]).await?;
    run_git(dir, &["commit", "-m", message]).await?;
    run_git(dir, &["push", "-u", "origin", branch]).await?;
    tracing::info!(repo, branch, "pushed to GitHub");

    Ok(PushResult {
        repository: repo.to_string(),
        branch: branch.to_string(),
        message: message.to_string(),
    })
}

/// Create a GitHub repository with `gh repo create`.
pub async fn create_github_repo(name: &str, description: &str, private: bool) -> Result<RepoCreated> {
    let visibility = if private { "--private" } else { "--public" };
    let output = run_gh(
        None,
        &["repo", "create", name, visibility, "--description", description],
    )
    .await?;

    Ok(RepoCreated {
        repository: name.to_string(),
        url: format!("https://github.com/{name}"),
        output,
    })
}

/// Tag and publish a release with `gh release create`.
///
/// `dir` selects the checkout `gh` runs in; `None` uses the current
/// directory.
pub async fn create_release(
    repo: &str,
    version: &str,
    notes: &str,
    dir: Option<&Path>,
) -> Result<ReleaseCreated> {
    let output = run_gh(
        dir,
        &["release", "create", version, "--title", version, "--notes", notes],
    )
    .await?;

    Ok(ReleaseCreated {
        repository: repo.to_string(),
        version: version.to_string(),
        url: output.trim().to_string(),
    })
}

async fn run_git(repo_path: &Path, args: &[&str]) -> Result<String> {
    run_tool("git", GIT_HINT, Some(repo_path), args).await
}

async fn run_gh(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    run_tool("gh", GH_HINT, dir, args).await
}

/// Run `tool` with `args`, returning its stdout.
async fn run_tool(tool: &str, hint: &str, dir: Option<&Path>, args: &[&str]) -> Result<String> {
    tracing::debug!(tool, args = ?args, "running");
    let mut cmd = Command::new(tool);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Nb2PaperError::ToolNotFound {
                tool: tool.to_string(),
                hint: hint.to_string(),
            }
        } else {
            Nb2PaperError::ToolFailed {
                tool: tool.to_string(),
                message: format!("failed to spawn: {e}"),
                stderr: String::new(),
            }
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(Nb2PaperError::ToolFailed {
            tool: tool.to_string(),
            message: format!("`{} {}` exited with {}", tool, args.join(" "), output.status),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
