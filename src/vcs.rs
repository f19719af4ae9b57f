use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Optional branch integration. Nothing else depends on it succeeding.
#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn checkout(&self, branch: &str) -> Result<()>;
    async fn create_branch(&self, branch: &str, checkout: bool) -> Result<()>;
}

/// The `git` binary, run in the repository that contains the working directory.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// `None` when `dir` is not inside a git work tree or git is missing.
    pub async fn discover(dir: &Path) -> Option<Self> {
        match run_git(dir, &["rev-parse", "--show-toplevel"]).await {
            Ok(root) => Some(Self {
                root: PathBuf::from(root.trim()),
            }),
            Err(e) => {
                tracing::debug!(error = %e, dir = %dir.display(), "no git repository");
                None
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn checkout(&self, branch: &str) -> Result<()> {
        check_branch_name(branch)?;
        run_git(&self.root, &["checkout", branch]).await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str, checkout: bool) -> Result<()> {
        check_branch_name(branch)?;
        if checkout {
            run_git(&self.root, &["checkout", "-b", branch]).await?;
        } else {
            run_git(&self.root, &["branch", branch]).await?;
        }
        Ok(())
    }
}

/// Branch names reach git as positional arguments and must not parse as options.
fn check_branch_name(branch: &str) -> Result<()> {
    if branch.starts_with('-') {
        anyhow::bail!("Invalid branch name '{branch}': must not start with '-'");
    }
    Ok(())
}

async fn run_git(cwd: &Path, args: &[&str]) -> Result<String> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
