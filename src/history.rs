use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("git lookup failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not inside a git repository", .path.display())]
    NotInRepository { path: PathBuf },

    #[error("no {revision} revision of {}: {message}", .path.display())]
    NoRevision {
        path: PathBuf,
        revision: String,
        message: String,
    },

    #[error("cannot address {} within its repository", .path.display())]
    InvalidPath { path: PathBuf },
}

/// Source of a file's previously committed contents.
pub trait History {
    fn previous_revision(&self, path: &Path) -> Result<String, HistoryError>;
}

/// Reads earlier file contents with `git show <revision>:<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHistory {
    pub revision: String,
}

impl Default for GitHistory {
    fn default() -> Self {
        Self {
            revision: "HEAD".to_string(),
        }
    }
}

impl GitHistory {
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
        }
    }

    fn repository_root(&self, path: &Path) -> Result<PathBuf, HistoryError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let output = git(dir, &["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            return Err(HistoryError::NotInRepository {
                path: path.to_path_buf(),
            });
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(root))
    }
}

impl History for GitHistory {
    fn previous_revision(&self, path: &Path) -> Result<String, HistoryError> {
        let path = path.canonicalize()?;
        let root = self.repository_root(&path)?;
        let root = root.canonicalize().unwrap_or(root);
        let relative = repository_path(&root, &path).ok_or_else(|| HistoryError::InvalidPath {
            path: path.clone(),
        })?;
        debug!(revision = %self.revision, path = %relative, "reading committed file");

        let spec = format!("{}:{relative}", self.revision);
        let output = git(&root, &["show", spec.as_str()])?;
        if !output.status.success() {
            return Err(HistoryError::NoRevision {
                path,
                revision: self.revision.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<Output, HistoryError> {
    Ok(Command::new("git").arg("-C").arg(dir).args(args).output()?)
}

/// `path` relative to `root`, joined with `/` as git expects.
fn repository_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    let parts = parts?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
