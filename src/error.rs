use crate::config::ConfigError;
use crate::history::HistoryError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the document-level layer. Parsing and diffing never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no mermaid block found in either version")]
    NoDiagramBlock,

    #[error("no mermaid block encloses line {line}")]
    NoBlockAtLine { line: usize },

    #[error("mermaid block index {index} out of range ({count} blocks)")]
    BlockIndexOutOfRange { index: usize, count: usize },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
