pub mod blocks;
pub mod config;
pub mod differ;
pub mod error;
pub mod graph_ast;
pub mod graph_parser;
pub mod history;
pub mod html;

use std::path::Path;

pub use blocks::BlockSelector;
pub use config::{Config, DiffColors};
pub use differ::{RenderOptions, diff_graphs, diff_graphs_with_colors, diff_graphs_with_options};
pub use error::{Error, Result};
pub use graph_parser::parse_graph;
pub use history::{GitHistory, History};

/// Diff the selected mermaid block of two versions of a document.
pub fn diff_documents(
    old_document: &str,
    new_document: &str,
    selector: BlockSelector,
    colors: &DiffColors,
    options: &RenderOptions,
) -> Result<String> {
    let (old, new) = blocks::select_pair(old_document, new_document, selector)?;
    Ok(diff_graphs_with_options(&old, &new, colors, options))
}

/// The selected block of a file's previous revision and of its current contents.
pub fn history_pair(
    history: &dyn History,
    path: &Path,
    selector: BlockSelector,
) -> Result<(String, String)> {
    let current = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let previous = history.previous_revision(path)?;
    blocks::select_pair(&previous, &current, selector)
}

/// Diff the selected mermaid block of a file against its previous revision.
pub fn diff_against_history(
    history: &dyn History,
    path: &Path,
    selector: BlockSelector,
    colors: &DiffColors,
    options: &RenderOptions,
) -> Result<String> {
    let (old, new) = history_pair(history, path, selector)?;
    Ok(diff_graphs_with_options(&old, &new, colors, options))
}
