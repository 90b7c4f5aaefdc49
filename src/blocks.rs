use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

fn mermaid_fence_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```mermaid[ \t]*\r?\n(.*?)```").expect("valid regex"))
}

/// A fenced ```` ```mermaid ```` block found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramBlock {
    pub index: usize,
    /// 1-based line of the opening fence.
    pub start_line: usize,
    /// 1-based line of the closing fence.
    pub end_line: usize,
    pub source: String,
}

impl DiagramBlock {
    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSelector {
    #[default]
    First,
    Index(usize),
    /// The block whose fences enclose this 1-based line.
    Line(usize),
}

pub fn extract_blocks(document: &str) -> Vec<DiagramBlock> {
    let blocks: Vec<DiagramBlock> = mermaid_fence_regex()
        .captures_iter(document)
        .enumerate()
        .filter_map(|(index, caps)| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some(DiagramBlock {
                index,
                start_line: line_at(document, whole.start()),
                end_line: line_at(document, whole.end()),
                source: body.as_str().trim().to_string(),
            })
        })
        .collect();
    debug!(count = blocks.len(), "extracted mermaid blocks");
    blocks
}

fn line_at(document: &str, offset: usize) -> usize {
    document[..offset].matches('\n').count() + 1
}

fn resolve(blocks: &[DiagramBlock], selector: BlockSelector) -> Result<usize> {
    match selector {
        BlockSelector::First => Ok(0),
        BlockSelector::Index(index) if index < blocks.len() => Ok(index),
        BlockSelector::Index(index) => Err(Error::BlockIndexOutOfRange {
            index,
            count: blocks.len(),
        }),
        BlockSelector::Line(line) => blocks
            .iter()
            .position(|b| b.contains_line(line))
            .ok_or(Error::NoBlockAtLine { line }),
    }
}

/// Pick the diagram text to compare from each version of a document.
///
/// The selector is resolved against the new document, or the old one when the
/// new document has no blocks. A side without a block at that index
/// contributes an empty diagram.
pub fn select_pair(
    old_document: &str,
    new_document: &str,
    selector: BlockSelector,
) -> Result<(String, String)> {
    let old_blocks = extract_blocks(old_document);
    let new_blocks = extract_blocks(new_document);
    if old_blocks.is_empty() && new_blocks.is_empty() {
        return Err(Error::NoDiagramBlock);
    }

    let reference = if new_blocks.is_empty() {
        &old_blocks
    } else {
        &new_blocks
    };
    let index = resolve(reference, selector)?;
    let source_at = |blocks: &[DiagramBlock]| {
        blocks
            .get(index)
            .map(|b| b.source.clone())
            .unwrap_or_default()
    };
    Ok((source_at(&old_blocks), source_at(&new_blocks)))
}
