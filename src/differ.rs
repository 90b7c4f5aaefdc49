//! Merging two flowcharts into one annotated flowchart.
//!
//! Nodes are matched by id, edges by `"<from>-><to>"`. The merged output keeps
//! every node of both versions and tags it with one of the `added`, `removed`
//! or `unchanged` style classes. Removed edges come back as dotted arrows.

use std::fmt;

use tracing::debug;

use crate::config::DiffColors;
use crate::graph_ast::{DEFAULT_HEADER, ParsedGraph};
use crate::graph_parser::parse_graph;

const UNCHANGED_CLASS_DEF: &str = "classDef unchanged fill:#f6f8fa,stroke:#d0d7de,stroke-width:1px;";
const REMOVED_EDGE_CONNECTOR: &str = "-.->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffStatus {
    /// Only in the new diagram.
    Added,
    /// Only in the old diagram.
    Removed,
    /// Present in both, matched by id.
    Unchanged,
}

impl DiffStatus {
    pub fn class_name(self) -> &'static str {
        match self {
            DiffStatus::Added => "added",
            DiffStatus::Removed => "removed",
            DiffStatus::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub id: String,
    pub status: DiffStatus,
    /// Source text of the node, from the new diagram when it exists there.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub status: DiffStatus,
    /// Source line of the edge, from the new diagram when it exists there.
    pub text: String,
}

impl DiffEdge {
    /// The line this edge contributes to the merged diagram.
    ///
    /// Removed edges lose their label and connector style.
    pub fn output_line(&self) -> String {
        match self.status {
            DiffStatus::Removed => format!("{} {REMOVED_EDGE_CONNECTOR} {}", self.from, self.to),
            DiffStatus::Added | DiffStatus::Unchanged => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffSummary {
    pub added_nodes: usize,
    pub removed_nodes: usize,
    pub unchanged_nodes: usize,
    pub added_edges: usize,
    pub removed_edges: usize,
    pub unchanged_edges: usize,
}

impl DiffSummary {
    pub fn has_changes(&self) -> bool {
        self.added_nodes > 0
            || self.removed_nodes > 0
            || self.added_edges > 0
            || self.removed_edges > 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: +{} -{} ={}, edges: +{} -{} ={}",
            self.added_nodes,
            self.removed_nodes,
            self.unchanged_nodes,
            self.added_edges,
            self.removed_edges,
            self.unchanged_edges
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Emit the new diagram's passthrough lines (directives, unparsed edges).
    pub keep_directives: bool,
}

/// Classification of two parsed diagrams.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDiff {
    pub header: String,
    /// New-diagram nodes in source order, then removed nodes in old source order.
    pub nodes: Vec<DiffNode>,
    /// New-diagram edges in source order, then removed edges in old source order.
    pub edges: Vec<DiffEdge>,
    /// Passthrough lines of the new diagram.
    pub other_lines: Vec<String>,
}

pub fn diff_parsed(old: &ParsedGraph, new: &ParsedGraph) -> GraphDiff {
    let header = new
        .header
        .as_deref()
        .or(old.header.as_deref())
        .unwrap_or(DEFAULT_HEADER)
        .to_string();

    let mut nodes: Vec<DiffNode> = new
        .nodes
        .values()
        .map(|node| DiffNode {
            id: node.id.clone(),
            status: if old.nodes.contains_key(&node.id) {
                DiffStatus::Unchanged
            } else {
                DiffStatus::Added
            },
            text: node.original_text.clone(),
        })
        .collect();
    nodes.extend(
        old.nodes
            .values()
            .filter(|node| !new.nodes.contains_key(&node.id))
            .map(|node| DiffNode {
                id: node.id.clone(),
                status: DiffStatus::Removed,
                text: node.original_text.clone(),
            }),
    );

    let mut edges: Vec<DiffEdge> = new
        .edges
        .values()
        .map(|edge| DiffEdge {
            id: edge.id.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            status: if old.edges.contains_key(&edge.id) {
                DiffStatus::Unchanged
            } else {
                DiffStatus::Added
            },
            text: edge.original_text.clone(),
        })
        .collect();
    edges.extend(
        old.edges
            .values()
            .filter(|edge| !new.edges.contains_key(&edge.id))
            .map(|edge| DiffEdge {
                id: edge.id.clone(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                status: DiffStatus::Removed,
                text: edge.original_text.clone(),
            }),
    );

    let diff = GraphDiff {
        header,
        nodes,
        edges,
        other_lines: new.other_lines.clone(),
    };
    debug!(summary = %diff.summary(), "classified graph diff");
    diff
}

impl GraphDiff {
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for node in &self.nodes {
            match node.status {
                DiffStatus::Added => summary.added_nodes += 1,
                DiffStatus::Removed => summary.removed_nodes += 1,
                DiffStatus::Unchanged => summary.unchanged_nodes += 1,
            }
        }
        for edge in &self.edges {
            match edge.status {
                DiffStatus::Added => summary.added_edges += 1,
                DiffStatus::Removed => summary.removed_edges += 1,
                DiffStatus::Unchanged => summary.unchanged_edges += 1,
            }
        }
        summary
    }

    pub fn node_ids(&self, status: DiffStatus) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(move |n| n.status == status)
            .map(|n| n.id.as_str())
    }

    /// Serialize the merged diagram.
    pub fn render(&self, colors: &DiffColors, options: &RenderOptions) -> String {
        let mut lines: Vec<String> = vec![self.header.clone()];
        lines.extend(class_defs(colors));
        lines.extend(self.nodes.iter().map(|n| n.text.clone()));
        lines.extend(self.edges.iter().map(DiffEdge::output_line));
        if options.keep_directives {
            lines.extend(self.other_lines.iter().cloned());
        }
        for status in [DiffStatus::Added, DiffStatus::Removed, DiffStatus::Unchanged] {
            lines.extend(
                self.node_ids(status)
                    .map(|id| format!("class {id} {}", status.class_name())),
            );
        }
        lines.join("\n")
    }
}

fn class_defs(colors: &DiffColors) -> [String; 3] {
    [
        format!(
            "classDef added fill:{},stroke:{},stroke-width:2px;",
            colors.added_fill, colors.added_stroke
        ),
        format!(
            "classDef removed fill:{},stroke:{},stroke-width:2px,stroke-dasharray: 5 5;",
            colors.removed_fill, colors.removed_stroke
        ),
        UNCHANGED_CLASS_DEF.to_string(),
    ]
}

/// Diff two flowchart texts with the default palette.
pub fn diff_graphs(old: &str, new: &str) -> String {
    diff_graphs_with_colors(old, new, &DiffColors::default())
}

pub fn diff_graphs_with_colors(old: &str, new: &str, colors: &DiffColors) -> String {
    diff_graphs_with_options(old, new, colors, &RenderOptions::default())
}

pub fn diff_graphs_with_options(
    old: &str,
    new: &str,
    colors: &DiffColors,
    options: &RenderOptions,
) -> String {
    let old = parse_graph(old);
    let new = parse_graph(new);
    diff_parsed(&old, &new).render(colors, options)
}
