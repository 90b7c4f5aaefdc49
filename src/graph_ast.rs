use indexmap::IndexMap;

/// Header used when a diagram has no `graph`/`flowchart` declaration.
pub const DEFAULT_HEADER: &str = "graph TD";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedGraph {
    /// Last `graph`/`flowchart` declaration seen, if any.
    pub header: Option<String>,
    pub nodes: IndexMap<String, NodeRecord>,
    /// Keyed by `"<from>-><to>"`; a repeated pair replaces the earlier edge in place.
    pub edges: IndexMap<String, EdgeRecord>,
    pub other_lines: Vec<String>,
}

impl ParsedGraph {
    pub fn header_line(&self) -> &str {
        self.header.as_deref().unwrap_or(DEFAULT_HEADER)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub connector: Connector,
    pub original_text: String,
}

impl EdgeRecord {
    pub fn key(from: &str, to: &str) -> String {
        format!("{from}->{to}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Arrow,
    Line,
    DottedArrow,
    ThickArrow,
}

impl Connector {
    /// Detection order. The first token contained in a line decides its connector.
    pub const PRECEDENCE: [Connector; 4] = [
        Connector::Arrow,
        Connector::Line,
        Connector::DottedArrow,
        Connector::ThickArrow,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Connector::Arrow => "-->",
            Connector::Line => "---",
            Connector::DottedArrow => "-.->",
            Connector::ThickArrow => "==>",
        }
    }

    pub fn find_in(line: &str) -> Option<Connector> {
        Self::PRECEDENCE
            .into_iter()
            .find(|c| line.contains(c.token()))
    }
}
