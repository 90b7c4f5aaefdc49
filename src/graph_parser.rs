use tracing::{debug, trace};
use winnow::prelude::*;
use winnow::combinator::alt;
use winnow::token::take_while;

use crate::graph_ast::*;

const COMMENT_MARKER: &str = "%%";
const BYTE_ORDER_MARK: char = '\u{FEFF}';
const DIRECTIVE_PREFIXES: [&str; 3] = ["classDef", "class ", "style "];

/// Parse flowchart text into nodes, edges and passthrough lines.
///
/// Never fails: lines that cannot be read as a header, node or edge end up in
/// `other_lines`.
pub fn parse_graph(input: &str) -> ParsedGraph {
    let mut graph = ParsedGraph::default();

    for raw in input.lines() {
        let line = raw.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK);
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        if is_header(line) {
            graph.header = Some(line.to_string());
            continue;
        }
        match Connector::find_in(line) {
            Some(connector) => collect_edge(&mut graph, line, connector),
            None => collect_node(&mut graph, line),
        }
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        other_lines = graph.other_lines.len(),
        "parsed graph"
    );
    graph
}

fn collect_edge(graph: &mut ParsedGraph, line: &str, connector: Connector) {
    let Some((from_part, to_part)) = line.split_once(connector.token()) else {
        graph.other_lines.push(line.to_string());
        return;
    };
    let from_part = from_part.trim();
    let to_part = to_part.trim();

    let (Some(from), Some(to)) = (leading_identifier(from_part), leading_identifier(to_part))
    else {
        trace!(line, "edge line without endpoint identifiers");
        graph.other_lines.push(line.to_string());
        return;
    };

    add_node(graph, from, from_part);
    add_node(graph, to, to_part);

    let id = EdgeRecord::key(from, to);
    graph.edges.insert(
        id.clone(),
        EdgeRecord {
            id,
            from: from.to_string(),
            to: to.to_string(),
            connector,
            original_text: line.to_string(),
        },
    );
}

fn collect_node(graph: &mut ParsedGraph, line: &str) {
    match leading_identifier(line) {
        Some(id) if !is_directive(line) => add_node(graph, id, line),
        _ => {
            trace!(line, "passthrough line");
            graph.other_lines.push(line.to_string());
        }
    }
}

fn add_node(graph: &mut ParsedGraph, id: &str, text: &str) {
    if !graph.nodes.contains_key(id) {
        graph.nodes.insert(
            id.to_string(),
            NodeRecord {
                id: id.to_string(),
                original_text: text.to_string(),
            },
        );
    }
}

fn is_directive(line: &str) -> bool {
    DIRECTIVE_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn is_header(line: &str) -> bool {
    let mut input = line;
    header(&mut input).is_ok()
}

fn leading_identifier(text: &str) -> Option<&str> {
    let mut input = text;
    identifier.parse_next(&mut input).ok()
}

fn header(input: &mut &str) -> winnow::Result<()> {
    alt(("graph", "flowchart")).parse_next(input)?;
    take_while(1.., char::is_whitespace).void().parse_next(input)?;
    direction.void().parse_next(input)
}

fn direction<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_ascii_uppercase()).parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node_text<'a>(graph: &'a ParsedGraph, id: &str) -> &'a str {
        &graph.nodes[id].original_text
    }

    #[test]
    fn parse_identifier_stops_at_shape() {
        let mut input = "A_1[Start]";
        assert_eq!(identifier(&mut input).unwrap(), "A_1");
        assert_eq!(input, "[Start]");
    }

    #[test]
    fn parse_identifier_rejects_punctuation() {
        assert_eq!(leading_identifier("|yes| B"), None);
        assert_eq!(leading_identifier(""), None);
    }

    #[test]
    fn header_requires_uppercase_direction() {
        assert!(is_header("graph TD"));
        assert!(is_header("flowchart LR"));
        assert!(is_header("graph\tBT"));
        assert!(is_header("flowchart\u{00A0}LR"));
        assert!(!is_header("graph td"));
        assert!(!is_header("graphTD"));
        assert!(!is_header("sequenceDiagram"));
    }

    #[test]
    fn parse_empty_input() {
        let graph = parse_graph("   \n\n  ");
        assert_eq!(graph, ParsedGraph::default());
        assert_eq!(graph.header_line(), DEFAULT_HEADER);
    }

    #[test]
    fn parse_simple_edge() {
        let graph = parse_graph("graph TD\n    A[Start] --> B[End]\n");
        assert_eq!(graph.header.as_deref(), Some("graph TD"));
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(node_text(&graph, "A"), "A[Start]");
        assert_eq!(node_text(&graph, "B"), "B[End]");
        let edge = &graph.edges["A->B"];
        assert_eq!(edge.from, "A");
        assert_eq!(edge.to, "B");
        assert_eq!(edge.connector, Connector::Arrow);
        assert_eq!(edge.original_text, "A[Start] --> B[End]");
    }

    #[test]
    fn parse_all_connectors() {
        let graph = parse_graph("A --> B\nB --- C\nC -.-> D\nD ==> E\n");
        let connectors: Vec<Connector> = graph.edges.values().map(|e| e.connector).collect();
        assert_eq!(
            connectors,
            vec![
                Connector::Arrow,
                Connector::Line,
                Connector::DottedArrow,
                Connector::ThickArrow
            ]
        );
    }

    #[test]
    fn non_breaking_space_header() {
        let graph = parse_graph("graph\u{00A0}LR\nA --> B\n");
        assert_eq!(graph.header_line(), "graph\u{00A0}LR");
        let ids: Vec<&str> = graph.nodes.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let graph = parse_graph("\u{FEFF}flowchart LR\nA --> B\n");
        assert_eq!(graph.header.as_deref(), Some("flowchart LR"));
        assert!(graph.other_lines.is_empty());
    }

    #[test]
    fn last_header_wins() {
        let graph = parse_graph("graph TD\nA --> B\nflowchart LR\n");
        assert_eq!(graph.header_line(), "flowchart LR");
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let graph = parse_graph("%% a comment\n\ngraph TD\n  %% A --> B\n");
        assert!(graph.is_empty());
        assert!(graph.other_lines.is_empty());
    }

    #[test]
    fn first_node_text_wins() {
        let graph = parse_graph("A --> B\nA[Declared later]\nB(Round)\n");
        assert_eq!(node_text(&graph, "A"), "A");
        assert_eq!(node_text(&graph, "B"), "B");
    }

    #[test]
    fn declaration_before_edge_keeps_label() {
        let graph = parse_graph("A[Start]\nA --> B\n");
        assert_eq!(node_text(&graph, "A"), "A[Start]");
    }

    #[test]
    fn duplicate_edge_pair_replaces_earlier() {
        let graph = parse_graph("A --> B\nB --> C\nA ==> B\n");
        assert_eq!(graph.edges.len(), 2);
        let keys: Vec<&str> = graph.edges.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A->B", "B->C"]);
        assert_eq!(graph.edges["A->B"].original_text, "A ==> B");
        assert_eq!(graph.edges["A->B"].connector, Connector::ThickArrow);
    }

    #[test]
    fn reversed_pair_is_a_distinct_edge() {
        let graph = parse_graph("A --> B\nB --> A\n");
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn edge_without_identifiers_becomes_other_line() {
        let graph = parse_graph("--> B\nA -->\n");
        assert!(graph.is_empty());
        assert_eq!(graph.other_lines, vec!["--> B", "A -->"]);
    }

    #[test]
    fn pipe_labelled_edge_becomes_other_line() {
        let graph = parse_graph("A -->|yes| B\n");
        assert!(graph.edges.is_empty());
        assert_eq!(graph.other_lines, vec!["A -->|yes| B"]);
    }

    #[test]
    fn chained_edge_splits_at_first_connector() {
        let graph = parse_graph("A --> B --> C\n");
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges["A->B"].original_text, "A --> B --> C");
        assert_eq!(node_text(&graph, "B"), "B --> C");
        assert!(!graph.nodes.contains_key("C"));
    }

    #[test]
    fn directives_are_passthrough() {
        let graph = parse_graph(
            "classDef hot fill:#f00\nclass A hot\nstyle A fill:#fff\nsubgraph one\n",
        );
        assert_eq!(
            graph.other_lines,
            vec!["classDef hot fill:#f00", "class A hot", "style A fill:#fff"]
        );
        // `subgraph` has no special handling and reads as a node id.
        assert!(graph.nodes.contains_key("subgraph"));
    }

    #[test]
    fn lines_are_trimmed() {
        let graph = parse_graph("    A[Hello World]   \n");
        assert_eq!(node_text(&graph, "A"), "A[Hello World]");
    }

    #[test]
    fn insertion_order_is_first_seen() {
        let graph = parse_graph("C\nA --> B\nD --> C\n");
        let ids: Vec<&str> = graph.nodes.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["C", "A", "B", "D"]);
    }
}
