use mmdiff::blocks::{extract_blocks, select_pair};
use mmdiff::{BlockSelector, DiffColors, Error, RenderOptions, diff_documents};
use pretty_assertions::assert_eq;

const OLD_DOC: &str = "\
# Design

```mermaid
graph TD
    A --> B
```

Second diagram:

```mermaid
flowchart LR
    X --> Y
```
";

const NEW_DOC: &str = "\
# Design

```mermaid
graph TD
    A --> B
    B --> C
```

Second diagram:

```mermaid
flowchart LR
    X --> Z
```
";

fn diff(old: &str, new: &str, selector: BlockSelector) -> mmdiff::Result<String> {
    diff_documents(
        old,
        new,
        selector,
        &DiffColors::default(),
        &RenderOptions::default(),
    )
}

// =============================================================================
// Extraction
// =============================================================================

#[test]
fn extract_blocks_positions() {
    let blocks = extract_blocks(NEW_DOC);
    let spans: Vec<(usize, usize, usize)> = blocks
        .iter()
        .map(|b| (b.index, b.start_line, b.end_line))
        .collect();
    assert_eq!(spans, vec![(0, 3, 7), (1, 11, 14)]);
    assert_eq!(blocks[0].source, "graph TD\n    A --> B\n    B --> C");
}

#[test]
fn extract_blocks_empty_document() {
    assert!(extract_blocks("").is_empty());
    assert!(extract_blocks("no fences here").is_empty());
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn select_first_block_by_default() {
    let (old, new) = select_pair(OLD_DOC, NEW_DOC, BlockSelector::First).unwrap();
    assert_eq!(old, "graph TD\n    A --> B");
    assert_eq!(new, "graph TD\n    A --> B\n    B --> C");
}

#[test]
fn select_by_index() {
    let (old, new) = select_pair(OLD_DOC, NEW_DOC, BlockSelector::Index(1)).unwrap();
    assert_eq!(old, "flowchart LR\n    X --> Y");
    assert_eq!(new, "flowchart LR\n    X --> Z");
}

#[test]
fn select_by_cursor_line() {
    let (_, new) = select_pair(OLD_DOC, NEW_DOC, BlockSelector::Line(12)).unwrap();
    assert_eq!(new, "flowchart LR\n    X --> Z");
}

#[test]
fn missing_side_is_empty_diagram() {
    let (old, new) = select_pair("# nothing yet", NEW_DOC, BlockSelector::First).unwrap();
    assert_eq!(old, "");
    assert!(new.starts_with("graph TD"));

    let (old, new) = select_pair(OLD_DOC, "# deleted", BlockSelector::Index(1)).unwrap();
    assert!(old.starts_with("flowchart LR"));
    assert_eq!(new, "");
}

#[test]
fn no_blocks_anywhere() {
    let err = select_pair("a", "b", BlockSelector::First).unwrap_err();
    assert!(matches!(err, Error::NoDiagramBlock));
    assert!(err.to_string().contains("no mermaid block"), "got: {err}");
}

// =============================================================================
// Document diff
// =============================================================================

#[test]
fn document_diff_first_block() {
    let output = diff(OLD_DOC, NEW_DOC, BlockSelector::First).unwrap();
    assert!(output.starts_with("graph TD\n"));
    assert!(output.lines().any(|l| l == "class C added"));
    assert!(!output.lines().any(|l| l.ends_with(" removed") && l.starts_with("class ")));
}

#[test]
fn document_diff_second_block() {
    let output = diff(OLD_DOC, NEW_DOC, BlockSelector::Index(1)).unwrap();
    assert!(output.starts_with("flowchart LR\n"));
    assert!(output.lines().any(|l| l == "X -.-> Y"));
    assert!(output.lines().any(|l| l == "class Z added"));
    assert!(output.lines().any(|l| l == "class Y removed"));
}

#[test]
fn document_diff_newly_added_diagram() {
    let output = diff("# empty", NEW_DOC, BlockSelector::First).unwrap();
    let added: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("class ") && l.ends_with(" added"))
        .collect();
    assert_eq!(added, vec!["class A added", "class B added", "class C added"]);
}

#[test]
fn document_diff_bad_line() {
    let err = diff(OLD_DOC, NEW_DOC, BlockSelector::Line(9)).unwrap_err();
    assert!(matches!(err, Error::NoBlockAtLine { line: 9 }), "got: {err}");
}

#[test]
fn empty_block_does_not_swallow_the_next() {
    let doc = "```mermaid\n```\n\nSome prose\n\n```mermaid\ngraph TD\nA --> B\n```\n";
    let blocks = extract_blocks(doc);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].source, "");
    assert_eq!(blocks[1].source, "graph TD\nA --> B");

    let (_, new) = select_pair("", doc, BlockSelector::Line(7)).unwrap();
    assert_eq!(new, "graph TD\nA --> B");
}
