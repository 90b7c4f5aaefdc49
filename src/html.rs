const MERMAID_ESM: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

/// Standalone page that renders `diagram` in a browser with mermaid.js.
pub fn render_page(diagram: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mermaid Visual Diff</title>
</head>
<body style="background-color: white;">
    <pre class="mermaid">
{body}
    </pre>
    <script type="module">
        import mermaid from '{MERMAID_ESM}';
        mermaid.initialize({{ startOnLoad: true }});
    </script>
</body>
</html>
"#,
        body = escape(diagram)
    )
}

// mermaid reads the element's text content, so entities are decoded before parsing.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
