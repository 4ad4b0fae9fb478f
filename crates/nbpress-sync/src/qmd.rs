//! Quarto markdown (.qmd) rendering.

use nbpress_core::{CellKind, Document};

/// Render a document as Quarto markdown.
///
/// Markdown and raw cells are emitted as they are, code cells become
/// ```` ```{language} ```` fences using the notebook's language. Cells are
/// separated by one blank line; cells without source are left out.
pub fn render_qmd(document: &Document) -> String {
    let language = document.language();

    let blocks: Vec<String> = document
        .cells()
        .iter()
        .filter(|cell| cell.has_source())
        .map(|cell| {
            let text = cell.text().trim_end_matches(['\r', '\n']);
            match cell.kind {
                CellKind::Markdown | CellKind::Raw => text.to_string(),
                CellKind::Code => format!("```{{{language}}}\n{text}\n```"),
            }
        })
        .collect();

    if blocks.is_empty() {
        return String::new();
    }
    let mut rendered = blocks.join("\n\n");
    rendered.push('\n');
    rendered
}
