//! Splitting cells into directives and code.

use crate::directive::Directives;
use crate::directive::grammar::{DirectiveGrammar, is_cell_magic};
use crate::notebook::{Cell, CellKind};

/// First characters of shell and magic escapes, e.g. `!pip install` or `%%time`.
const ESCAPES: [char; 2] = ['!', '%'];

/// Split source into its leading directive block and the code after it.
///
/// The block ends at the first line that is not blank, not a directive and
/// not a cell magic. Lines keep their terminators, so the two halves
/// concatenate back to `source`.
pub fn partition_source<'a>(
    source: &'a str,
    grammar: &DirectiveGrammar,
) -> (Vec<&'a str>, Vec<&'a str>) {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let boundary = lines
        .iter()
        .position(|line| {
            !line.trim().is_empty() && !grammar.is_directive_line(line) && !is_cell_magic(line)
        })
        .unwrap_or(lines.len());

    let code = lines[boundary..].to_vec();
    let mut directives = lines;
    directives.truncate(boundary);
    (directives, code)
}

/// Split a cell into directive lines and code lines for `language`.
pub fn partition_cell<'a>(cell: &'a Cell, language: &str) -> (Vec<&'a str>, Vec<&'a str>) {
    match cell.source.as_deref() {
        Some(source) if !source.is_empty() => {
            partition_source(source, DirectiveGrammar::for_language(language))
        }
        _ => (Vec::new(), Vec::new()),
    }
}

/// Parse the directives at the top of a code cell.
///
/// With `remove_directives`, the cell's source is rewritten to keep only the
/// `name:` option lines (normalized) and cell magics from its directive
/// block, followed by the untouched code. Other directive lines and blank
/// lines in the block are dropped.
///
/// Only code cells whose source does not start with a shell or magic escape
/// are considered; any other cell yields no directives and is left as is.
pub fn extract_directives(cell: &mut Cell, remove_directives: bool, language: &str) -> Directives {
    if cell.kind != CellKind::Code || cell.text().trim().starts_with(ESCAPES) {
        return Directives::new();
    }

    let grammar = DirectiveGrammar::for_language(language);
    let (directives, rewritten) = {
        let (block, code) = partition_cell(cell, language);
        if block.is_empty() {
            return Directives::new();
        }

        let directives: Directives = block
            .iter()
            .filter_map(|line| grammar.parse_line(line))
            .collect();

        let rewritten = remove_directives.then(|| {
            let mut source = String::new();
            for line in &block {
                if grammar.is_option_line(line) {
                    source.push_str(&grammar.normalize(line));
                } else if is_cell_magic(line) {
                    source.push_str(line);
                }
            }
            source.extend(code);
            source
        });

        (directives, rewritten)
    };

    if let Some(source) = rewritten {
        cell.source = Some(source);
    }
    directives
}
