//! A minimal processor showing how the API works.
//!
//! Adds a comment to the top of every code cell carrying `#| process`:
//!
//! ```text
//! #| process
//! def my_function():
//!     return "Hello world!"
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::notebook::Cell;
use crate::processor::{CellContext, CellProcessor};

const DEFAULT_COMMENT: &str = "# This code has been processed!";

/// Arguments accepted under `processor_args.BasicProcessor`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasicProcessorArgs {
    /// Line prepended to processed cells.
    pub comment: String,
}

impl Default for BasicProcessorArgs {
    fn default() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

/// Prepends a comment line to cells with the `process` directive.
#[derive(Debug, Clone, Default)]
pub struct BasicProcessor {
    args: BasicProcessorArgs,
}

impl BasicProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(args: BasicProcessorArgs) -> Self {
        Self { args }
    }
}

impl CellProcessor for BasicProcessor {
    fn name(&self) -> &str {
        "nbpress.processors.BasicProcessor"
    }

    fn directives(&self) -> &[&str] {
        &["process"]
    }

    fn process_cell(&mut self, ctx: &mut CellContext<'_>) -> Result<Option<Cell>> {
        if self.has_directives(ctx.cell()) {
            let cell = ctx.cell_mut();
            let source = format!("{}\n{}", self.args.comment, cell.text());
            cell.source = Some(source);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Document;

    #[test]
    fn test_processes_only_directive_cells() {
        let mut document = Document::new(vec![
            Cell::code("#| process\nx = 1"),
            Cell::code("y = 2"),
        ]);
        document.extract_directives(true);

        let mut processor = BasicProcessor::new();
        for position in 0..document.len() {
            let mut ctx = CellContext::new(&mut document, position).unwrap();
            assert!(processor.process_cell(&mut ctx).unwrap().is_none());
        }

        assert_eq!(document.cells()[0].text(), "# This code has been processed!\nx = 1");
        assert_eq!(document.cells()[1].text(), "y = 2");
    }

    #[test]
    fn test_custom_comment() {
        let mut document = Document::new(vec![Cell::code("#| process\nx = 1")]);
        document.extract_directives(true);

        let mut processor = BasicProcessor::with_args(BasicProcessorArgs {
            comment: "# touched".to_string(),
        });
        let mut ctx = CellContext::new(&mut document, 0).unwrap();
        processor.process_cell(&mut ctx).unwrap();

        assert_eq!(document.cells()[0].text(), "# touched\nx = 1");
    }
}
