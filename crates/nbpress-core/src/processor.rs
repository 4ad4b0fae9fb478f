//! The processor contract.
//!
//! Processors are the units of work a [`Pipeline`](crate::Pipeline) applies
//! to a notebook. There are two variants:
//!
//! - [`CellProcessor`]: visited once per applicable cell, with optional
//!   `begin`/`end` hooks around each pass.
//! - [`RawProcessor`]: invoked once on the fully rendered document text.
//!
//! # Removing cells
//!
//! Returning `None` from [`CellProcessor::process_cell`] means "no change",
//! it never deletes the cell. To delete a cell, clear its source with
//! [`Cell::clear_source`]; the pipeline prunes it once the pass is over.
//! Neighbouring cells can also be removed or inserted directly through
//! [`CellContext::document_mut`].
//!
//! # Example
//!
//! ```
//! use nbpress_core::{CellContext, CellProcessor, Cell, Result};
//!
//! struct Shout;
//!
//! impl CellProcessor for Shout {
//!     fn directives(&self) -> &[&str] {
//!         &["shout"]
//!     }
//!
//!     fn process_cell(&mut self, ctx: &mut CellContext<'_>) -> Result<Option<Cell>> {
//!         if self.has_directives(ctx.cell()) {
//!             let loud = ctx.cell().text().to_uppercase();
//!             ctx.cell_mut().source = Some(loud);
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

use crate::error::Result;
use crate::notebook::{Cell, CellId, CellKind, Document};

/// Access to the cell currently being visited and the notebook around it.
pub struct CellContext<'a> {
    document: &'a mut Document,
    id: CellId,
    position: usize,
}

impl<'a> CellContext<'a> {
    /// Create a context for the cell at `position`.
    ///
    /// Returns `None` if there is no such cell.
    pub fn new(document: &'a mut Document, position: usize) -> Option<Self> {
        let id = document.get(position)?.id();
        Some(Self {
            document,
            id,
            position,
        })
    }

    fn locate(&mut self) -> usize {
        if self.document.get(self.position).map(Cell::id) != Some(self.id) {
            if let Some(position) = self.document.position(self.id) {
                self.position = position;
            }
        }
        self.position
    }

    /// Id of the visited cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Current position of the visited cell, tracking neighbouring edits.
    pub fn position(&mut self) -> usize {
        self.locate()
    }

    /// The visited cell.
    ///
    /// # Panics
    ///
    /// Panics if the visited cell itself was removed through
    /// [`CellContext::document_mut`]. Use [`CellContext::try_cell`] when
    /// that can happen.
    pub fn cell(&self) -> &Cell {
        self.try_cell().expect("visited cell removed from its document")
    }

    /// The visited cell, or `None` once it has been removed.
    pub fn try_cell(&self) -> Option<&Cell> {
        self.document.cell(self.id)
    }

    /// The visited cell, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the visited cell itself was removed through
    /// [`CellContext::document_mut`].
    pub fn cell_mut(&mut self) -> &mut Cell {
        self.try_cell_mut().expect("visited cell removed from its document")
    }

    pub fn try_cell_mut(&mut self) -> Option<&mut Cell> {
        let id = self.id;
        let position = self.locate();
        self.document
            .get_mut(position)
            .filter(|cell| cell.id() == id)
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    /// The whole notebook, for edits to cells other than the visited one.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }

    /// Kernel language of the notebook.
    pub fn language(&self) -> &str {
        self.document.language()
    }
}

/// A processor applied to every applicable cell of a notebook.
pub trait CellProcessor {
    /// Name used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Cell kinds the pipeline will visit. Defaults to code cells.
    fn cell_kinds(&self) -> &[CellKind] {
        &[CellKind::Code]
    }

    /// Directives this processor responds to.
    ///
    /// The pipeline does not filter on these; check them with
    /// [`CellProcessor::has_directives`].
    fn directives(&self) -> &[&str] {
        &[]
    }

    /// Whether `cell` carries any of [`CellProcessor::directives`].
    fn has_directives(&self, cell: &Cell) -> bool {
        self.directives()
            .iter()
            .any(|directive| cell.directives.contains(directive))
    }

    /// Called once before the cells are visited.
    fn begin(&mut self, _document: &mut Document) -> Result<()> {
        Ok(())
    }

    /// Visit one cell.
    ///
    /// Returning `Some(cell)` replaces the visited cell; `None` leaves it
    /// as the processor modified it in place.
    fn process_cell(&mut self, ctx: &mut CellContext<'_>) -> Result<Option<Cell>>;

    /// Called once after the cells are visited, before pruning.
    fn end(&mut self, _document: &mut Document) -> Result<()> {
        Ok(())
    }
}

/// A processor applied once to the rendered document text.
pub trait RawProcessor {
    /// Name used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Transform the rendered text.
    fn process(&mut self, content: String) -> Result<String>;
}

/// Either kind of processor, as configured in a pipeline.
pub enum ProcessorKind {
    Cell(Box<dyn CellProcessor>),
    Raw(Box<dyn RawProcessor>),
}

impl ProcessorKind {
    pub fn cell(processor: impl CellProcessor + 'static) -> Self {
        Self::Cell(Box::new(processor))
    }

    pub fn raw(processor: impl RawProcessor + 'static) -> Self {
        Self::Raw(Box::new(processor))
    }

    pub fn name(&self) -> &str {
        match self {
            ProcessorKind::Cell(processor) => processor.name(),
            ProcessorKind::Raw(processor) => processor.name(),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ProcessorKind::Raw(_))
    }
}

impl std::fmt::Debug for ProcessorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessorKind::Cell(_) => write!(f, "Cell({})", self.name()),
            ProcessorKind::Raw(_) => write!(f, "Raw({})", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl CellProcessor for Noop {
        fn directives(&self) -> &[&str] {
            &["process", "export"]
        }

        fn process_cell(&mut self, _ctx: &mut CellContext<'_>) -> Result<Option<Cell>> {
            Ok(None)
        }
    }

    struct Upper;

    impl RawProcessor for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn process(&mut self, content: String) -> Result<String> {
            Ok(content.to_uppercase())
        }
    }

    #[test]
    fn test_default_name_is_type_path() {
        assert!(Noop.name().ends_with("tests::Noop"));
        assert_eq!(ProcessorKind::raw(Upper).name(), "upper");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Noop.cell_kinds(), &[CellKind::Code]);
        assert!(!ProcessorKind::cell(Noop).is_raw());
        assert!(ProcessorKind::raw(Upper).is_raw());
    }

    #[test]
    fn test_has_directives() {
        let mut cell = Cell::code("#| export\nx = 1");
        assert!(!Noop.has_directives(&cell));

        cell.refresh_directives("python", true);
        assert!(Noop.has_directives(&cell));
        assert!(!Noop.has_directives(&Cell::code("x = 1")));
    }

    #[test]
    fn test_context_tracks_visited_cell() {
        let mut document = Document::new(vec![Cell::code("a"), Cell::code("b")]);
        let mut ctx = CellContext::new(&mut document, 1).unwrap();
        assert_eq!(ctx.cell().text(), "b");

        ctx.document_mut().insert(0, Cell::markdown("# intro"));
        assert_eq!(ctx.position(), 2);
        ctx.cell_mut().set_source("B");

        assert_eq!(document.cells()[2].text(), "B");
        assert!(CellContext::new(&mut document, 9).is_none());
    }

    #[test]
    fn test_try_cell_after_removal() {
        let mut document = Document::new(vec![Cell::code("a"), Cell::code("b")]);
        let mut ctx = CellContext::new(&mut document, 0).unwrap();
        assert_eq!(ctx.try_cell().map(Cell::text), Some("a"));

        let id = ctx.id();
        ctx.document_mut().remove(id);
        assert!(ctx.try_cell().is_none());
        assert!(ctx.try_cell_mut().is_none());
        assert_eq!(document.len(), 1);
    }
}
