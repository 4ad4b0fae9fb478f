//! In-memory notebook document model.
//!
//! A [`Document`] owns an ordered sequence of [`Cell`]s. Cell order is the
//! processing and serialization order; each cell's index caches its
//! position and is recomputed after every structural change.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::directive::{Directives, extract_directives};
use crate::error::{Error, Result};
use crate::language::DEFAULT_LANGUAGE;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identifier for a cell.
///
/// Unlike the index, the id survives insertions and removals of other cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    fn next() -> Self {
        Self(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell_{}", self.0)
    }
}

/// Kind of notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Executable source.
    Code,
    /// Markdown prose.
    Markdown,
    /// Raw text passed through untouched.
    Raw,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Code => "code",
            CellKind::Markdown => "markdown",
            CellKind::Raw => "raw",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "code" => Ok(CellKind::Code),
            "markdown" => Ok(CellKind::Markdown),
            "raw" => Ok(CellKind::Raw),
            other => Err(Error::UnexpectedCellType(other.to_string())),
        }
    }
}

/// A single notebook cell.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    index: usize,
    /// Cell kind.
    pub kind: CellKind,
    /// Cell text. `None` marks the cell for removal after the current pass.
    pub source: Option<String>,
    /// Directives found at the top of the cell.
    pub directives: Directives,
    /// Cell metadata, passed through untouched.
    pub metadata: Map<String, Value>,
    /// Remaining fields of the source format (outputs, execution count, ...).
    pub extra: Map<String, Value>,
}

impl Cell {
    /// Create a cell with no directives and empty metadata.
    pub fn new(kind: CellKind, source: impl Into<String>) -> Self {
        Self {
            id: CellId::next(),
            index: 0,
            kind,
            source: Some(source.into()),
            directives: Directives::new(),
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn code(source: impl Into<String>) -> Self {
        Self::new(CellKind::Code, source)
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new(CellKind::Markdown, source)
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::new(CellKind::Raw, source)
    }

    /// Attach metadata to a freshly created cell.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    /// Position of the cell as of the last reindex.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The source text, or `""` if the source has been cleared.
    pub fn text(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Replace the source text.
    ///
    /// Directives parsed from the previous text are discarded; call
    /// [`Cell::refresh_directives`] to parse the new text.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = Some(source.into());
        self.directives.clear();
    }

    /// Mark the cell for removal once the current processor finishes.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Re-run directive extraction on the current source.
    pub fn refresh_directives(&mut self, language: &str, remove_directives: bool) -> &Directives {
        self.directives = extract_directives(self, remove_directives, language);
        &self.directives
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.source == other.source
    }
}

impl Eq for Cell {}

/// A notebook: ordered cells plus notebook-level metadata.
#[derive(Debug, Clone)]
pub struct Document {
    cells: Vec<Cell>,
    /// Notebook metadata (kernel spec, language info, ...).
    pub metadata: Map<String, Value>,
    /// Major format version.
    pub nbformat: u32,
    /// Minor format version.
    pub nbformat_minor: u32,
    /// Remaining top-level fields of the source format.
    pub extra: Map<String, Value>,
    /// Where the notebook was loaded from, if anywhere.
    pub path: Option<PathBuf>,
}

impl Document {
    /// Create a notebook from cells, using format version 4.5.
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut document = Self {
            cells: Vec::with_capacity(cells.len()),
            metadata: Map::new(),
            nbformat: 4,
            nbformat_minor: 5,
            extra: Map::new(),
            path: None,
        };
        for cell in cells {
            document.push(cell);
        }
        document
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Kernel language from `metadata.kernelspec.language`.
    ///
    /// Defaults to [`DEFAULT_LANGUAGE`] when absent.
    pub fn language(&self) -> &str {
        self.metadata
            .get("kernelspec")
            .and_then(|spec| spec.get("language"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable access to the cells without changing their number or order.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a position.
    pub fn get(&self, position: usize) -> Option<&Cell> {
        self.cells.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Cell> {
        self.cells.get_mut(position)
    }

    /// Current position of a cell.
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.cells.iter().position(|cell| cell.id == id)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|cell| cell.id == id)
    }

    /// Ids of all cells in document order.
    pub fn ids(&self) -> Vec<CellId> {
        self.cells.iter().map(Cell::id).collect()
    }

    /// Append a cell, returning its id.
    pub fn push(&mut self, cell: Cell) -> CellId {
        let position = self.cells.len();
        self.insert(position, cell)
    }

    /// Insert a cell at `position` (clamped to the end), returning its id.
    ///
    /// A cell cloned from one already in the document gets a fresh id.
    pub fn insert(&mut self, position: usize, mut cell: Cell) -> CellId {
        if self.position(cell.id).is_some() {
            cell.id = CellId::next();
        }
        let id = cell.id;
        let position = position.min(self.cells.len());
        self.cells.insert(position, cell);
        self.reindex();
        id
    }

    /// Remove a cell by id.
    pub fn remove(&mut self, id: CellId) -> Option<Cell> {
        let position = self.position(id)?;
        let cell = self.cells.remove(position);
        self.reindex();
        Some(cell)
    }

    /// Replace the cell with `id`, keeping the id on the replacement.
    pub fn replace(&mut self, id: CellId, mut cell: Cell) -> Option<Cell> {
        let position = self.position(id)?;
        cell.id = id;
        cell.index = position;
        Some(std::mem::replace(&mut self.cells[position], cell))
    }

    /// Drop every cell whose source has been cleared.
    ///
    /// Returns the number of cells removed.
    pub fn prune(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(Cell::has_source);
        before - self.cells.len()
    }

    /// Reassign each cell's index to its position.
    pub fn reindex(&mut self) {
        for (position, cell) in self.cells.iter_mut().enumerate() {
            cell.index = position;
        }
    }

    /// Extract directives from every cell using the notebook's language.
    pub fn extract_directives(&mut self, remove_directives: bool) {
        let language = self.language().to_string();
        for cell in &mut self.cells {
            cell.refresh_directives(&language, remove_directives);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
