//! The processing pipeline.
//!
//! A [`Pipeline`] owns a [`Document`] and the processors configured for it.
//! Each cell processor makes one full pass over the notebook before the
//! next one starts:
//!
//! 1. `begin`
//! 2. `process_cell` for every cell that still has source and whose kind the
//!    processor accepts
//! 3. `end`
//! 4. prune cleared cells, then reindex
//!
//! Raw processors are skipped during the passes and run later on rendered
//! text through [`Pipeline::post_process`].

use crate::error::{Error, Result};
use crate::notebook::Document;
use crate::processor::{CellContext, CellProcessor, ProcessorKind};

/// Options controlling how a notebook is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Strip directive lines from code cells during extraction.
    pub remove_directives: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            remove_directives: true,
        }
    }
}

/// Runs processors over a single notebook.
#[derive(Debug)]
pub struct Pipeline {
    document: Document,
    processors: Vec<ProcessorKind>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with default options.
    ///
    /// Directives are extracted from every cell here, before any processor
    /// sees the notebook.
    pub fn new(document: Document, processors: Vec<ProcessorKind>) -> Self {
        Self::with_options(document, processors, PipelineOptions::default())
    }

    pub fn with_options(
        mut document: Document,
        processors: Vec<ProcessorKind>,
        options: PipelineOptions,
    ) -> Self {
        document.extract_directives(options.remove_directives);
        Self {
            document,
            processors,
            options,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn processors(&self) -> &[ProcessorKind] {
        &self.processors
    }

    /// Run every cell processor in order.
    ///
    /// The first failing cell aborts the run with
    /// [`Error::CellProcessing`].
    pub fn run(&mut self) -> Result<()> {
        let Self {
            document,
            processors,
            ..
        } = self;

        for processor in processors.iter_mut() {
            match processor {
                ProcessorKind::Cell(processor) => run_pass(document, processor.as_mut())?,
                ProcessorKind::Raw(processor) => {
                    tracing::debug!("Skipping raw processor {} during cell passes", processor.name());
                }
            }
        }
        Ok(())
    }

    /// Run every raw processor over rendered content, each receiving the
    /// previous one's output.
    pub fn post_process(&mut self, content: String) -> Result<String> {
        self.processors
            .iter_mut()
            .filter_map(|processor| match processor {
                ProcessorKind::Raw(processor) => Some(processor),
                ProcessorKind::Cell(_) => None,
            })
            .try_fold(content, |content, processor| {
                tracing::debug!("Running raw processor {}", processor.name());
                processor.process(content)
            })
    }

    /// Whether any raw processors are configured.
    pub fn has_raw_processors(&self) -> bool {
        self.processors.iter().any(ProcessorKind::is_raw)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// One full pass of a cell processor.
fn run_pass(document: &mut Document, processor: &mut dyn CellProcessor) -> Result<()> {
    let name = processor.name().to_string();
    tracing::debug!("Running processor {} over {} cells", name, document.len());

    processor.begin(document)?;

    for id in document.ids() {
        let Some(position) = document.position(id) else {
            continue;
        };
        let cell = &document.cells()[position];
        if !cell.has_source() || !processor.cell_kinds().contains(&cell.kind) {
            continue;
        }
        let index = cell.index();

        let Some(mut ctx) = CellContext::new(document, position) else {
            continue;
        };
        let replacement = processor
            .process_cell(&mut ctx)
            .map_err(|source| Error::CellProcessing {
                path: document.path.clone(),
                index,
                processor: name.clone(),
                source: Box::new(source),
            })?;

        if let Some(cell) = replacement {
            if document.replace(id, cell).is_none() {
                tracing::debug!(
                    "Processor {} removed cell {} and returned a replacement, dropping it",
                    name,
                    index
                );
            }
        }
    }

    processor.end(document)?;

    let pruned = document.prune();
    document.reindex();
    if pruned > 0 {
        tracing::debug!("Processor {} removed {} cells", name, pruned);
    }
    Ok(())
}
