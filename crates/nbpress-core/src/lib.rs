//! Core engine for nbpress notebook processing.
//!
//! This crate provides:
//! - Language-aware directive grammar (`#| name: args`)
//! - Cell partitioning and directive extraction
//! - The in-memory notebook document model
//! - The processor contract and processor registry
//! - The pipeline engine that drives processors over a notebook
//!
//! # Architecture
//!
//! ```text
//! Document ──► extract directives ──► Pipeline ──► [CellProcessor]* ──► prune + reindex
//!                                         │
//!                                         ▼
//!                               rendered markup ──► [RawProcessor]* ──► output
//! ```

pub mod directive;
pub mod error;
pub mod language;
pub mod notebook;
pub mod pipeline;
pub mod processor;
pub mod processors;
pub mod registry;

pub use directive::{Directives, DirectiveGrammar, extract_directives, partition_cell};
pub use error::{Error, Result};
pub use language::{CommentMarker, DEFAULT_LANGUAGE, comment_marker};
pub use notebook::{Cell, CellId, CellKind, Document};
pub use pipeline::{Pipeline, PipelineOptions};
pub use processor::{CellContext, CellProcessor, ProcessorKind, RawProcessor};
pub use registry::{ProcessorArgs, ProcessorReference, ProcessorRegistry};
