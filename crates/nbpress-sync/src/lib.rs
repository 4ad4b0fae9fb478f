//! Notebook IO for nbpress.
//!
//! Reads `.ipynb` files into [`Document`]s, runs them through a
//! [`Pipeline`], and writes the result either as a notebook or as Quarto
//! markdown.
//!
//! # Architecture
//!
//! ```text
//! notebook.ipynb ──► read_notebook ──► Pipeline::run ──┬──► notebook_to_string ──► out.ipynb
//!                                                      │
//!                                                      └──► render_qmd ──► post_process ──► out.qmd
//! ```

mod error;
mod ipynb;
mod qmd;

pub use error::{SyncError, SyncResult};
pub use ipynb::{
    CellSource, JupyterCell, JupyterNotebook, RESERVED_SUFFIX, notebook_to_string,
    notebook_to_value, parse_notebook, read_notebook, split_source, write_notebook,
};
pub use qmd::render_qmd;

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use nbpress_core::{Document, Pipeline, PipelineOptions, ProcessorKind};
use serde::Deserialize;

/// Format processed notebooks are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Jupyter notebook JSON.
    Ipynb,
    /// Quarto markdown; raw processors run on this output.
    #[default]
    Qmd,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Ipynb => "ipynb",
            OutputFormat::Qmd => "qmd",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ipynb" => Ok(OutputFormat::Ipynb),
            "qmd" => Ok(OutputFormat::Qmd),
            _ => Err(SyncError::UnknownFormat(s.to_string())),
        }
    }
}

/// How a notebook is processed and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub pipeline: PipelineOptions,
    pub format: OutputFormat,
}

/// Process an in-memory document and render it in `options.format`.
pub fn process_document(
    document: Document,
    processors: Vec<ProcessorKind>,
    options: &ProcessOptions,
) -> SyncResult<String> {
    let mut pipeline = Pipeline::with_options(document, processors, options.pipeline);
    pipeline.run()?;

    match options.format {
        OutputFormat::Ipynb => {
            if pipeline.has_raw_processors() {
                tracing::warn!("Raw processors only run on qmd output, skipping them");
            }
            notebook_to_string(pipeline.document())
        }
        OutputFormat::Qmd => {
            let rendered = render_qmd(pipeline.document());
            Ok(pipeline.post_process(rendered)?)
        }
    }
}

/// Read, process and render the notebook at `path`.
pub fn process_notebook(
    path: impl AsRef<Path>,
    processors: Vec<ProcessorKind>,
    options: &ProcessOptions,
) -> SyncResult<String> {
    let document = read_notebook(path)?;
    process_document(document, processors, options)
}

/// Process the notebook at `input` and write the result to `output`,
/// creating parent directories as needed.
pub fn process_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    processors: Vec<ProcessorKind>,
    options: &ProcessOptions,
) -> SyncResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let rendered = process_notebook(input, processors, options)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, rendered).map_err(|e| SyncError::WriteError {
        path: output.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!("Processed {} → {}", input.display(), output.display());
    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Where the processed form of `notebook` is written.
///
/// The notebook's path relative to `documentation_source` is recreated under
/// `output_folder`, with the extension of `format`. A notebook outside the
/// documentation source keeps only its file name.
pub fn output_path(
    notebook: impl AsRef<Path>,
    documentation_source: impl AsRef<Path>,
    output_folder: impl AsRef<Path>,
    format: OutputFormat,
) -> PathBuf {
    let notebook = normalize(notebook.as_ref());
    let source = normalize(documentation_source.as_ref());

    let relative = match notebook.strip_prefix(&source) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            tracing::warn!(
                "{} is not inside the documentation source {}, using its file name",
                notebook.display(),
                source.display()
            );
            notebook
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| notebook.clone())
        }
    };

    output_folder
        .as_ref()
        .join(relative)
        .with_extension(format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format() {
        assert_eq!("qmd".parse::<OutputFormat>().unwrap(), OutputFormat::Qmd);
        assert_eq!("IPYNB".parse::<OutputFormat>().unwrap(), OutputFormat::Ipynb);
        assert!("html".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Qmd);
    }

    #[test]
    fn test_output_path_mirrors_source_tree() {
        assert_eq!(
            output_path("nbs/guide/intro.ipynb", "nbs", "processed", OutputFormat::Qmd),
            PathBuf::from("processed/guide/intro.qmd")
        );
        assert_eq!(
            output_path("./nbs/index.ipynb", "nbs", "out", OutputFormat::Ipynb),
            PathBuf::from("out/index.ipynb")
        );
    }

    #[test]
    fn test_output_path_outside_source() {
        assert_eq!(
            output_path("elsewhere/notes.ipynb", "nbs", "processed", OutputFormat::Qmd),
            PathBuf::from("processed/notes.qmd")
        );
    }
}
