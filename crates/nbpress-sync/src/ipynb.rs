//! Jupyter notebook (.ipynb) reading and writing.
//!
//! Notebooks are read into a [`Document`], keeping every field nbpress does
//! not interpret so that writing the document back loses nothing. Written
//! notebooks use the layout Jupyter itself produces: sorted keys, one-space
//! indentation, unescaped non-ASCII text and `source` as a list of lines.

use std::fs;
use std::path::Path;

use nbpress_core::{Cell, CellKind, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SyncError, SyncResult};

/// Keys ending with this suffix are internal and never written out.
pub const RESERVED_SUFFIX: char = '_';

/// A Jupyter notebook as found on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct JupyterNotebook {
    /// Notebook cells
    #[serde(default)]
    pub cells: Vec<JupyterCell>,

    /// Notebook metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Format version
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    /// Minor format version
    #[serde(default)]
    pub nbformat_minor: u32,

    /// Any other top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Jupyter cell.
#[derive(Debug, Clone, Deserialize)]
pub struct JupyterCell {
    /// Cell type
    pub cell_type: String,

    /// Cell metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Cell source
    #[serde(default)]
    pub source: Option<CellSource>,

    /// Outputs, execution count, attachments, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cell source, stored either whole or split into lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// The source as one string.
    pub fn join(self) -> String {
        match self {
            CellSource::Text(text) => text,
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

fn default_nbformat() -> u32 {
    4
}

impl JupyterNotebook {
    /// Convert into a document, validating every cell type.
    pub fn into_document(self) -> SyncResult<Document> {
        let mut cells = Vec::with_capacity(self.cells.len());
        for cell in self.cells {
            let kind: CellKind = cell.cell_type.parse()?;
            let mut converted = Cell::new(kind, String::new()).with_metadata(cell.metadata);
            converted.source = cell.source.map(CellSource::join);
            converted.extra = cell.extra;
            cells.push(converted);
        }

        let mut document = Document::new(cells).with_metadata(self.metadata);
        document.nbformat = self.nbformat;
        document.nbformat_minor = self.nbformat_minor;
        document.extra = self.extra;
        Ok(document)
    }
}

/// Parse notebook JSON.
pub fn parse_notebook(json: &str) -> SyncResult<Document> {
    let notebook: JupyterNotebook = serde_json::from_str(json)?;
    notebook.into_document()
}

/// Read a notebook from a file, recording its path on the document.
pub fn read_notebook(path: impl AsRef<Path>) -> SyncResult<Document> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SyncError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let document = parse_notebook(&content)?.with_path(path);
    tracing::debug!("Read {} ({} cells)", path.display(), document.len());
    Ok(document)
}

/// Split source into lines, keeping line terminators.
pub fn split_source(source: &str) -> Vec<String> {
    source.split_inclusive('\n').map(str::to_string).collect()
}

fn cell_to_value(cell: &Cell) -> Value {
    let mut map = cell.extra.clone();
    map.insert("cell_type".to_string(), Value::from(cell.kind.as_str()));
    map.insert("metadata".to_string(), Value::Object(cell.metadata.clone()));
    if let Some(source) = &cell.source {
        map.insert("source".to_string(), Value::from(split_source(source)));
    }
    Value::Object(map)
}

/// Drop every key ending in [`RESERVED_SUFFIX`], at any depth.
fn strip_reserved(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !key.ends_with(RESERVED_SUFFIX))
                .map(|(key, value)| (key, strip_reserved(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_reserved).collect()),
        other => other,
    }
}

/// The JSON value a document is written as.
pub fn notebook_to_value(document: &Document) -> Value {
    let mut root = document.extra.clone();
    root.insert(
        "cells".to_string(),
        Value::Array(document.cells().iter().map(cell_to_value).collect()),
    );
    root.insert("metadata".to_string(), Value::Object(document.metadata.clone()));
    root.insert("nbformat".to_string(), Value::from(document.nbformat));
    root.insert("nbformat_minor".to_string(), Value::from(document.nbformat_minor));
    strip_reserved(Value::Object(root))
}

/// Serialize a document as notebook JSON, with a trailing newline.
pub fn notebook_to_string(document: &Document) -> SyncResult<String> {
    let value = notebook_to_value(document);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    let mut json =
        String::from_utf8(buf).map_err(|e| SyncError::InvalidNotebook(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

/// Write a document to a notebook file.
pub fn write_notebook(document: &Document, path: impl AsRef<Path>) -> SyncResult<()> {
    let path = path.as_ref();
    let json = notebook_to_string(document)?;
    fs::write(path, json).map_err(|e| SyncError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_as_string_or_lines() {
        let document = parse_notebook(
            r##"{
                "cells": [
                    {"cell_type": "code", "metadata": {}, "source": ["#| process\n", "x = 1"]},
                    {"cell_type": "markdown", "metadata": {}, "source": "# Title"}
                ],
                "metadata": {},
                "nbformat": 4,
                "nbformat_minor": 5
            }"##,
        )
        .unwrap();

        assert_eq!(document.cells()[0].text(), "#| process\nx = 1");
        assert_eq!(document.cells()[1].text(), "# Title");
        assert_eq!(document.cells()[1].kind, CellKind::Markdown);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let document = parse_notebook(
            r#"{
                "cells": [
                    {"cell_type": "code", "execution_count": 3, "id": "abc",
                     "metadata": {"tags": ["hide"]}, "outputs": [], "source": []}
                ],
                "metadata": {"kernelspec": {"language": "julia"}},
                "nbformat": 4,
                "nbformat_minor": 4,
                "worksheets_meta": true
            }"#,
        )
        .unwrap();

        let cell = &document.cells()[0];
        assert_eq!(cell.extra.get("execution_count"), Some(&json!(3)));
        assert_eq!(cell.extra.get("id"), Some(&json!("abc")));
        assert_eq!(cell.metadata.get("tags"), Some(&json!(["hide"])));
        assert_eq!(cell.text(), "");
        assert_eq!(document.language(), "julia");
        assert_eq!(document.nbformat_minor, 4);
        assert_eq!(document.extra.get("worksheets_meta"), Some(&json!(true)));
    }

    #[test]
    fn test_unknown_cell_type_is_rejected() {
        let err = parse_notebook(r#"{"cells": [{"cell_type": "heading", "source": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Core(nbpress_core::Error::UnexpectedCellType(ref kind)) if kind == "heading"
        ));
    }

    #[test]
    fn test_written_layout() {
        let mut cell = Cell::code("a\nb");
        cell.extra.insert("execution_count".to_string(), Value::Null);
        cell.extra.insert("outputs".to_string(), json!([]));
        let document = Document::new(vec![cell]);

        let expected = r#"{
 "cells": [
  {
   "cell_type": "code",
   "execution_count": null,
   "metadata": {},
   "outputs": [],
   "source": [
    "a\n",
    "b"
   ]
  }
 ],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 5
}
"#;
        assert_eq!(notebook_to_string(&document).unwrap(), expected);
    }

    #[test]
    fn test_reserved_keys_are_dropped_everywhere() {
        let mut metadata = Map::new();
        metadata.insert("path_".to_string(), json!("nbs/index.ipynb"));
        metadata.insert("nested".to_string(), json!({ "keep": 1, "drop_": 2 }));

        let mut cell = Cell::markdown("héllo ✓");
        cell.extra.insert("index_".to_string(), json!(0));
        let document = Document::new(vec![cell]).with_metadata(metadata);

        let value = notebook_to_value(&document);
        assert_eq!(value["metadata"], json!({ "nested": { "keep": 1 } }));
        assert!(value["cells"][0].get("index_").is_none());

        let text = notebook_to_string(&document).unwrap();
        assert!(text.contains("héllo ✓"));
    }

    #[test]
    fn test_cleared_source_is_omitted() {
        let mut cell = Cell::raw("x");
        cell.clear_source();
        let value = notebook_to_value(&Document::new(vec![cell]));
        assert!(value["cells"][0].get("source").is_none());
    }

    #[test]
    fn test_split_source() {
        assert_eq!(split_source("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_source("a\r\nb"), vec!["a\r\n", "b"]);
        assert!(split_source("").is_empty());
    }
}
