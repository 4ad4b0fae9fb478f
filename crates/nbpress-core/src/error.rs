//! Error types for nbpress-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for nbpress-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nbpress-core.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more processor references could not be resolved.
    ///
    /// Every failing reference is collected before this is raised.
    #[error("could not resolve the following processors:\n{}", format_list(.0))]
    UnresolvedProcessors(Vec<String>),

    /// A processor reference is not of the form `location:Name`.
    #[error("invalid processor reference `{0}`, expected `location:Name`")]
    InvalidProcessorReference(String),

    /// The keyword arguments supplied to a processor were rejected.
    #[error("invalid arguments for processor `{processor}`: {message}")]
    InvalidProcessorArgs { processor: String, message: String },

    /// A cell kind outside of `code`, `markdown` and `raw`.
    #[error("unexpected cell type: {0}")]
    UnexpectedCellType(String),

    /// A processor failed while visiting a cell.
    #[error(
        "error processing notebook ({}) cell {index} with processor `{processor}`: {source}",
        path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<memory>".to_string())
    )]
    CellProcessing {
        path: Option<PathBuf>,
        index: usize,
        processor: String,
        #[source]
        source: Box<Error>,
    },

    /// Error raised from processor code.
    #[error("{0}")]
    Processor(String),

    /// Malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON error, so processor code can use `?` on serde_json calls.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error, so processor code can use `?` on filesystem calls.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for processors reporting a failure.
    pub fn processor(message: impl Into<String>) -> Self {
        Self::Processor(message.into())
    }

    /// Recovery hint shown next to the error in the CLI, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::UnresolvedProcessors(_) | Error::InvalidProcessorReference(_) => Some(
                "processor references look like `nbpress.processors:BasicProcessor`; \
                 check the `processors`, `post_processors` and `imports` keys",
            ),
            Error::InvalidProcessorArgs { .. } => {
                Some("check the matching entry under `processor_args`")
            }
            Error::UnexpectedCellType(_) => {
                Some("cells must have a `cell_type` of `code`, `markdown` or `raw`")
            }
            Error::CellProcessing { source, .. } => source.hint(),
            _ => None,
        }
    }

    /// Render the error followed by its recovery hint.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("    - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_lists_every_reference() {
        let err = Error::UnresolvedProcessors(vec!["a:B".to_string(), "c:D".to_string()]);
        let message = err.to_string();
        assert!(message.contains("- a:B"));
        assert!(message.contains("- c:D"));
    }

    #[test]
    fn test_cell_processing_keeps_source() {
        let err = Error::CellProcessing {
            path: Some(PathBuf::from("nbs/index.ipynb")),
            index: 3,
            processor: "demo::Failing".to_string(),
            source: Box::new(Error::processor("boom")),
        };

        let message = err.to_string();
        assert!(message.contains("nbs/index.ipynb"));
        assert!(message.contains("cell 3"));
        assert!(message.contains("demo::Failing"));
        assert!(message.ends_with("boom"));

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn test_with_hint() {
        let err = Error::UnexpectedCellType("heading".to_string());
        assert!(err.with_hint().contains("hint:"));
        assert_eq!(Error::processor("x").with_hint(), "x");
    }

    #[test]
    fn test_question_mark_conversions() {
        fn read(path: &std::path::Path) -> Result<String> {
            Ok(std::fs::read_to_string(path)?)
        }
        fn parse(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }

        let missing = std::path::Path::new("/definitely/not/here/missing.txt");
        assert!(matches!(read(missing), Err(Error::Io(_))));
        assert!(matches!(parse("{"), Err(Error::Json(_))));
        assert!(parse("{}").is_ok());
    }
}
