//! Comment markers for notebook kernel languages.
//!
//! Directives live in comments, so the marker that introduces them depends on
//! the language declared in the notebook's kernel spec.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Language used when a notebook declares none.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Marker used for languages that are not registered.
pub const DEFAULT_MARKER: CommentMarker = CommentMarker::Line("#");

/// The comment syntax of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentMarker {
    /// Single-line comment token, e.g. `#` or `//`.
    Line(&'static str),
    /// Block comment pair, e.g. `/*` and `*/`.
    Block {
        open: &'static str,
        close: &'static str,
    },
}

impl CommentMarker {
    /// The token that starts a directive line.
    ///
    /// For block comments this is the opening token.
    pub fn prefix(&self) -> &'static str {
        match self {
            CommentMarker::Line(token) => *token,
            CommentMarker::Block { open, .. } => *open,
        }
    }

    /// The closing token for block comments.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            CommentMarker::Line(_) => None,
            CommentMarker::Block { close, .. } => Some(*close),
        }
    }
}

static MARKERS: LazyLock<FxHashMap<&'static str, CommentMarker>> = LazyLock::new(|| {
    use CommentMarker::{Block, Line};

    let entries = [
        ("r", Line("#")),
        ("python", Line("#")),
        ("julia", Line("#")),
        ("scala", Line("//")),
        ("matlab", Line("%")),
        ("csharp", Line("//")),
        ("fsharp", Line("//")),
        ("c", Block { open: "/*", close: "*/" }),
        ("css", Block { open: "/*", close: "*/" }),
        ("sas", Block { open: "*", close: ";" }),
        ("powershell", Line("#")),
        ("bash", Line("#")),
        ("sql", Line("--")),
        ("mysql", Line("--")),
        ("psql", Line("--")),
        ("lua", Line("--")),
        ("cpp", Line("//")),
        ("cc", Line("//")),
        ("stan", Line("#")),
        ("octave", Line("#")),
        ("fortran", Line("!")),
        ("fortran95", Line("!")),
        ("awk", Line("#")),
        ("gawk", Line("#")),
        ("stata", Line("*")),
        ("java", Line("//")),
        ("groovy", Line("//")),
        ("sed", Line("#")),
        ("perl", Line("#")),
        ("ruby", Line("#")),
        ("tikz", Line("%")),
        ("js", Line("//")),
        ("d3", Line("//")),
        ("node", Line("//")),
        ("sass", Line("//")),
        ("coffee", Line("#")),
        ("go", Line("//")),
        ("asy", Line("//")),
        ("haskell", Line("--")),
        ("dot", Line("//")),
        ("apl", Line("⍝")),
    ];

    entries.into_iter().collect()
});

/// Look up the comment marker for a language.
///
/// Unknown languages fall back to [`DEFAULT_MARKER`].
pub fn comment_marker(language: &str) -> CommentMarker {
    MARKERS.get(language).copied().unwrap_or(DEFAULT_MARKER)
}

/// All registered language identifiers.
pub fn known_languages() -> impl Iterator<Item = &'static str> {
    MARKERS.keys().copied()
}
