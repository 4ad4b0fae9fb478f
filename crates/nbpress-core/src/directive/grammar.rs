//! Recognition, normalization and parsing of single directive lines.
//!
//! A directive line is a comment whose marker is followed by a pipe:
//!
//! ```text
//! #| echo: false
//! #|process
//! //| fig-cap: "A caption"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::language::{self, CommentMarker, DEFAULT_MARKER};

static CELL_MAGIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*%%\w+").expect("cell magic pattern"));

static GRAMMARS: LazyLock<FxHashMap<CommentMarker, DirectiveGrammar>> = LazyLock::new(|| {
    language::known_languages()
        .map(language::comment_marker)
        .chain([DEFAULT_MARKER])
        .map(|marker| (marker, DirectiveGrammar::new(marker)))
        .collect()
});

static DEFAULT_GRAMMAR: LazyLock<DirectiveGrammar> =
    LazyLock::new(|| DirectiveGrammar::new(DEFAULT_MARKER));

/// Whether `line` is a cell magic such as `%%bash`.
pub fn is_cell_magic(line: &str) -> bool {
    CELL_MAGIC.is_match(line)
}

/// Compiled directive patterns for one comment marker.
#[derive(Debug, Clone)]
pub struct DirectiveGrammar {
    marker: CommentMarker,
    /// `<marker>|` at the start of a line.
    prefix: Regex,
    /// `<marker>|` plus any whitespace that follows it.
    padded_prefix: Regex,
    /// `<marker>| name:`, the option form kept in rendered output.
    option: Regex,
}

impl DirectiveGrammar {
    /// Compile the patterns for a comment marker.
    pub fn new(marker: CommentMarker) -> Self {
        let escaped = regex::escape(marker.prefix());
        let head = format!(r"^[ \t]*{}[ \t]*\|", escaped);

        Self {
            marker,
            prefix: compile(&head),
            padded_prefix: compile(&format!(r"{}[ \t]*", head)),
            option: compile(&format!(r"{}[ \t]*[\w|-]+[ \t]*:", head)),
        }
    }

    /// The cached grammar for a notebook language.
    pub fn for_language(language: &str) -> &'static DirectiveGrammar {
        let marker = language::comment_marker(language);
        GRAMMARS.get(&marker).unwrap_or(&DEFAULT_GRAMMAR)
    }

    pub fn marker(&self) -> CommentMarker {
        self.marker
    }

    /// Whether the line starts with `<marker>|`.
    ///
    /// This is the test used to find the end of a cell's directive block.
    pub fn is_directive_line(&self, line: &str) -> bool {
        self.prefix.is_match(line)
    }

    /// Whether the line is a `<marker>| name:` option.
    pub fn is_option_line(&self, line: &str) -> bool {
        self.option.is_match(line)
    }

    /// Rewrite a directive line so exactly one space follows `<marker>|`.
    ///
    /// Lines that are not directives are returned unchanged.
    pub fn normalize(&self, line: &str) -> String {
        match self.padded_prefix.find(line) {
            Some(found) => format!("{}| {}", self.marker.prefix(), &line[found.end()..]),
            None => line.to_string(),
        }
    }

    /// Split a directive line into its name and positional arguments.
    ///
    /// A trailing colon (`#| echo:`) is dropped, otherwise every colon is
    /// followed by a space so `key:value` splits into two tokens. Returns
    /// `None` for lines that are not directives or carry no name.
    pub fn parse_line(&self, line: &str) -> Option<(String, Vec<String>)> {
        let found = self.prefix.find(line)?;
        let mut body = line[found.end()..].trim();

        if let Some(close) = self.marker.suffix() {
            body = body.strip_suffix(close).unwrap_or(body).trim_end();
        }

        let body = if body.ends_with(':') {
            body.replace(':', "")
        } else if body.contains(':') {
            body.replace(':', ": ")
        } else {
            body.to_string()
        };

        let mut tokens = body.split_whitespace();
        let name = tokens.next()?.trim_end_matches(':');
        if name.is_empty() {
            return None;
        }

        Some((name.to_string(), tokens.map(str::to_string).collect()))
    }
}

fn compile(pattern: &str) -> Regex {
    // Markers are escaped before interpolation.
    Regex::new(pattern).expect("directive pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> &'static DirectiveGrammar {
        DirectiveGrammar::for_language("python")
    }

    #[test]
    fn test_directive_recognition() {
        let grammar = python();
        assert!(grammar.is_directive_line("#| process\n"));
        assert!(grammar.is_directive_line("  #  |echo: false"));
        assert!(!grammar.is_directive_line("# plain comment"));
        assert!(!grammar.is_directive_line("x = 1 #| trailing"));

        assert!(grammar.is_option_line("#| echo: false"));
        assert!(grammar.is_option_line("#|fig-cap : text"));
        assert!(!grammar.is_option_line("#| process"));
    }

    #[test]
    fn test_normalize_adds_single_space() {
        let grammar = python();
        assert_eq!(grammar.normalize("#|echo: false\n"), "#| echo: false\n");
        assert_eq!(grammar.normalize("  #|    echo: false\n"), "#| echo: false\n");
        assert_eq!(grammar.normalize("print(1)\n"), "print(1)\n");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let grammar = python();
        for line in ["#|echo: false\n", "#|   output: asis", "#| process\n"] {
            let once = grammar.normalize(line);
            assert_eq!(grammar.normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_keeps_line_terminator_on_empty_directive() {
        assert_eq!(python().normalize("#|\n"), "#| \n");
    }

    #[test]
    fn test_parse_line() {
        let grammar = python();
        assert_eq!(
            grammar.parse_line("#| process\n"),
            Some(("process".to_string(), vec![]))
        );
        assert_eq!(
            grammar.parse_line("#|opt: 1\n"),
            Some(("opt".to_string(), vec!["1".to_string()]))
        );
        assert_eq!(
            grammar.parse_line("#| explain addition 0 ("),
            Some((
                "explain".to_string(),
                vec!["addition".to_string(), "0".to_string(), "(".to_string()]
            ))
        );
    }

    #[test]
    fn test_parse_trailing_colon() {
        assert_eq!(
            python().parse_line("#| echo:"),
            Some(("echo".to_string(), vec![]))
        );
    }

    #[test]
    fn test_parse_inline_colon_splits_value() {
        assert_eq!(
            python().parse_line("#| key:value"),
            Some(("key".to_string(), vec!["value".to_string()]))
        );
    }

    #[test]
    fn test_parse_rejects_non_directives() {
        let grammar = python();
        assert_eq!(grammar.parse_line("%%bash\n"), None);
        assert_eq!(grammar.parse_line("\n"), None);
        assert_eq!(grammar.parse_line("#|\n"), None);
        assert_eq!(grammar.parse_line("#| :"), None);
    }

    #[test]
    fn test_multi_character_marker() {
        let grammar = DirectiveGrammar::for_language("haskell");
        assert!(grammar.is_directive_line("--| export"));
        assert!(!grammar.is_directive_line("#| export"));
        assert_eq!(
            grammar.parse_line("--|hide: true"),
            Some(("hide".to_string(), vec!["true".to_string()]))
        );
        assert_eq!(grammar.normalize("--|hide: true"), "--| hide: true");
    }

    #[test]
    fn test_block_marker_drops_closing_token() {
        let grammar = DirectiveGrammar::for_language("c");
        assert!(grammar.is_directive_line("/*| echo: false */"));
        assert_eq!(
            grammar.parse_line("/*| echo: false */\n"),
            Some(("echo".to_string(), vec!["false".to_string()]))
        );
    }

    #[test]
    fn test_regex_metacharacter_marker() {
        let grammar = DirectiveGrammar::for_language("stata");
        assert!(grammar.is_directive_line("*| label: fig"));
        assert!(!grammar.is_directive_line("x| label: fig"));
    }

    #[test]
    fn test_cell_magic() {
        assert!(is_cell_magic("%%bash\n"));
        assert!(is_cell_magic("  %%time"));
        assert!(!is_cell_magic("%matplotlib inline"));
        assert!(!is_cell_magic("%% "));
    }
}
