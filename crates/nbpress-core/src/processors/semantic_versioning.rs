//! Version-aware sidebar for rendered documentation.
//!
//! Injects a jQuery script tag and an inline script at the top of the
//! rendered page. The script hides sidebar menus belonging to other
//! versions, assuming a layout like:
//!
//! ```text
//! docs/
//!   version_1/
//!     page_1.qmd
//!   version_2/
//!     page_1.qmd
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::processor::RawProcessor;

/// Script tag loading jQuery from the Google CDN.
pub const REFERENCE_JQUERY: &str =
    r#"<script src="https://ajax.googleapis.com/ajax/libs/jquery/3.6.3/jquery.min.js"></script>"#;

/// Inline script driving the version menu.
pub const REFERENCE_JAVASCRIPT: &str = concat!(
    "<script>",
    include_str!("assets/semantic_versioning.js"),
    "</script>"
);

/// Arguments accepted under `processor_args.SemanticVersioningProcessor`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticVersioningArgs {
    /// Replacement for [`REFERENCE_JQUERY`], e.g. a self-hosted copy.
    pub jquery: Option<String>,
}

/// Prepends the version menu scripts to rendered content.
#[derive(Debug, Clone, Default)]
pub struct SemanticVersioningProcessor {
    args: SemanticVersioningArgs,
}

impl SemanticVersioningProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(args: SemanticVersioningArgs) -> Self {
        Self { args }
    }

    /// The header injected above the content.
    pub fn header(&self) -> String {
        let jquery = self.args.jquery.as_deref().unwrap_or(REFERENCE_JQUERY);
        format!("{jquery}\n{REFERENCE_JAVASCRIPT}")
    }
}

impl RawProcessor for SemanticVersioningProcessor {
    fn name(&self) -> &str {
        "nbpress.processors.SemanticVersioningProcessor"
    }

    fn process(&mut self, content: String) -> Result<String> {
        let header = self.header();
        if content.contains(&header) {
            tracing::debug!("Version scripts already present, skipping");
            return Ok(content);
        }
        Ok(format!("{header}\n{content}"))
    }
}
