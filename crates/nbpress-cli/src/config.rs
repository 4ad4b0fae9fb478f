//! YAML project configuration.
//!
//! ```yaml
//! processors:
//!   - nbpress.processors:BasicProcessor
//! post_processors:
//!   - nbpress.processors:SemanticVersioningProcessor
//! processor_args:
//!   BasicProcessor:
//!     comment: "# processed"
//! documentation_source: nbs
//! output_folder: docs
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use nbpress_core::{Error, PipelineOptions, ProcessorArgs, ProcessorKind, ProcessorRegistry};
use nbpress_sync::{OutputFormat, ProcessOptions};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Folder used when neither the config nor the command line names one.
pub const DEFAULT_OUTPUT_FOLDER: &str = "processed";

/// Folder notebooks are read from; output paths are relative to it.
pub const DEFAULT_DOCUMENTATION_SOURCE: &str = "nbs";

/// Project configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// References that must resolve, whether or not they are used.
    pub imports: Vec<String>,
    /// Processors applied to each notebook, in order.
    pub processors: Vec<String>,
    /// Raw processors applied to rendered Quarto output, in order.
    pub post_processors: Vec<String>,
    /// Keyword arguments per processor, keyed by processor name.
    pub processor_args: FxHashMap<String, ProcessorArgs>,
    pub output_folder: Option<PathBuf>,
    pub documentation_source: PathBuf,
    pub output_format: OutputFormat,
    pub remove_directives: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imports: Vec::new(),
            processors: Vec::new(),
            post_processors: Vec::new(),
            processor_args: FxHashMap::default(),
            output_folder: None,
            documentation_source: PathBuf::from(DEFAULT_DOCUMENTATION_SOURCE),
            output_format: OutputFormat::default(),
            remove_directives: true,
        }
    }
}

impl Config {
    /// Parse configuration from YAML text. An empty document is the default
    /// configuration.
    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(
            "Loaded {} with {} processors and {} post processors",
            path.display(),
            config.processors.len(),
            config.post_processors.len()
        );
        Ok(config)
    }

    /// Every reference the configuration names.
    pub fn references(&self) -> Vec<&str> {
        self.imports
            .iter()
            .chain(&self.processors)
            .chain(&self.post_processors)
            .map(String::as_str)
            .collect()
    }

    /// Check that all references resolve in `registry`, reporting every
    /// failure at once.
    pub fn validate(&self, registry: &ProcessorRegistry) -> Result<(), Error> {
        registry.validate(&self.references())
    }

    /// Build a fresh set of processors for one notebook.
    pub fn build_processors(
        &self,
        registry: &ProcessorRegistry,
    ) -> Result<Vec<ProcessorKind>, Error> {
        let references: Vec<&str> = self
            .processors
            .iter()
            .chain(&self.post_processors)
            .map(String::as_str)
            .collect();
        registry.instantiate(&references, &self.processor_args)
    }

    /// Output folder, preferring `cli_override` over the configured one.
    pub fn output_folder(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(folder) = cli_override {
            return folder.to_path_buf();
        }
        match &self.output_folder {
            Some(folder) => folder.clone(),
            None => {
                tracing::warn!(
                    "No output folder configured, saving to `{}`",
                    DEFAULT_OUTPUT_FOLDER
                );
                PathBuf::from(DEFAULT_OUTPUT_FOLDER)
            }
        }
    }

    /// Processing options, with `format_override` taking precedence.
    pub fn process_options(&self, format_override: Option<OutputFormat>) -> ProcessOptions {
        ProcessOptions {
            pipeline: PipelineOptions {
                remove_directives: self.remove_directives,
            },
            format: format_override.unwrap_or(self.output_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
imports:
  - nbpress.processors:BasicProcessor
processors:
  - nbpress.processors:BasicProcessor
post_processors:
  - nbpress.processors:SemanticVersioningProcessor
processor_args:
  BasicProcessor:
    comment: "# processed"
output_folder: docs
documentation_source: notebooks
output_format: ipynb
remove_directives: false
unrelated_key: 3
"##;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(FULL).unwrap();

        assert_eq!(config.processors, vec!["nbpress.processors:BasicProcessor"]);
        assert_eq!(config.output_folder(None), PathBuf::from("docs"));
        assert_eq!(config.documentation_source, PathBuf::from("notebooks"));
        assert_eq!(config.output_format, OutputFormat::Ipynb);
        assert!(!config.remove_directives);
        assert_eq!(
            config.processor_args["BasicProcessor"]["comment"],
            serde_json::json!("# processed")
        );
        assert_eq!(config.references().len(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("processors: []").unwrap();
        assert_eq!(config.output_folder(None), PathBuf::from(DEFAULT_OUTPUT_FOLDER));
        assert_eq!(config.documentation_source, PathBuf::from("nbs"));
        assert_eq!(config.output_format, OutputFormat::Qmd);
        assert!(config.remove_directives);

        let empty = Config::from_yaml("").unwrap();
        assert!(empty.processors.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml(FULL).unwrap();
        assert_eq!(
            config.output_folder(Some(Path::new("elsewhere"))),
            PathBuf::from("elsewhere")
        );

        let options = config.process_options(Some(OutputFormat::Qmd));
        assert_eq!(options.format, OutputFormat::Qmd);
        assert!(!options.pipeline.remove_directives);
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("processors: {not: [a list"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_yaml("processors: 5"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_collects_every_bad_reference() {
        let config = Config::from_yaml(
            "imports: [missing:One]\nprocessors: [nbpress.processors:BasicProcessor, missing:Two]",
        )
        .unwrap();

        match config.validate(&ProcessorRegistry::with_builtins()) {
            Err(Error::UnresolvedProcessors(unresolved)) => {
                assert_eq!(unresolved, vec!["missing:One", "missing:Two"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_build_processors_in_order() {
        let config = Config::from_yaml(FULL).unwrap();
        let processors = config
            .build_processors(&ProcessorRegistry::with_builtins())
            .unwrap();

        assert_eq!(processors.len(), 2);
        assert!(!processors[0].is_raw());
        assert!(processors[1].is_raw());
    }
}
