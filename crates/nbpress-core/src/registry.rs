//! Resolution of processor references.
//!
//! Configuration names processors with `location:Name` strings, e.g.
//! `nbpress.processors:BasicProcessor`. The registry maps those references
//! to factories so that every reference can be checked before a notebook is
//! touched.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::processor::ProcessorKind;
use crate::processors;

/// Free-form keyword arguments for one processor.
pub type ProcessorArgs = serde_json::Value;

/// Builds a processor from its optional arguments.
pub type ProcessorFactory =
    Box<dyn Fn(Option<&ProcessorArgs>) -> Result<ProcessorKind> + Send + Sync>;

/// A `location:Name` processor reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorReference {
    /// Module-like location, e.g. `nbpress.processors`.
    pub location: String,
    /// Processor name; also the key for its `processor_args` bundle.
    pub name: String,
}

impl ProcessorReference {
    pub fn new(location: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            name: name.into(),
        }
    }
}

impl FromStr for ProcessorReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once(':') {
            Some((location, name)) if !location.is_empty() && !name.is_empty() => {
                Ok(Self::new(location, name))
            }
            _ => Err(Error::InvalidProcessorReference(s.to_string())),
        }
    }
}

impl fmt::Display for ProcessorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.location, self.name)
    }
}

/// Registry of constructible processors.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: FxHashMap<ProcessorReference, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the bundled processors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        processors::register_builtins(&mut registry);
        registry
    }

    /// Register a factory under `location:name`, replacing any previous one.
    pub fn register<F>(&mut self, location: &str, name: &str, factory: F) -> &mut Self
    where
        F: Fn(Option<&ProcessorArgs>) -> Result<ProcessorKind> + Send + Sync + 'static,
    {
        self.factories
            .insert(ProcessorReference::new(location, name), Box::new(factory));
        self
    }

    pub fn contains(&self, reference: &ProcessorReference) -> bool {
        self.factories.contains_key(reference)
    }

    /// All registered references, sorted.
    pub fn references(&self) -> Vec<&ProcessorReference> {
        let mut references: Vec<_> = self.factories.keys().collect();
        references.sort();
        references
    }

    fn lookup(&self, reference: &str) -> Option<(ProcessorReference, &ProcessorFactory)> {
        let parsed: ProcessorReference = reference.parse().ok()?;
        let factory = self.factories.get(&parsed)?;
        Some((parsed, factory))
    }

    /// Every reference in `references` that does not resolve, in order.
    pub fn resolve_all<S: AsRef<str>>(&self, references: &[S]) -> Vec<String> {
        references
            .iter()
            .map(|reference| reference.as_ref())
            .filter(|reference| {
                tracing::debug!("Resolving processor {}", reference);
                self.lookup(reference).is_none()
            })
            .map(str::to_string)
            .collect()
    }

    /// Check that every reference resolves.
    ///
    /// All failures are reported together in
    /// [`Error::UnresolvedProcessors`].
    pub fn validate<S: AsRef<str>>(&self, references: &[S]) -> Result<()> {
        let unresolved = self.resolve_all(references);
        if unresolved.is_empty() {
            tracing::debug!("All {} processor references resolved", references.len());
            Ok(())
        } else {
            Err(Error::UnresolvedProcessors(unresolved))
        }
    }

    /// Construct processors in order.
    ///
    /// Each processor receives the bundle in `args` keyed by its name.
    pub fn instantiate<S: AsRef<str>>(
        &self,
        references: &[S],
        args: &FxHashMap<String, ProcessorArgs>,
    ) -> Result<Vec<ProcessorKind>> {
        self.validate(references)?;

        references
            .iter()
            .filter_map(|reference| self.lookup(reference.as_ref()))
            .map(|(reference, factory)| factory(args.get(&reference.name)))
            .collect()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("references", &self.references())
            .finish()
    }
}
