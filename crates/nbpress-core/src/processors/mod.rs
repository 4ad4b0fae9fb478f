//! Processors bundled with nbpress.
//!
//! Registered under the `nbpress.processors` location:
//!
//! | Reference                                         | Kind |
//! |---------------------------------------------------|------|
//! | `nbpress.processors:BasicProcessor`               | cell |
//! | `nbpress.processors:SemanticVersioningProcessor`  | raw  |

mod basic;
mod semantic_versioning;

pub use basic::{BasicProcessor, BasicProcessorArgs};
pub use semantic_versioning::{
    REFERENCE_JAVASCRIPT, REFERENCE_JQUERY, SemanticVersioningArgs, SemanticVersioningProcessor,
};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::processor::ProcessorKind;
use crate::registry::{ProcessorArgs, ProcessorRegistry};

/// Location of the bundled processors.
pub const BUILTIN_LOCATION: &str = "nbpress.processors";

pub(crate) fn register_builtins(registry: &mut ProcessorRegistry) {
    registry
        .register(BUILTIN_LOCATION, "BasicProcessor", |args| {
            Ok(ProcessorKind::cell(BasicProcessor::with_args(parse_args(
                "BasicProcessor",
                args,
            )?)))
        })
        .register(BUILTIN_LOCATION, "SemanticVersioningProcessor", |args| {
            Ok(ProcessorKind::raw(SemanticVersioningProcessor::with_args(
                parse_args("SemanticVersioningProcessor", args)?,
            )))
        });
}

/// Deserialize a processor's argument bundle, defaulting when absent.
pub fn parse_args<T>(processor: &str, args: Option<&ProcessorArgs>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match args {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| Error::InvalidProcessorArgs {
                processor: processor.to_string(),
                message: e.to_string(),
            })
        }
    }
}
