//! Serialization configuration for otio-model-core.

use serde::{Deserialize, Serialize};

/// Options for the JSON encode/decode entry points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spaces per nesting level in emitted JSON; 0 writes compact output.
    pub indent: usize,

    /// Preserve unregistered schemas as `UnknownSchema` objects. When false,
    /// decoding an unregistered schema fails with `SchemaNotRegistered`.
    pub allow_unknown_schemas: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent: 4,
            allow_unknown_schemas: true,
        }
    }
}

impl Config {
    pub fn compact() -> Self {
        Self {
            indent: 0,
            ..Self::default()
        }
    }
}
