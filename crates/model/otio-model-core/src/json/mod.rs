//! JSON encoding and decoding of object graphs.
//!
//! Every object is written as a JSON object whose `OTIO_SCHEMA` key holds
//! `"<Name>.<Version>"`, followed by the schema's fields in a fixed order and
//! then any dynamic fields. Objects reached more than once are written in full
//! at their first occurrence (tagged with `OTIO_REF_ID`) and as
//! `SerializableObjectRef` entries afterwards, which also terminates cycles.

mod decode;
mod encode;

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::registry::{self, TypeRegistry};

pub use decode::Reader;
pub use encode::Writer;

pub(crate) const SCHEMA_KEY: &str = "OTIO_SCHEMA";
pub(crate) const REF_ID_KEY: &str = "OTIO_REF_ID";
pub(crate) const REF_SCHEMA: &str = "SerializableObjectRef.1";

pub fn to_json_value(object: &Object) -> Result<JsonValue> {
    Ok(encode::Encoder::encode_root(object))
}

pub(crate) fn reachable_objects(root: &Object) -> Vec<Object> {
    encode::Encoder::discover(root)
}

pub fn to_json_string(object: &Object) -> Result<String> {
    to_json_string_with_config(object, &Config::default())
}

pub fn to_json_string_with_config(object: &Object, config: &Config) -> Result<String> {
    let tree = to_json_value(object)?;
    if config.indent == 0 {
        return Ok(serde_json::to_string(&tree)?);
    }
    let indent = " ".repeat(config.indent);
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    tree.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|err| Error::new(ErrorKind::InternalError, err.to_string()))
}

pub fn from_json_value(tree: JsonValue) -> Result<Object> {
    from_json_value_with(tree, registry::global(), &Config::default())
}

/// Decode with an explicit registry and configuration.
pub fn from_json_value_with(tree: JsonValue, registry: &TypeRegistry, config: &Config) -> Result<Object> {
    decode::Decoder::new(registry, config).decode_root(tree)
}

pub fn from_json_string(text: &str) -> Result<Object> {
    from_json_string_with_config(text, &Config::default())
}

pub fn from_json_string_with_config(text: &str, config: &Config) -> Result<Object> {
    let tree: JsonValue = serde_json::from_str(text)?;
    from_json_value_with(tree, registry::global(), config)
}

pub fn read_from_file(path: impl AsRef<Path>) -> Result<Object> {
    read_from_file_with_config(path, &Config::default())
}

pub fn read_from_file_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Object> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        Error::new(
            ErrorKind::FileOpenFailed,
            format!("{}: {err}", path.display()),
        )
    })?;
    let tree: JsonValue = serde_json::from_slice(&bytes)?;
    from_json_value_with(tree, registry::global(), config)
}

pub fn write_to_file(object: &Object, path: impl AsRef<Path>, config: &Config) -> Result<()> {
    let path = path.as_ref();
    let text = to_json_string_with_config(object, config)?;
    fs::write(path, text).map_err(|err| {
        Error::new(
            ErrorKind::FileWriteFailed,
            format!("{}: {err}", path.display()),
        )
    })
}
