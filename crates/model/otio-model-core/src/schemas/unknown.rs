use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{schema_identity, schema_type, Schema};

/// Stand-in for a schema this process does not know.
///
/// All of the original fields are kept as the object's dynamic fields and
/// written back under the original `OTIO_SCHEMA` tag, so the document
/// round-trips unchanged.
#[derive(Debug)]
pub struct UnknownSchema {
    original_schema_name: String,
    original_schema_version: i64,
}

impl Default for UnknownSchema {
    fn default() -> Self {
        Self {
            original_schema_name: "UnknownSchema".to_string(),
            original_schema_version: 1,
        }
    }
}

schema_type!(UnknownSchema, "UnknownSchema", 1);

impl UnknownSchema {
    pub fn new(original_schema_name: impl Into<String>, original_schema_version: i64) -> Self {
        Self {
            original_schema_name: original_schema_name.into(),
            original_schema_version,
        }
    }

    pub fn original_schema_name(&self) -> &str {
        &self.original_schema_name
    }

    pub fn original_schema_version(&self) -> i64 {
        self.original_schema_version
    }
}

impl Schema for UnknownSchema {
    schema_identity!();

    fn serialized_tag(&self) -> String {
        format!(
            "{}.{}",
            self.original_schema_name, self.original_schema_version
        )
    }

    fn write_fields(&self, _writer: &mut Writer<'_>) {}

    fn read_fields(&mut self, _reader: &mut Reader<'_, '_>) -> Result<()> {
        Ok(())
    }
}
