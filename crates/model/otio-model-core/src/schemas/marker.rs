use otio_time_core::TimeRange;
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{meta_accessors, schema_identity, schema_type, ObjectMeta, Schema};

pub mod color {
    pub const PINK: &str = "PINK";
    pub const RED: &str = "RED";
    pub const ORANGE: &str = "ORANGE";
    pub const YELLOW: &str = "YELLOW";
    pub const GREEN: &str = "GREEN";
    pub const CYAN: &str = "CYAN";
    pub const BLUE: &str = "BLUE";
    pub const PURPLE: &str = "PURPLE";
    pub const MAGENTA: &str = "MAGENTA";
    pub const BLACK: &str = "BLACK";
    pub const WHITE: &str = "WHITE";
}

/// A labelled range on an item, in the item's own time.
#[derive(Debug)]
pub struct Marker {
    pub meta: ObjectMeta,
    pub color: String,
    pub marked_range: TimeRange,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            color: color::GREEN.to_string(),
            marked_range: TimeRange::default(),
        }
    }
}

schema_type!(Marker, "Marker", 2);

impl Marker {
    pub fn new(name: impl Into<String>, marked_range: TimeRange, color: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            color: color.into(),
            marked_range,
        }
    }
}

/// Version 1 stored the marked range under `range`.
pub(crate) fn upgrade_marker_to_v2(fields: &mut Map<String, JsonValue>) {
    if let Some(range) = fields.shift_remove("range") {
        fields.insert("marked_range".to_string(), range);
    }
}

impl Schema for Marker {
    schema_identity!();
    meta_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        writer.write_str("color", &self.color);
        writer.write_range("marked_range", self.marked_range);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        if let Some(color) = reader.read_string("color")? {
            self.color = color;
        }
        if let Some(range) = reader.read_range("marked_range")? {
            self.marked_range = range;
        }
        Ok(())
    }
}
