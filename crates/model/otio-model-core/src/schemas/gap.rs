use otio_time_core::{RationalTime, TimeRange};

use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{item_accessors, schema_identity, schema_type, ItemFields, ObjectMeta, Schema};

/// Empty space in a track.
#[derive(Debug, Default)]
pub struct Gap {
    pub meta: ObjectMeta,
    pub item: ItemFields,
}

schema_type!(Gap, "Gap", 1);

impl Gap {
    /// Gap spanning `duration` from zero.
    pub fn with_duration(duration: RationalTime) -> Self {
        Self {
            meta: ObjectMeta::default(),
            item: ItemFields::with_source_range(Some(TimeRange::new(
                RationalTime::new(0.0, duration.rate()),
                duration,
            ))),
        }
    }

    pub fn named(name: impl Into<String>, duration: RationalTime) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            ..Self::with_duration(duration)
        }
    }
}

impl Schema for Gap {
    schema_identity!();
    item_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.item.write(writer);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.item.read(reader)
    }

    /// A gap only shows something when effects generate content over it.
    fn visible(&self) -> bool {
        self.item.enabled && !self.item.effects.is_empty()
    }

    fn available_range(&self) -> Result<TimeRange> {
        Ok(self.item.source_range.unwrap_or_default())
    }
}
