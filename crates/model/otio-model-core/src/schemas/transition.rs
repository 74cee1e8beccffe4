use otio_time_core::RationalTime;

use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{meta_accessors, schema_identity, schema_type, ObjectMeta, Schema};

pub mod transition_type {
    pub const SMPTE_DISSOLVE: &str = "SMPTE_Dissolve";
    pub const CUSTOM: &str = "Custom";
}

/// A blend between the neighbouring children of a track.
///
/// It overlaps its neighbours by `in_offset` before the cut and `out_offset`
/// after it, and is neither visible nor trimmable on its own.
#[derive(Debug, Default)]
pub struct Transition {
    pub meta: ObjectMeta,
    pub transition_type: String,
    pub in_offset: RationalTime,
    pub out_offset: RationalTime,
}

schema_type!(Transition, "Transition", 1);

impl Transition {
    pub fn new(
        name: impl Into<String>,
        transition_type: impl Into<String>,
        in_offset: RationalTime,
        out_offset: RationalTime,
    ) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            transition_type: transition_type.into(),
            in_offset,
            out_offset,
        }
    }
}

impl Schema for Transition {
    schema_identity!();
    meta_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        writer.write_time("in_offset", self.in_offset);
        writer.write_time("out_offset", self.out_offset);
        writer.write_str("transition_type", &self.transition_type);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        if let Some(offset) = reader.read_time("in_offset")? {
            self.in_offset = offset;
        }
        if let Some(offset) = reader.read_time("out_offset")? {
            self.out_offset = offset;
        }
        if let Some(kind) = reader.read_string("transition_type")? {
            self.transition_type = kind;
        }
        Ok(())
    }

    fn is_composable(&self) -> bool {
        true
    }

    fn visible(&self) -> bool {
        false
    }

    fn overlapping(&self) -> bool {
        true
    }

    fn duration(&self) -> Result<RationalTime> {
        Ok(self.in_offset + self.out_offset)
    }
}
