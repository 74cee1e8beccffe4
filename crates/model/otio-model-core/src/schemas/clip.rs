use otio_time_core::TimeRange;

use crate::error::{Error, ErrorKind, Result};
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{item_accessors, schema_identity, schema_type, ItemFields, ObjectMeta, Schema};

use super::MissingReference;

/// A segment of media, trimmed by its source range.
///
/// A clip always holds a media reference; "no media" is spelled as a
/// [`MissingReference`].
#[derive(Debug)]
pub struct Clip {
    pub meta: ObjectMeta,
    pub item: ItemFields,
    media_reference: Object,
}

impl Default for Clip {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            item: ItemFields::default(),
            media_reference: Object::new(MissingReference::default()),
        }
    }
}

schema_type!(Clip, "Clip", 1);

impl Clip {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            ..Self::default()
        }
    }

    /// Clip with an explicit trim and optional media.
    pub fn new(
        name: impl Into<String>,
        media_reference: Option<Object>,
        source_range: Option<TimeRange>,
    ) -> Result<Self> {
        let mut clip = Self {
            meta: ObjectMeta::named(name),
            item: ItemFields::with_source_range(source_range),
            ..Self::default()
        };
        clip.set_media_reference(media_reference)?;
        Ok(clip)
    }

    pub fn media_reference(&self) -> &Object {
        &self.media_reference
    }

    /// `None` installs a fresh `MissingReference`.
    pub fn set_media_reference(&mut self, media_reference: Option<Object>) -> Result<()> {
        let media_reference = match media_reference {
            Some(reference) => {
                if !reference.is_media_reference() && !reference.is_unknown_schema() {
                    return Err(Error::new(
                        ErrorKind::TypeMismatch,
                        format!("expected a media reference, found {}", reference.schema_name()),
                    ));
                }
                reference
            }
            None => Object::new(MissingReference::default()),
        };
        self.media_reference = media_reference;
        Ok(())
    }
}

impl Schema for Clip {
    schema_identity!();
    item_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.item.write(writer);
        writer.write_object("media_reference", Some(&self.media_reference));
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.item.read(reader)?;
        let reference = reader.read_object("media_reference")?;
        self.set_media_reference(reference)
    }

    fn available_range(&self) -> Result<TimeRange> {
        let reference = self.media_reference.body();
        reference
            .media_reference()
            .and_then(|fields| fields.available_range)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::CannotComputeAvailableRange,
                    format!(
                        "clip '{}' has a {} without an available range",
                        self.meta.name,
                        reference.schema_name()
                    ),
                )
            })
    }
}
