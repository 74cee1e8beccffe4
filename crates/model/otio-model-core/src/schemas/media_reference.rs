use otio_time_core::TimeRange;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{
    meta_accessors, schema_identity, schema_type, MediaReferenceFields, ObjectMeta, Schema,
};

/// Media of unspecified kind.
#[derive(Debug, Default)]
pub struct MediaReference {
    pub meta: ObjectMeta,
    pub media: MediaReferenceFields,
}

schema_type!(MediaReference, "MediaReference", 1);

/// Media addressed by URL.
#[derive(Debug, Default)]
pub struct ExternalReference {
    pub meta: ObjectMeta,
    pub media: MediaReferenceFields,
    pub target_url: String,
}

schema_type!(ExternalReference, "ExternalReference", 1);

impl ExternalReference {
    pub fn new(target_url: impl Into<String>, available_range: Option<TimeRange>) -> Self {
        Self {
            meta: ObjectMeta::default(),
            media: MediaReferenceFields { available_range },
            target_url: target_url.into(),
        }
    }
}

/// Synthesised media (bars, solids, tone) described by a kind and parameters.
#[derive(Debug, Default)]
pub struct GeneratorReference {
    pub meta: ObjectMeta,
    pub media: MediaReferenceFields,
    pub generator_kind: String,
    pub parameters: Dictionary,
}

schema_type!(GeneratorReference, "GeneratorReference", 1);

impl GeneratorReference {
    pub fn new(generator_kind: impl Into<String>, available_range: Option<TimeRange>) -> Self {
        Self {
            meta: ObjectMeta::default(),
            media: MediaReferenceFields { available_range },
            generator_kind: generator_kind.into(),
            parameters: Dictionary::new(),
        }
    }
}

/// Placeholder for media that could not be located.
#[derive(Debug, Default)]
pub struct MissingReference {
    pub meta: ObjectMeta,
    pub media: MediaReferenceFields,
}

schema_type!(MissingReference, "MissingReference", 1);

impl MissingReference {
    pub fn new(available_range: Option<TimeRange>) -> Self {
        Self {
            meta: ObjectMeta::default(),
            media: MediaReferenceFields { available_range },
        }
    }
}

macro_rules! media_reference_accessors {
    () => {
        schema_identity!();
        meta_accessors!();

        fn media_reference(&self) -> Option<&MediaReferenceFields> {
            Some(&self.media)
        }
    };
}

impl Schema for MediaReference {
    media_reference_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.media.write(writer);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.media.read(reader)
    }
}

impl Schema for MissingReference {
    media_reference_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.media.write(writer);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.media.read(reader)
    }
}

impl Schema for ExternalReference {
    media_reference_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.media.write(writer);
        writer.write_str("target_url", &self.target_url);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.media.read(reader)?;
        if let Some(url) = reader.read_string("target_url")? {
            self.target_url = url;
        }
        Ok(())
    }
}

impl Schema for GeneratorReference {
    media_reference_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.media.write(writer);
        writer.write_str("generator_kind", &self.generator_kind);
        writer.write_dictionary("parameters", &self.parameters);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.media.read(reader)?;
        if let Some(kind) = reader.read_string("generator_kind")? {
            self.generator_kind = kind;
        }
        self.parameters = reader.read_dictionary("parameters")?;
        Ok(())
    }

    fn clear_metadata(&mut self) {
        self.meta.metadata.clear();
        self.parameters.clear();
    }
}
