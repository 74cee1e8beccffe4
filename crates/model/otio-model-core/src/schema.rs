//! The `Schema` trait implemented by every concrete object body, plus the
//! field groups shared between schemas.
//!
//! A schema body is a plain struct. Shared state (name and metadata, item
//! trims, effect names, media ranges) lives in small composed field structs
//! that the body exposes through capability accessors, so tree code can ask
//! "is this an item?" without knowing the concrete type.

use std::any::Any;
use std::fmt;

use otio_time_core::{RationalTime, TimeRange};

use crate::dictionary::Dictionary;
use crate::error::{Error, ErrorKind, Result};
use crate::json::{Reader, Writer};
use crate::object::Object;

/// Upcast to `Any` for typed access through `dyn Schema`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn not_implemented(schema: &str, method: &str) -> Error {
    Error::new(
        ErrorKind::NotImplemented,
        format!("{method} is not implemented for {schema}"),
    )
}

/// Behaviour of one concrete schema body.
///
/// The hooks default to the behaviour of the most general schema; variants
/// override only what differs.
pub trait Schema: AsAny + fmt::Debug {
    fn schema_name(&self) -> &str;

    fn schema_version(&self) -> i64;

    /// Write this schema's own fields, in stable order.
    fn write_fields(&self, writer: &mut Writer<'_>);

    /// Consume this schema's own fields; keys left behind become dynamic fields.
    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()>;

    /// `"<Name>.<Version>"` as written to `OTIO_SCHEMA`.
    fn serialized_tag(&self) -> String {
        format!("{}.{}", self.schema_name(), self.schema_version())
    }

    fn meta(&self) -> Option<&ObjectMeta> {
        None
    }

    fn meta_mut(&mut self) -> Option<&mut ObjectMeta> {
        None
    }

    fn is_composable(&self) -> bool {
        false
    }

    fn item(&self) -> Option<&ItemFields> {
        None
    }

    fn item_mut(&mut self) -> Option<&mut ItemFields> {
        None
    }

    /// Owned, parented children. Only compositions return `Some`.
    fn children(&self) -> Option<&[Object]> {
        None
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Object>> {
        None
    }

    fn effect(&self) -> Option<&EffectFields> {
        None
    }

    fn media_reference(&self) -> Option<&MediaReferenceFields> {
        None
    }

    fn visible(&self) -> bool {
        match self.item() {
            Some(item) => item.enabled,
            None => self.is_composable(),
        }
    }

    fn overlapping(&self) -> bool {
        false
    }

    fn available_range(&self) -> Result<TimeRange> {
        if self.item().is_none() {
            return Err(not_an_item(self.schema_name()));
        }
        Err(not_implemented(self.schema_name(), "available_range"))
    }

    fn trimmed_range(&self) -> Result<TimeRange> {
        match self.item() {
            Some(item) => match item.source_range {
                Some(range) => Ok(range),
                None => self.available_range(),
            },
            None => Err(not_an_item(self.schema_name())),
        }
    }

    fn duration(&self) -> Result<RationalTime> {
        if self.item().is_none() {
            return Err(Error::new(
                ErrorKind::ObjectWithoutDuration,
                format!("{} has no duration", self.schema_name()),
            ));
        }
        Ok(self.trimmed_range()?.duration())
    }

    fn range_of_child_at_index(&self, _index: usize) -> Result<TimeRange> {
        Err(not_implemented(self.schema_name(), "range_of_child_at_index"))
    }

    /// `Ok(None)` when the child is trimmed away entirely.
    fn trimmed_range_of_child_at_index(&self, _index: usize) -> Result<Option<TimeRange>> {
        Err(not_implemented(
            self.schema_name(),
            "trimmed_range_of_child_at_index",
        ))
    }

    fn range_of_all_children(&self) -> Result<Vec<(Object, TimeRange)>> {
        Err(not_implemented(self.schema_name(), "range_of_all_children"))
    }

    /// Extra head/tail media implied by neighbouring transitions.
    fn handles_of_child_at_index(
        &self,
        _index: usize,
    ) -> Result<(Option<RationalTime>, Option<RationalTime>)> {
        Ok((None, None))
    }

    /// Drop metadata-like dictionaries. Used to break reference cycles.
    fn clear_metadata(&mut self) {
        if let Some(meta) = self.meta_mut() {
            meta.metadata.clear();
        }
    }
}

/// Static identity of a registrable schema type.
pub trait SchemaType: Schema + Default + 'static {
    const SCHEMA_NAME: &'static str;
    const SCHEMA_VERSION: i64;
}

pub(crate) fn not_an_item(schema: &str) -> Error {
    Error::new(ErrorKind::NotAnItem, format!("{schema} is not an item"))
}

/// `name` and `metadata`, shared by every schema except `SerializableObject`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectMeta {
    pub name: String,
    pub metadata: Dictionary,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Dictionary::new(),
        }
    }

    pub(crate) fn write(&self, writer: &mut Writer<'_>) {
        writer.write_dictionary("metadata", &self.metadata);
        writer.write_str("name", &self.name);
    }

    pub(crate) fn read(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.metadata = reader.read_dictionary("metadata")?;
        if let Some(name) = reader.read_string("name")? {
            self.name = name;
        }
        Ok(())
    }
}

/// Trim, effects, markers and the enabled flag of an item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFields {
    pub source_range: Option<TimeRange>,
    pub effects: Vec<Object>,
    pub markers: Vec<Object>,
    pub enabled: bool,
}

impl Default for ItemFields {
    fn default() -> Self {
        Self {
            source_range: None,
            effects: Vec::new(),
            markers: Vec::new(),
            enabled: true,
        }
    }
}

impl ItemFields {
    pub fn with_source_range(source_range: Option<TimeRange>) -> Self {
        Self {
            source_range,
            ..Self::default()
        }
    }

    pub(crate) fn write(&self, writer: &mut Writer<'_>) {
        match self.source_range {
            Some(range) => writer.write_range("source_range", range),
            None => writer.write_null("source_range"),
        }
        writer.write_objects("effects", &self.effects);
        writer.write_objects("markers", &self.markers);
        writer.write_bool("enabled", self.enabled);
    }

    pub(crate) fn read(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.source_range = reader.read_range("source_range")?;
        self.effects = reader.read_objects("effects")?;
        self.markers = reader.read_objects("markers")?;
        if let Some(enabled) = reader.read_bool("enabled")? {
            self.enabled = enabled;
        }
        for effect in &self.effects {
            check_effect(effect)?;
        }
        for marker in &self.markers {
            check_marker(marker)?;
        }
        Ok(())
    }
}

pub(crate) fn check_effect(object: &Object) -> Result<()> {
    if object.is_effect() || object.is_unknown_schema() {
        return Ok(());
    }
    Err(Error::new(
        ErrorKind::TypeMismatch,
        format!("expected an effect, found {}", object.schema_name()),
    ))
}

pub(crate) fn check_marker(object: &Object) -> Result<()> {
    if object.is::<crate::schemas::Marker>() || object.is_unknown_schema() {
        return Ok(());
    }
    Err(Error::new(
        ErrorKind::TypeMismatch,
        format!("expected a marker, found {}", object.schema_name()),
    ))
}

/// Shared by the effect family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectFields {
    pub effect_name: String,
}

impl EffectFields {
    pub(crate) fn write(&self, writer: &mut Writer<'_>) {
        writer.write_str("effect_name", &self.effect_name);
    }

    pub(crate) fn read(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        if let Some(name) = reader.read_string("effect_name")? {
            self.effect_name = name;
        }
        Ok(())
    }
}

/// Shared by the media reference family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaReferenceFields {
    pub available_range: Option<TimeRange>,
}

impl MediaReferenceFields {
    pub(crate) fn write(&self, writer: &mut Writer<'_>) {
        match self.available_range {
            Some(range) => writer.write_range("available_range", range),
            None => writer.write_null("available_range"),
        }
    }

    pub(crate) fn read(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.available_range = reader.read_range("available_range")?;
        Ok(())
    }
}

/// Clip `child` against an optional parent trim. `None` when nothing is left.
pub(crate) fn trim_child_range(
    source_range: Option<TimeRange>,
    child: TimeRange,
) -> Option<TimeRange> {
    let Some(trim) = source_range else {
        return Some(child);
    };
    let trim_end = trim.end_time_exclusive();
    let child_end = child.end_time_exclusive();
    if child.start_time() >= trim_end || child_end <= trim.start_time() {
        return None;
    }
    let mut out = child;
    if out.start_time() < trim.start_time() {
        out = TimeRange::range_from_start_end_time(trim.start_time(), out.end_time_exclusive());
    }
    if out.end_time_exclusive() > trim_end {
        out = TimeRange::range_from_start_end_time(out.start_time(), trim_end);
    }
    Some(out)
}

/// Implements the capability accessors for a body with `meta` and `item`
/// fields.
macro_rules! item_accessors {
    () => {
        fn meta(&self) -> Option<&$crate::schema::ObjectMeta> {
            Some(&self.meta)
        }

        fn meta_mut(&mut self) -> Option<&mut $crate::schema::ObjectMeta> {
            Some(&mut self.meta)
        }

        fn is_composable(&self) -> bool {
            true
        }

        fn item(&self) -> Option<&$crate::schema::ItemFields> {
            Some(&self.item)
        }

        fn item_mut(&mut self) -> Option<&mut $crate::schema::ItemFields> {
            Some(&mut self.item)
        }
    };
}

/// Accessors for bodies that only carry `meta`.
macro_rules! meta_accessors {
    () => {
        fn meta(&self) -> Option<&$crate::schema::ObjectMeta> {
            Some(&self.meta)
        }

        fn meta_mut(&mut self) -> Option<&mut $crate::schema::ObjectMeta> {
            Some(&mut self.meta)
        }
    };
}

/// Accessors for compositions: item accessors plus `children`.
macro_rules! composition_accessors {
    () => {
        $crate::schema::item_accessors!();

        fn children(&self) -> Option<&[$crate::object::Object]> {
            Some(&self.children)
        }

        fn children_mut(&mut self) -> Option<&mut Vec<$crate::object::Object>> {
            Some(&mut self.children)
        }
    };
}

/// `SchemaType` plus the name/version half of `Schema`.
macro_rules! schema_type {
    ($ty:ty, $name:literal, $version:literal) => {
        impl $crate::schema::SchemaType for $ty {
            const SCHEMA_NAME: &'static str = $name;
            const SCHEMA_VERSION: i64 = $version;
        }
    };
}

macro_rules! schema_identity {
    () => {
        fn schema_name(&self) -> &str {
            <Self as $crate::schema::SchemaType>::SCHEMA_NAME
        }

        fn schema_version(&self) -> i64 {
            <Self as $crate::schema::SchemaType>::SCHEMA_VERSION
        }
    };
}

pub(crate) use {
    composition_accessors, item_accessors, meta_accessors, schema_identity, schema_type,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: f64, duration: f64) -> TimeRange {
        TimeRange::new(RationalTime::new(start, 24.0), RationalTime::new(duration, 24.0))
    }

    #[test]
    fn untrimmed_child_is_unchanged() {
        assert_eq!(trim_child_range(None, range(5.0, 10.0)), Some(range(5.0, 10.0)));
    }

    #[test]
    fn child_outside_trim_is_dropped() {
        let trim = Some(range(10.0, 10.0));
        assert_eq!(trim_child_range(trim, range(0.0, 10.0)), None);
        assert_eq!(trim_child_range(trim, range(20.0, 5.0)), None);
    }

    #[test]
    fn child_is_clipped_on_both_sides() {
        let trim = Some(range(10.0, 10.0));
        assert_eq!(trim_child_range(trim, range(5.0, 10.0)), Some(range(10.0, 5.0)));
        assert_eq!(trim_child_range(trim, range(15.0, 10.0)), Some(range(15.0, 5.0)));
        assert_eq!(trim_child_range(trim, range(0.0, 40.0)), Some(range(10.0, 10.0)));
    }
}
