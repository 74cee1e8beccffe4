//! The abstract levels of the hierarchy, registered so documents that name
//! them directly still load.

use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{
    composition_accessors, item_accessors, meta_accessors, schema_identity, schema_type,
    ItemFields, ObjectMeta, Schema,
};

/// A bare object with no fields of its own.
#[derive(Debug, Default)]
pub struct SerializableObject;

schema_type!(SerializableObject, "SerializableObject", 1);

impl Schema for SerializableObject {
    schema_identity!();

    fn write_fields(&self, _writer: &mut Writer<'_>) {}

    fn read_fields(&mut self, _reader: &mut Reader<'_, '_>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SerializableObjectWithMetadata {
    pub meta: ObjectMeta,
}

schema_type!(
    SerializableObjectWithMetadata,
    "SerializableObjectWithMetadata",
    1
);

impl SerializableObjectWithMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
        }
    }
}

impl Schema for SerializableObjectWithMetadata {
    schema_identity!();
    meta_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)
    }
}

/// Something that may sit inside a composition but has no time range.
#[derive(Debug, Default)]
pub struct Composable {
    pub meta: ObjectMeta,
}

schema_type!(Composable, "Composable", 1);

impl Schema for Composable {
    schema_identity!();
    meta_accessors!();

    fn is_composable(&self) -> bool {
        true
    }

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)
    }
}

/// An item without media; its available range is not defined.
#[derive(Debug, Default)]
pub struct Item {
    pub meta: ObjectMeta,
    pub item: ItemFields,
}

schema_type!(Item, "Item", 1);

impl Schema for Item {
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
}

/// A composition with no layout rule. Range queries are not implemented.
#[derive(Debug, Default)]
pub struct Composition {
    pub meta: ObjectMeta,
    pub item: ItemFields,
    pub children: Vec<Object>,
}

schema_type!(Composition, "Composition", 1);

impl Schema for Composition {
    schema_identity!();
    composition_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.item.write(writer);
        writer.write_objects("children", &self.children);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.item.read(reader)?;
        self.children = reader.read_objects("children")?;
        Ok(())
    }
}
