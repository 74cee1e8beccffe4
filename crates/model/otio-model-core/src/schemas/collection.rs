use hashbrown::HashSet;

use crate::error::Result;
use crate::ids::ObjectId;
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{meta_accessors, schema_identity, schema_type, ObjectMeta, Schema};

use super::track::illegal_index;
use super::Clip;

/// An ordered bag of arbitrary objects, typically timelines.
///
/// Unlike a composition it does not parent its children and has no timing.
#[derive(Debug, Default)]
pub struct SerializableCollection {
    pub meta: ObjectMeta,
    children: Vec<Object>,
}

schema_type!(SerializableCollection, "SerializableCollection", 1);

impl SerializableCollection {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Object] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn push(&mut self, child: Object) {
        self.children.push(child);
    }

    pub fn insert(&mut self, index: usize, child: Object) -> Result<()> {
        if index > self.children.len() {
            return Err(illegal_index(index, self.children.len()));
        }
        self.children.insert(index, child);
        Ok(())
    }

    pub fn set(&mut self, index: usize, child: Object) -> Result<Object> {
        let len = self.children.len();
        let slot = self
            .children
            .get_mut(index)
            .ok_or_else(|| illegal_index(index, len))?;
        Ok(std::mem::replace(slot, child))
    }

    pub fn remove(&mut self, index: usize) -> Result<Object> {
        if index >= self.children.len() {
            return Err(illegal_index(index, self.children.len()));
        }
        Ok(self.children.remove(index))
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Clips anywhere below this collection, depth first.
    pub fn find_clips(&self) -> Vec<Object> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for child in &self.children {
            collect_clips(child, &mut out, &mut seen);
        }
        out
    }
}

fn collect_clips(object: &Object, out: &mut Vec<Object>, seen: &mut HashSet<ObjectId>) {
    if !seen.insert(object.id()) {
        return;
    }
    if object.is::<Clip>() {
        out.push(object.clone());
        return;
    }
    if object.is_composition() {
        out.extend(object.find_children(&|child| child.is::<Clip>(), false));
        return;
    }
    if let Some(timeline) = object.downcast_ref::<super::Timeline>() {
        out.extend(timeline.find_clips());
        return;
    }
    if let Some(collection) = object.downcast_ref::<SerializableCollection>() {
        for child in &collection.children {
            collect_clips(child, out, seen);
        }
    }
}

impl Schema for SerializableCollection {
    schema_identity!();
    meta_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        writer.write_objects("children", &self.children);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.children = reader.read_objects("children")?;
        Ok(())
    }
}
