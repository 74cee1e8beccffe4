use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{
    composition_accessors, schema_identity, schema_type, trim_child_range, ItemFields, ObjectMeta,
    Schema,
};

use super::Transition;

pub mod kind {
    pub const VIDEO: &str = "Video";
    pub const AUDIO: &str = "Audio";
}

pub(crate) fn illegal_index(index: usize, len: usize) -> Error {
    Error::new(
        ErrorKind::IllegalIndex,
        format!("index {index} out of range for {len} children"),
    )
}

/// Children laid end to end along the time axis.
///
/// Transitions overlap their neighbours: they do not advance the running
/// start, and a transition's own range starts `in_offset` before the cut.
#[derive(Debug)]
pub struct Track {
    pub meta: ObjectMeta,
    pub item: ItemFields,
    pub children: Vec<Object>,
    pub kind: String,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            item: ItemFields::default(),
            children: Vec::new(),
            kind: kind::VIDEO.to_string(),
        }
    }
}

schema_type!(Track, "Track", 1);

impl Track {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            ..Self::default()
        }
    }

    pub fn with_kind(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            kind: kind.into(),
            ..Self::default()
        }
    }

    fn child(&self, index: usize) -> Result<&Object> {
        self.children
            .get(index)
            .ok_or_else(|| illegal_index(index, self.children.len()))
    }
}

impl Schema for Track {
    schema_identity!();
    composition_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        self.item.write(writer);
        writer.write_objects("children", &self.children);
        writer.write_str("kind", &self.kind);
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.item.read(reader)?;
        self.children = reader.read_objects("children")?;
        if let Some(kind) = reader.read_string("kind")? {
            self.kind = kind;
        }
        Ok(())
    }

    fn available_range(&self) -> Result<TimeRange> {
        let mut total: Option<RationalTime> = None;
        for child in &self.children {
            if child.is_item() {
                let duration = child.duration()?;
                total = Some(match total {
                    Some(acc) => acc + duration,
                    None => duration,
                });
            }
        }
        let mut duration = total.unwrap_or_default();
        if let Some(first) = self.children.first().and_then(|c| c.downcast_ref::<Transition>()) {
            duration += first.in_offset;
        }
        if let Some(last) = self.children.last().and_then(|c| c.downcast_ref::<Transition>()) {
            duration += last.out_offset;
        }
        Ok(TimeRange::new(
            RationalTime::new(0.0, duration.rate()),
            duration,
        ))
    }

    fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        let child = self.child(index)?;
        let duration = child.duration()?;
        let mut start = RationalTime::new(0.0, duration.rate());
        for sibling in &self.children[..index] {
            if !sibling.overlapping() {
                start += sibling.duration()?;
            }
        }
        if let Some(transition) = child.downcast_ref::<Transition>() {
            start -= transition.in_offset;
        }
        Ok(TimeRange::new(start, duration))
    }

    fn trimmed_range_of_child_at_index(&self, index: usize) -> Result<Option<TimeRange>> {
        let range = self.range_of_child_at_index(index)?;
        Ok(trim_child_range(self.item.source_range, range))
    }

    fn range_of_all_children(&self) -> Result<Vec<(Object, TimeRange)>> {
        let Some(first) = self.children.first() else {
            return Ok(Vec::new());
        };
        let mut last_end = RationalTime::new(0.0, first.duration()?.rate());
        let mut out = Vec::with_capacity(self.children.len());
        for child in &self.children {
            if let Some(transition) = child.downcast_ref::<Transition>() {
                let range = TimeRange::new(
                    last_end - transition.in_offset,
                    transition.in_offset + transition.out_offset,
                );
                out.push((child.clone(), range));
            } else if child.is_item() {
                let duration = child.trimmed_range()?.duration();
                out.push((child.clone(), TimeRange::new(last_end, duration)));
                last_end += duration;
            } else {
                return Err(Error::new(
                    ErrorKind::NotAnItem,
                    format!("{child:?} is neither an item nor a transition"),
                ));
            }
        }
        Ok(out)
    }

    fn handles_of_child_at_index(
        &self,
        index: usize,
    ) -> Result<(Option<RationalTime>, Option<RationalTime>)> {
        self.child(index)?;
        let head = index
            .checked_sub(1)
            .and_then(|prev| self.children[prev].downcast_ref::<Transition>().map(|t| t.in_offset));
        let tail = self
            .children
            .get(index + 1)
            .and_then(|next| next.downcast_ref::<Transition>().map(|t| t.out_offset));
        Ok((head, tail))
    }
}
