use otio_time_core::{RationalTime, TimeRange};

use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{composition_accessors, schema_identity, schema_type, ItemFields, ObjectMeta, Schema};

use super::track::illegal_index;

/// Children layered at the same start time; later children are on top.
#[derive(Debug, Default)]
pub struct Stack {
    pub meta: ObjectMeta,
    pub item: ItemFields,
    pub children: Vec<Object>,
}

schema_type!(Stack, "Stack", 1);

impl Stack {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            ..Self::default()
        }
    }
}

impl Schema for Stack {
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

    /// As long as the longest child.
    fn available_range(&self) -> Result<TimeRange> {
        let mut longest: Option<RationalTime> = None;
        for child in &self.children {
            if child.is_item() {
                let duration = child.duration()?;
                longest = Some(match longest {
                    Some(current) => current.max(duration),
                    None => duration,
                });
            }
        }
        let duration = longest.unwrap_or_default();
        Ok(TimeRange::new(
            RationalTime::new(0.0, duration.rate()),
            duration,
        ))
    }

    fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        let child = self
            .children
            .get(index)
            .ok_or_else(|| illegal_index(index, self.children.len()))?;
        let duration = child.duration()?;
        Ok(TimeRange::new(
            RationalTime::new(0.0, duration.rate()),
            duration,
        ))
    }

    fn trimmed_range_of_child_at_index(&self, index: usize) -> Result<Option<TimeRange>> {
        let range = self.range_of_child_at_index(index)?;
        Ok(Some(match self.item.source_range {
            Some(trim) => TimeRange::new(
                trim.start_time(),
                range.duration().min(trim.duration()),
            ),
            None => range,
        }))
    }

    fn range_of_all_children(&self) -> Result<Vec<(Object, TimeRange)>> {
        (0..self.children.len())
            .map(|index| {
                let range = self.range_of_child_at_index(index)?;
                Ok((self.children[index].clone(), range))
            })
            .collect()
    }
}
