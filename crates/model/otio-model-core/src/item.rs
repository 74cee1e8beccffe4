//! Item time queries on [`Object`] handles, and mapping times between the
//! local coordinate spaces of items in the same tree.

use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;

fn not_a_child(object: &Object) -> Error {
    Error::new(ErrorKind::NotAChild, format!("{object:?} has no parent"))
}

impl Object {
    /// Everything the underlying media or children could supply.
    pub fn available_range(&self) -> Result<TimeRange> {
        self.body().available_range()
    }

    /// The source range if set, otherwise the available range.
    pub fn trimmed_range(&self) -> Result<TimeRange> {
        self.body().trimmed_range()
    }

    pub fn duration(&self) -> Result<RationalTime> {
        self.body().duration()
    }

    /// Trimmed range widened by the handles of neighbouring transitions.
    pub fn visible_range(&self) -> Result<TimeRange> {
        let mut range = self.trimmed_range()?;
        let Some(parent) = self.parent() else {
            return Ok(range);
        };
        let (head, tail) = parent.handles_of_child(self)?;
        if let Some(head) = head {
            range = TimeRange::new(range.start_time() - head, range.duration() + head);
        }
        if let Some(tail) = tail {
            range = TimeRange::new(range.start_time(), range.duration() + tail);
        }
        Ok(range)
    }

    pub fn range_in_parent(&self) -> Result<TimeRange> {
        let parent = self.parent().ok_or_else(|| not_a_child(self))?;
        parent.range_of_child(self)
    }

    /// `None` when the parent's trim hides this object entirely.
    pub fn trimmed_range_in_parent(&self) -> Result<Option<TimeRange>> {
        let parent = self.parent().ok_or_else(|| not_a_child(self))?;
        parent.trimmed_range_of_child(self)
    }

    /// The root of this object's tree; the object itself when unparented.
    pub fn highest_ancestor(&self) -> Object {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Map `time` from this item's local time into `to_item`'s local time.
    pub fn transformed_time(&self, time: RationalTime, to_item: &Object) -> Result<RationalTime> {
        let root = self.highest_ancestor();
        if !root.ptr_eq(&to_item.highest_ancestor()) {
            return Err(Error::new(
                ErrorKind::NotDescendedFrom,
                format!("{self:?} and {to_item:?} are in different trees"),
            ));
        }

        let mut result = time;
        let mut item = self.clone();
        while !item.ptr_eq(&root) && !item.ptr_eq(to_item) {
            let parent = item.parent().ok_or_else(|| not_a_child(&item))?;
            result -= item.trimmed_range()?.start_time();
            result += parent.range_of_child(&item)?.start_time();
            item = parent;
        }

        let ancestor = item;
        let mut item = to_item.clone();
        while !item.ptr_eq(&root) && !item.ptr_eq(&ancestor) {
            let parent = item.parent().ok_or_else(|| not_a_child(&item))?;
            result += item.trimmed_range()?.start_time();
            result -= parent.range_of_child(&item)?.start_time();
            item = parent;
        }
        Ok(result)
    }

    /// Start time mapped as by [`Object::transformed_time`]; duration kept.
    pub fn transformed_time_range(&self, range: TimeRange, to_item: &Object) -> Result<TimeRange> {
        Ok(TimeRange::new(
            self.transformed_time(range.start_time(), to_item)?,
            range.duration(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Clip, ExternalReference, Gap, Track};

    fn rt(value: f64) -> RationalTime {
        RationalTime::new(value, 24.0)
    }

    #[test]
    fn clip_ranges_follow_media_and_trim() {
        let media = Object::new(ExternalReference::new(
            "file:///a.mov",
            Some(TimeRange::new(rt(10.0), rt(100.0))),
        ));
        let clip = Object::new(Clip::new("a", Some(media), None).unwrap());
        assert_eq!(clip.available_range().unwrap(), TimeRange::new(rt(10.0), rt(100.0)));
        assert_eq!(clip.trimmed_range().unwrap(), TimeRange::new(rt(10.0), rt(100.0)));

        clip.set_source_range(Some(TimeRange::new(rt(20.0), rt(5.0))))
            .unwrap();
        assert_eq!(clip.duration().unwrap(), rt(5.0));
    }

    #[test]
    fn unparented_item_has_no_range_in_parent() {
        let gap = Object::new(Gap::with_duration(rt(5.0)));
        assert_eq!(gap.range_in_parent().unwrap_err().kind(), ErrorKind::NotAChild);
        assert!(gap.highest_ancestor().ptr_eq(&gap));
    }

    #[test]
    fn unrelated_items_cannot_map_time() {
        let a = Object::new(Track::default());
        let b = Object::new(Track::default());
        let err = a.transformed_time(rt(0.0), &b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotDescendedFrom);
    }
}
