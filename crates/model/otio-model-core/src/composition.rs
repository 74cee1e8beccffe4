//! Composition operations on [`Object`] handles: child ownership and the
//! range queries that depend on a child's position in its parent.
//!
//! Every mutation validates fully before touching the tree, so a failed call
//! leaves the composition unchanged.

use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schemas::illegal_index;

fn not_a_composition(object: &Object) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("{} is not a composition", object.schema_name()),
    )
}

fn not_a_child_of(child: &Object, parent: &Object) -> Error {
    Error::new(
        ErrorKind::NotAChildOf,
        format!("{child:?} is not a child of {parent:?}"),
    )
}

impl Object {
    fn child_count(&self) -> Result<usize> {
        self.body()
            .children()
            .map(<[Object]>::len)
            .ok_or_else(|| not_a_composition(self))
    }

    /// Checks that `child` may become a child of `self`.
    fn check_adoptable(&self, child: &Object) -> Result<()> {
        if !child.is_composable() {
            return Err(Error::new(
                ErrorKind::TypeMismatch,
                format!("{} is not composable", child.schema_name()),
            ));
        }
        if child.parent().is_some() {
            return Err(Error::new(
                ErrorKind::ChildAlreadyParented,
                format!("{child:?} already has a parent"),
            ));
        }
        if child.is_self_or_ancestor_of(self) {
            return Err(Error::new(
                ErrorKind::ChildAlreadyParented,
                format!("{child:?} cannot be its own descendant"),
            ));
        }
        Ok(())
    }

    /// Children of a composition, in order. Empty for anything else.
    pub fn children(&self) -> Vec<Object> {
        self.body()
            .children()
            .map(<[Object]>::to_vec)
            .unwrap_or_default()
    }

    pub fn child_at(&self, index: usize) -> Result<Object> {
        let body = self.body();
        let children = body.children().ok_or_else(|| not_a_composition(self))?;
        children
            .get(index)
            .cloned()
            .ok_or_else(|| illegal_index(index, children.len()))
    }

    pub fn append_child(&self, child: &Object) -> Result<()> {
        let len = self.child_count()?;
        self.insert_child(len, child)
    }

    /// Insert at `index` in `[0, len]`.
    pub fn insert_child(&self, index: usize, child: &Object) -> Result<()> {
        let len = self.child_count()?;
        if index > len {
            return Err(illegal_index(index, len));
        }
        self.check_adoptable(child)?;
        if let Some(children) = self.body_mut().children_mut() {
            children.insert(index, child.clone());
        }
        child.set_parent(Some(self));
        Ok(())
    }

    /// Replace the child at `index`; the previous child is unparented.
    pub fn set_child(&self, index: usize, child: &Object) -> Result<()> {
        let current = self.child_at(index)?;
        if current.ptr_eq(child) {
            return Ok(());
        }
        self.check_adoptable(child)?;
        if let Some(children) = self.body_mut().children_mut() {
            children[index] = child.clone();
        }
        current.set_parent(None);
        child.set_parent(Some(self));
        Ok(())
    }

    pub fn remove_child(&self, index: usize) -> Result<Object> {
        let len = self.child_count()?;
        if index >= len {
            return Err(illegal_index(index, len));
        }
        let removed = self
            .body_mut()
            .children_mut()
            .map(|children| children.remove(index));
        let Some(removed) = removed else {
            return Err(not_a_composition(self));
        };
        removed.set_parent(None);
        Ok(removed)
    }

    /// Unparent and drop every child. A no-op on non-compositions.
    pub fn clear_children(&self) {
        let removed = match self.body_mut().children_mut() {
            Some(children) => std::mem::take(children),
            None => return,
        };
        for child in removed {
            child.set_parent(None);
        }
    }

    /// Replace all children at once. Fails without changes if any new child
    /// is unacceptable or appears twice.
    pub fn set_children(&self, children: Vec<Object>) -> Result<()> {
        let current = self.children();
        self.child_count()?;
        for (i, child) in children.iter().enumerate() {
            if children[..i].iter().any(|c| c.ptr_eq(child)) {
                return Err(Error::new(
                    ErrorKind::ChildAlreadyParented,
                    format!("{child:?} appears twice"),
                ));
            }
            let already_ours = current.iter().any(|c| c.ptr_eq(child));
            if !already_ours {
                self.check_adoptable(child)?;
            }
        }
        self.clear_children();
        for child in &children {
            child.set_parent(Some(self));
        }
        if let Some(slot) = self.body_mut().children_mut() {
            *slot = children;
        }
        Ok(())
    }

    pub fn index_of_child(&self, child: &Object) -> Result<usize> {
        let body = self.body();
        let children = body.children().ok_or_else(|| not_a_composition(self))?;
        children
            .iter()
            .position(|c| c.ptr_eq(child))
            .ok_or_else(|| not_a_child_of(child, self))
    }

    /// True when `other` is anywhere below `self`.
    pub fn is_parent_of(&self, other: &Object) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Compositions from `child`'s parent up to and including `self`.
    fn path_from_child(&self, child: &Object) -> Result<Vec<Object>> {
        let mut path = Vec::new();
        let mut current = child.parent();
        while let Some(node) = current {
            let done = node.ptr_eq(self);
            current = node.parent();
            path.push(node);
            if done {
                return Ok(path);
            }
        }
        Err(not_a_child_of(child, self))
    }

    pub fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        self.body().range_of_child_at_index(index)
    }

    pub fn trimmed_range_of_child_at_index(&self, index: usize) -> Result<Option<TimeRange>> {
        self.body().trimmed_range_of_child_at_index(index)
    }

    /// Range of a descendant in this composition's time.
    pub fn range_of_child(&self, child: &Object) -> Result<TimeRange> {
        let mut current = child.clone();
        let mut result: Option<TimeRange> = None;
        for parent in self.path_from_child(child)? {
            let index = parent.index_of_child(&current)?;
            let range = parent.range_of_child_at_index(index)?;
            result = Some(match result {
                None => range,
                Some(inner) => TimeRange::new(
                    inner.start_time() + range.start_time(),
                    inner.duration(),
                ),
            });
            current = parent;
        }
        result.ok_or_else(|| not_a_child_of(child, self))
    }

    /// Like [`Object::range_of_child`], additionally clipped by every trim on
    /// the way up. `None` when the descendant is trimmed out of view.
    pub fn trimmed_range_of_child(&self, child: &Object) -> Result<Option<TimeRange>> {
        let mut current = child.clone();
        let mut result: Option<TimeRange> = None;
        for parent in self.path_from_child(child)? {
            let index = parent.index_of_child(&current)?;
            let Some(range) = parent.trimmed_range_of_child_at_index(index)? else {
                return Ok(None);
            };
            result = Some(match result {
                None => range,
                Some(inner) => TimeRange::new(
                    inner.start_time() + range.start_time(),
                    inner.duration(),
                ),
            });
            current = parent;
        }
        let Some(range) = result else {
            return Err(not_a_child_of(child, self));
        };
        let Some(trim) = self.source_range() else {
            return Ok(Some(range));
        };
        let start = trim.start_time().max(range.start_time());
        let end = trim.end_time_exclusive().min(range.end_time_exclusive());
        if end < start {
            return Ok(None);
        }
        Ok(Some(TimeRange::range_from_start_end_time(start, end)))
    }

    /// Transition handles around a direct child.
    pub fn handles_of_child(
        &self,
        child: &Object,
    ) -> Result<(Option<RationalTime>, Option<RationalTime>)> {
        let index = self.index_of_child(child)?;
        self.body().handles_of_child_at_index(index)
    }

    /// Every direct child with its range, in order.
    pub fn range_of_all_children(&self) -> Result<Vec<(Object, TimeRange)>> {
        self.body().range_of_all_children()
    }

    /// Children whose trimmed range contains `time`; nested compositions are
    /// searched too unless `shallow`.
    pub fn children_at_time(&self, time: RationalTime, shallow: bool) -> Result<Vec<Object>> {
        let mut out = Vec::new();
        for (index, child) in self.children().into_iter().enumerate() {
            let Some(range) = self.trimmed_range_of_child_at_index(index)? else {
                continue;
            };
            if !range.contains_time(time) {
                continue;
            }
            out.push(child.clone());
            if shallow || !child.is_composition() {
                continue;
            }
            let local = time - range.start_time() + child.trimmed_range()?.start_time();
            out.extend(child.children_at_time(local, false)?);
        }
        Ok(out)
    }

    /// Descendants matching `predicate`, depth first in child order.
    pub fn find_children(&self, predicate: &dyn Fn(&Object) -> bool, shallow: bool) -> Vec<Object> {
        let mut out = Vec::new();
        for child in self.children() {
            if predicate(&child) {
                out.push(child.clone());
            }
            if !shallow && child.is_composition() {
                out.extend(child.find_children(predicate, false));
            }
        }
        out
    }

    pub fn find_clips(&self, shallow: bool) -> Vec<Object> {
        self.find_children(&|child| child.is::<crate::schemas::Clip>(), shallow)
    }
}
