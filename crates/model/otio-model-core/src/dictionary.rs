//! Insertion-ordered metadata containers.
//!
//! [`Dictionary`] and [`Vector`] carry a mutation stamp that advances on every
//! structural change (an entry added or removed). Borrowing iterators are
//! checked statically; detached [`Cursor`]s check the stamp on every step and
//! fail with `IllegalIndex` once the container has changed shape.

use indexmap::IndexMap;
use otio_time_core::{RationalTime, TimeRange, TimeTransform};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::value::Value;

/// Detached iteration position over a [`Dictionary`] or [`Vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    stamp: u64,
    position: usize,
}

impl Cursor {
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

fn stale_cursor(container: &str) -> Error {
    Error::new(
        ErrorKind::IllegalIndex,
        format!("{container} was modified during iteration"),
    )
}

fn mismatch(what: &str, expected: &str, value: &Value) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("{what} holds {:?}, expected {expected}", value.kind()),
    )
}

/// String-keyed, insertion-ordered map of metadata values.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    entries: IndexMap<String, Value>,
    stamp: u64,
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances on every structural mutation.
    #[inline]
    pub fn mutation_stamp(&self) -> u64 {
        self.stamp
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Mutable access to an existing value; replacing a value in place is not
    /// a structural change.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or overwrite. New keys are appended at the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.stamp += 1;
        self.entries.insert(key, value);
        None
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.shift_remove(key);
        if removed.is_some() {
            self.stamp += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.stamp += 1;
        self.entries.clear();
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.entries.values()
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            stamp: self.stamp,
            position: 0,
        }
    }

    /// Step a detached cursor. Returns `Ok(None)` at the end.
    pub fn advance(&self, cursor: &mut Cursor) -> Result<Option<(&str, &Value)>> {
        if cursor.stamp != self.stamp {
            return Err(stale_cursor("dictionary"));
        }
        match self.entries.get_index(cursor.position) {
            Some((key, value)) => {
                cursor.position += 1;
                Ok(Some((key.as_str(), value)))
            }
            None => Ok(None),
        }
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.entries.get(key).ok_or_else(|| {
            Error::new(ErrorKind::KeyNotFound, format!("key '{key}' not found"))
        })?;
        extract(value).ok_or_else(|| mismatch(&format!("key '{key}'"), expected, value))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.typed(key, "bool", Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Result<i64> {
        self.typed(key, "int", Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.typed(key, "double", Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.typed(key, "string", Value::as_str)
    }

    pub fn get_time(&self, key: &str) -> Result<RationalTime> {
        self.typed(key, "RationalTime", Value::as_time)
    }

    pub fn get_range(&self, key: &str) -> Result<TimeRange> {
        self.typed(key, "TimeRange", Value::as_range)
    }

    pub fn get_transform(&self, key: &str) -> Result<TimeTransform> {
        self.typed(key, "TimeTransform", Value::as_transform)
    }

    pub fn get_object(&self, key: &str) -> Result<&Object> {
        self.typed(key, "object", Value::as_object)
    }

    pub fn get_dictionary(&self, key: &str) -> Result<&Dictionary> {
        self.typed(key, "dictionary", Value::as_dictionary)
    }

    pub fn get_vector(&self, key: &str) -> Result<&Vector> {
        self.typed(key, "vector", Value::as_vector)
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// Ordered list of metadata values.
#[derive(Clone, Debug, Default)]
pub struct Vector {
    items: Vec<Value>,
    stamp: u64,
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Vector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn mutation_stamp(&self) -> u64 {
        self.stamp
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.stamp += 1;
        self.items.push(value.into());
    }

    /// Insert at `index` in `[0, len]`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index > self.items.len() {
            return Err(self.out_of_range(index));
        }
        self.stamp += 1;
        self.items.insert(index, value.into());
        Ok(())
    }

    /// Replace the value at `index`; not a structural change.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<Value> {
        let len = self.items.len();
        let slot = self.items.get_mut(index).ok_or_else(|| {
            Error::new(
                ErrorKind::IllegalIndex,
                format!("index {index} out of range for vector of length {len}"),
            )
        })?;
        Ok(std::mem::replace(slot, value.into()))
    }

    pub fn remove(&mut self, index: usize) -> Result<Value> {
        if index >= self.items.len() {
            return Err(self.out_of_range(index));
        }
        self.stamp += 1;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.stamp += 1;
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.items.iter_mut()
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            stamp: self.stamp,
            position: 0,
        }
    }

    pub fn advance(&self, cursor: &mut Cursor) -> Result<Option<&Value>> {
        if cursor.stamp != self.stamp {
            return Err(stale_cursor("vector"));
        }
        let item = self.items.get(cursor.position);
        if item.is_some() {
            cursor.position += 1;
        }
        Ok(item)
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::new(
            ErrorKind::IllegalIndex,
            format!(
                "index {index} out of range for vector of length {}",
                self.items.len()
            ),
        )
    }

    fn typed<'a, T>(
        &'a self,
        index: usize,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.items.get(index).ok_or_else(|| self.out_of_range(index))?;
        extract(value).ok_or_else(|| mismatch(&format!("index {index}"), expected, value))
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.typed(index, "bool", Value::as_bool)
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.typed(index, "int", Value::as_i64)
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.typed(index, "double", Value::as_f64)
    }

    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.typed(index, "string", Value::as_str)
    }

    pub fn get_object(&self, index: usize) -> Result<&Object> {
        self.typed(index, "object", Value::as_object)
    }

    pub fn get_dictionary(&self, index: usize) -> Result<&Dictionary> {
        self.typed(index, "dictionary", Value::as_dictionary)
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for Vector {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Vector {
            items: iter.into_iter().map(Into::into).collect(),
            stamp: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let mut d = Dictionary::new();
        d.insert("zeta", 1);
        d.insert("alpha", 2);
        d.insert("mid", 3);
        let keys: Vec<&str> = d.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        d.remove("alpha");
        d.insert("alpha", 4);
        let keys: Vec<&str> = d.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "mid", "alpha"]);
    }

    #[test]
    fn overwrite_is_not_structural() {
        let mut d = Dictionary::new();
        d.insert("a", 1);
        let stamp = d.mutation_stamp();
        assert_eq!(d.insert("a", 2), Some(Value::Int(1)));
        assert_eq!(d.mutation_stamp(), stamp);
        d.insert("b", 1);
        assert_ne!(d.mutation_stamp(), stamp);
    }

    #[test]
    fn cursor_fails_fast_after_mutation() {
        let mut d: Dictionary = [("a", 1), ("b", 2)].into_iter().collect();
        let mut cursor = d.cursor();
        let (key, _) = d.advance(&mut cursor).unwrap().unwrap();
        assert_eq!(key, "a");

        d.insert("c", 3);
        let err = d.advance(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalIndex);

        let mut fresh = d.cursor();
        let mut seen = 0;
        while let Some(_) = d.advance(&mut fresh).unwrap() {
            seen += 1;
        }
        assert_eq!(seen, 3);
    }

    #[test]
    fn typed_getters_report_kind() {
        let mut d = Dictionary::new();
        d.insert("name", "clip");
        d.insert("count", 3);
        assert_eq!(d.get_str("name").unwrap(), "clip");
        assert_eq!(d.get_i64("count").unwrap(), 3);
        assert_eq!(d.get_f64("count").unwrap(), 3.0);
        assert_eq!(d.get_bool("name").unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(d.get_str("missing").unwrap_err().kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn vector_bounds() {
        let mut v: Vector = vec![1, 2, 3].into_iter().collect();
        assert_eq!(v.insert(4, 9).unwrap_err().kind(), ErrorKind::IllegalIndex);
        v.insert(3, 4).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v.remove(0).unwrap(), Value::Int(1));
        assert_eq!(v.remove(10).unwrap_err().kind(), ErrorKind::IllegalIndex);
        assert_eq!(v.get_i64(0).unwrap(), 2);
        assert_eq!(v.get_str(0).unwrap_err().kind(), ErrorKind::TypeMismatch);

        let mut cursor = v.cursor();
        assert_eq!(v.advance(&mut cursor).unwrap(), Some(&Value::Int(2)));
        v.push(5);
        assert!(v.advance(&mut cursor).is_err());
    }

    #[test]
    fn nested_containers() {
        let mut inner = Dictionary::new();
        inner.insert("rate", 24.0);
        let mut outer = Dictionary::new();
        outer.insert("inner", inner);
        outer
            .get_mut("inner")
            .and_then(Value::as_dictionary_mut)
            .unwrap()
            .insert("fps", 25);
        assert_eq!(
            outer.get_dictionary("inner").unwrap().get_i64("fps").unwrap(),
            25
        );
    }
}
