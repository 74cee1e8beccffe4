//! Shared object handles.
//!
//! An [`Object`] is a reference-counted handle to one node of the object graph.
//! Cloning the handle shares identity; [`Object::deep_clone`] produces a new,
//! independent graph. Parent links are weak and only set by the composition
//! mutation API, so the owning direction of the tree is always child-ward.
//!
//! Handles are `!Send`: a graph lives on one thread.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashSet;
use otio_time_core::TimeRange;

use crate::dictionary::Dictionary;
use crate::error::{Error, ErrorKind, Result};
use crate::ids::ObjectId;
use crate::json;
use crate::schema::{check_effect, check_marker, not_an_item, Schema};
use crate::schemas::UnknownSchema;

struct Node {
    id: ObjectId,
    parent: RefCell<Weak<Node>>,
    dynamic_fields: RefCell<Dictionary>,
    body: RefCell<Box<dyn Schema>>,
}

/// Strong handle to a schema object.
#[derive(Clone)]
pub struct Object(Rc<Node>);

/// Non-owning handle, used for parent back-references.
#[derive(Clone, Default)]
pub struct WeakObject(Weak<Node>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "WeakObject({object:?})"),
            None => f.write_str("WeakObject(<dropped>)"),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies may reference each other cyclically; print identity only.
        let Ok(body) = self.0.body.try_borrow() else {
            return write!(f, "<busy>#{}", self.0.id.0);
        };
        let name = body.meta().map(|m| m.name.as_str()).unwrap_or("");
        write!(
            f,
            "{}#{}({:?})",
            body.serialized_tag(),
            self.0.id.0,
            name
        )
    }
}

impl<T: Schema + 'static> From<T> for Object {
    fn from(body: T) -> Self {
        Object::new(body)
    }
}

impl Object {
    pub fn new<T: Schema + 'static>(body: T) -> Self {
        Self::from_boxed(Box::new(body))
    }

    pub fn from_boxed(body: Box<dyn Schema>) -> Self {
        Object(Rc::new(Node {
            id: ObjectId::next(),
            parent: RefCell::new(Weak::new()),
            dynamic_fields: RefCell::new(Dictionary::new()),
            body: RefCell::new(body),
        }))
    }

    /// Empty node whose body is filled in later by the decoder.
    pub(crate) fn placeholder() -> Self {
        Self::new(UnknownSchema::default())
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub fn schema_name(&self) -> String {
        self.0.body.borrow().schema_name().to_string()
    }

    pub fn schema_version(&self) -> i64 {
        self.0.body.borrow().schema_version()
    }

    pub fn is_unknown_schema(&self) -> bool {
        self.is::<UnknownSchema>()
    }

    pub fn body(&self) -> Ref<'_, dyn Schema> {
        Ref::map(self.0.body.borrow(), |b| &**b)
    }

    pub fn body_mut(&self) -> RefMut<'_, dyn Schema> {
        RefMut::map(self.0.body.borrow_mut(), |b| &mut **b)
    }

    pub(crate) fn replace_body(&self, body: Box<dyn Schema>) {
        *self.0.body.borrow_mut() = body;
    }

    pub fn is<T: Schema + 'static>(&self) -> bool {
        (**self.0.body.borrow()).as_any().is::<T>()
    }

    /// Typed view of the body, if it is a `T`.
    pub fn downcast_ref<T: Schema + 'static>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.0.body.borrow(), |b| (**b).as_any().downcast_ref::<T>()).ok()
    }

    pub fn downcast_mut<T: Schema + 'static>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.0.body.borrow_mut(), |b| {
            (**b).as_any_mut().downcast_mut::<T>()
        })
        .ok()
    }

    pub fn name(&self) -> String {
        self.0
            .body
            .borrow()
            .meta()
            .map(|m| m.name.clone())
            .unwrap_or_default()
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        let mut body = self.0.body.borrow_mut();
        let schema = body.schema_name().to_string();
        let meta = body.meta_mut().ok_or_else(|| {
            Error::new(
                ErrorKind::TypeMismatch,
                format!("{schema} carries no name or metadata"),
            )
        })?;
        meta.name = name.into();
        Ok(())
    }

    pub fn metadata(&self) -> Option<Ref<'_, Dictionary>> {
        Ref::filter_map(self.0.body.borrow(), |b| b.meta().map(|m| &m.metadata)).ok()
    }

    pub fn metadata_mut(&self) -> Option<RefMut<'_, Dictionary>> {
        RefMut::filter_map(self.0.body.borrow_mut(), |b| {
            b.meta_mut().map(|m| &mut m.metadata)
        })
        .ok()
    }

    /// Fields present in the source document but not known to the schema.
    pub fn dynamic_fields(&self) -> Ref<'_, Dictionary> {
        self.0.dynamic_fields.borrow()
    }

    pub fn dynamic_fields_mut(&self) -> RefMut<'_, Dictionary> {
        self.0.dynamic_fields.borrow_mut()
    }

    pub fn parent(&self) -> Option<Object> {
        self.0.parent.borrow().upgrade().map(Object)
    }

    pub(crate) fn set_parent(&self, parent: Option<&Object>) {
        *self.0.parent.borrow_mut() = match parent {
            Some(p) => Rc::downgrade(&p.0),
            None => Weak::new(),
        };
    }

    /// True when `self` is `other` or one of its ancestors.
    pub(crate) fn is_self_or_ancestor_of(&self, other: &Object) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn is_composable(&self) -> bool {
        self.0.body.borrow().is_composable()
    }

    pub fn is_item(&self) -> bool {
        self.0.body.borrow().item().is_some()
    }

    pub fn is_composition(&self) -> bool {
        self.0.body.borrow().children().is_some()
    }

    pub fn is_effect(&self) -> bool {
        self.0.body.borrow().effect().is_some()
    }

    pub fn is_media_reference(&self) -> bool {
        self.0.body.borrow().media_reference().is_some()
    }

    pub fn visible(&self) -> bool {
        self.0.body.borrow().visible()
    }

    pub fn overlapping(&self) -> bool {
        self.0.body.borrow().overlapping()
    }

    pub fn source_range(&self) -> Option<TimeRange> {
        self.0
            .body
            .borrow()
            .item()
            .and_then(|item| item.source_range)
    }

    pub fn set_source_range(&self, range: Option<TimeRange>) -> Result<()> {
        self.with_item_mut(|item| item.source_range = range)
    }

    pub fn enabled(&self) -> bool {
        self.0.body.borrow().item().is_some_and(|item| item.enabled)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.with_item_mut(|item| item.enabled = enabled)
    }

    pub fn effects(&self) -> Vec<Object> {
        self.0
            .body
            .borrow()
            .item()
            .map(|item| item.effects.clone())
            .unwrap_or_default()
    }

    pub fn markers(&self) -> Vec<Object> {
        self.0
            .body
            .borrow()
            .item()
            .map(|item| item.markers.clone())
            .unwrap_or_default()
    }

    pub fn add_effect(&self, effect: Object) -> Result<()> {
        check_effect(&effect)?;
        self.with_item_mut(|item| item.effects.push(effect))
    }

    pub fn add_marker(&self, marker: Object) -> Result<()> {
        check_marker(&marker)?;
        self.with_item_mut(|item| item.markers.push(marker))
    }

    fn with_item_mut(&self, f: impl FnOnce(&mut crate::schema::ItemFields)) -> Result<()> {
        let mut body = self.0.body.borrow_mut();
        let schema = body.schema_name().to_string();
        let item = body.item_mut().ok_or_else(|| not_an_item(&schema))?;
        f(item);
        Ok(())
    }

    /// Independent copy of everything reachable from this object.
    ///
    /// Sharing and cycles inside the copied graph are preserved; the copy has
    /// no parent.
    pub fn deep_clone(&self) -> Result<Object> {
        let tree = json::to_json_value(self)?;
        json::from_json_value(tree)
    }

    /// Structural equality ignoring identity: same schema, fields, metadata
    /// and children, recursively.
    pub fn is_equivalent_to(&self, other: &Object) -> bool {
        match (json::to_json_value(self), json::to_json_value(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Clear metadata and dynamic fields of every object reachable from this
    /// one, releasing reference cycles formed through metadata.
    pub fn teardown(&self) {
        let reachable = json::reachable_objects(self);
        let mut seen = HashSet::new();
        for object in reachable {
            if !seen.insert(object.id()) {
                continue;
            }
            object.0.body.borrow_mut().clear_metadata();
            object.0.dynamic_fields.borrow_mut().clear();
        }
    }
}
