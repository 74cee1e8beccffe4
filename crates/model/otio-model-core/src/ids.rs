//! Identifiers for live objects and serialized cross references.

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one live object node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    #[inline]
    pub(crate) fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Allocates `OTIO_REF_ID` labels (`<SchemaName>-<n>`) in encounter order,
/// one counter per schema name, so equal graphs get equal labels.
#[derive(Default, Debug)]
pub(crate) struct RefIdAllocator {
    next: HashMap<String, usize>,
}

impl RefIdAllocator {
    pub(crate) fn alloc(&mut self, schema_name: &str) -> String {
        let counter = self.next.entry_ref(schema_name).or_insert(0);
        *counter += 1;
        format!("{schema_name}-{counter}")
    }
}
