use std::collections::HashMap;
use std::sync::RwLock;

use tracing::trace;
use vco_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Store `object` under `id` without checking that `id` is its digest.
    ///
    /// Later reads of `id` return bytes that fail verification; this models
    /// on-disk corruption and replacement sources.
    pub fn insert_unchecked(&self, id: ObjectId, object: StoredObject) {
        trace!(id = %id.short_hex(), kind = %object.kind, "unchecked insert");
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id, object);
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }

    fn object_kind(&self, id: &ObjectId) -> StoreResult<Option<ObjectKind>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).map(|obj| obj.kind))
    }

    fn object_size(&self, id: &ObjectId) -> StoreResult<Option<u64>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).map(|obj| obj.size))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::*;

    fn make_blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).to_stored_object()
    }

    #[test]
    fn write_and_read_blob() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello world");
        let id = store.write(&obj).unwrap();
        assert_eq!(store.read(&id).unwrap(), Some(obj));
    }

    #[test]
    fn write_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"idempotent");
        assert_eq!(store.write(&obj).unwrap(), store.write(&obj).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cheap_lookups_answer_without_body() {
        let store = InMemoryObjectStore::new();
        let tree = Tree::new(vec![TreeEntry::new(
            EntryMode::Regular,
            "a",
            ObjectId::from_bytes(b"a"),
        )])
        .to_stored_object()
        .unwrap();
        let size = tree.size;
        let id = store.write(&tree).unwrap();

        assert_eq!(store.object_kind(&id).unwrap(), Some(ObjectKind::Tree));
        assert_eq!(store.object_size(&id).unwrap(), Some(size));

        let missing = ObjectId::from_bytes(b"missing");
        assert_eq!(store.object_kind(&missing).unwrap(), None);
        assert_eq!(store.object_size(&missing).unwrap(), None);
    }

    #[test]
    fn unchecked_insert_fails_verification() {
        let store = InMemoryObjectStore::new();
        let bogus = ObjectId::from_bytes(b"claimed digest");
        store.insert_unchecked(bogus, make_blob(b"actual content"));

        let obj = store.read(&bogus).unwrap().unwrap();
        assert!(matches!(
            obj.verify(&bogus),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn delete_and_exists() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&make_blob(b"to-delete")).unwrap();
        assert!(store.exists(&id).unwrap());
        assert!(store.delete(&id).unwrap());
        assert!(!store.exists(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
    }

    #[test]
    fn read_batch_with_missing() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(&make_blob(b"exists")).unwrap();
        let id2 = ObjectId::from_bytes(b"missing");

        let results = store.read_batch(&[id1, id2]).unwrap();
        assert!(results[0].is_some());
        assert!(results[1].is_none());
    }

    #[test]
    fn all_ids_is_sorted() {
        let store = InMemoryObjectStore::new();
        for body in [&b"aaa"[..], b"bbb", b"ccc"] {
            store.write(&make_blob(body)).unwrap();
        }
        let ids = store.all_ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn concurrent_reads_are_safe() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&make_blob(b"shared data")).unwrap();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let obj = store.read(&id).unwrap().unwrap();
                    assert_eq!(obj.compute_id(), id);
                });
            }
        });
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.write(&make_blob(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("object_count: 1"));
    }
}
