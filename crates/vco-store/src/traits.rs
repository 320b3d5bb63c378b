use vco_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// The object layer calls into a store while parsing records (`read`,
/// `exists`, `object_kind`) and the packing graph calls `object_size` when
/// an entry's size did not fit its inline field. Implementations must be
/// safe to read from several threads at once.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// The kind of an object, without decoding its body.
    ///
    /// Backends that keep a header or index should answer this without
    /// touching the object data. The default implementation reads.
    fn object_kind(&self, id: &ObjectId) -> StoreResult<Option<ObjectKind>> {
        Ok(self.read(id)?.map(|obj| obj.kind))
    }

    /// The size of an object's body in bytes, without decoding it.
    fn object_size(&self, id: &ObjectId) -> StoreResult<Option<u64>> {
        Ok(self.read(id)?.map(|obj| obj.size))
    }

    /// Read multiple objects in a batch.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their IDs.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
