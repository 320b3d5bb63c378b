//! The repository-scoped object pool.
//!
//! [`ObjectPool`] owns the identity table, one slab per object type and the
//! replacement map, and is the only way to create records. Every digest maps
//! to at most one record for the life of the pool. Records are never removed
//! individually; [`ObjectPool::clear`] tears everything down at once.
//!
//! The pool is single-writer: lookups reorder buckets and therefore take
//! `&mut self`. Only the replacement map may be shared with other threads.

use std::ops::{Index, IndexMut};

use tracing::debug;
use vco_types::{ObjectId, ObjectType};

use crate::config::PoolConfig;
use crate::error::{ObjectError, ObjectResult};
use crate::record::{ObjectRecord, ObjectRef};
use crate::replace::ReplaceMap;
use crate::slab::Slab;
use crate::table::{DigestOf, ObjectTable};

/// Lifecycle state of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    /// No record has been created yet; the bucket array is not allocated.
    Uninitialized,
    /// The pool holds records and accepts new ones.
    Active,
    /// Torn down. Lookups miss and nothing new can be created.
    Cleared,
}

/// One slab per record type, plus the untyped slab.
#[derive(Debug, Default)]
pub(crate) struct Slabs {
    unknown: Slab<ObjectRecord>,
    commit: Slab<ObjectRecord>,
    tree: Slab<ObjectRecord>,
    blob: Slab<ObjectRecord>,
    tag: Slab<ObjectRecord>,
}

impl Slabs {
    fn slab(&self, kind: ObjectType) -> &Slab<ObjectRecord> {
        match kind {
            ObjectType::Unknown => &self.unknown,
            ObjectType::Commit => &self.commit,
            ObjectType::Tree => &self.tree,
            ObjectType::Blob => &self.blob,
            ObjectType::Tag => &self.tag,
        }
    }

    fn slab_mut(&mut self, kind: ObjectType) -> &mut Slab<ObjectRecord> {
        match kind {
            ObjectType::Unknown => &mut self.unknown,
            ObjectType::Commit => &mut self.commit,
            ObjectType::Tree => &mut self.tree,
            ObjectType::Blob => &mut self.blob,
            ObjectType::Tag => &mut self.tag,
        }
    }

    pub(crate) fn get(&self, obj: ObjectRef) -> Option<&ObjectRecord> {
        self.slab(obj.slab()).get(obj.pos())
    }

    pub(crate) fn get_mut(&mut self, obj: ObjectRef) -> Option<&mut ObjectRecord> {
        self.slab_mut(obj.slab()).get_mut(obj.pos())
    }

    fn alloc(&mut self, record: ObjectRecord) -> ObjectRef {
        let kind = record.kind();
        let pos = self.slab_mut(kind).alloc(record);
        ObjectRef::new(kind, pos)
    }

    fn clear(&mut self) {
        self.unknown.clear();
        self.commit.clear();
        self.tree.clear();
        self.blob.clear();
        self.tag.clear();
    }
}

impl DigestOf for Slabs {
    fn digest_of(&self, obj: ObjectRef) -> ObjectId {
        self.get(obj)
            .map(|record| *record.id())
            .unwrap_or_else(ObjectId::null)
    }
}

/// Owner of every in-memory object record for one repository.
#[derive(Debug)]
pub struct ObjectPool {
    config: PoolConfig,
    table: ObjectTable,
    pub(crate) slabs: Slabs,
    replace: ReplaceMap,
    cleared: bool,
}

impl ObjectPool {
    pub fn new(config: PoolConfig) -> Self {
        let replace = ReplaceMap::new(config.max_replace_depth);
        Self {
            config,
            table: ObjectTable::new(),
            slabs: Slabs::default(),
            replace,
            cleared: false,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn state(&self) -> PoolState {
        if self.cleared {
            PoolState::Cleared
        } else if self.table.is_allocated() {
            PoolState::Active
        } else {
            PoolState::Uninitialized
        }
    }

    /// Number of records in the pool.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of identity table buckets.
    pub fn table_capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Records allocated from the slab of `kind`.
    pub fn slab_len(&self, kind: ObjectType) -> usize {
        self.slabs.slab(kind).len()
    }

    pub fn replace_map(&self) -> &ReplaceMap {
        &self.replace
    }

    pub fn get(&self, obj: ObjectRef) -> Option<&ObjectRecord> {
        self.slabs.get(obj)
    }

    pub fn get_mut(&mut self, obj: ObjectRef) -> Option<&mut ObjectRecord> {
        self.slabs.get_mut(obj)
    }

    // ---------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------

    /// The record for `id`, if one exists. Never creates.
    pub fn lookup_object(&mut self, id: &ObjectId) -> Option<ObjectRef> {
        self.table.lookup(id, &self.slabs)
    }

    /// Buckets probed past the ideal one to reach `id`, without reordering.
    pub fn probe_distance(&self, id: &ObjectId) -> Option<usize> {
        self.table.probe_distance(id, &self.slabs)
    }

    /// Allocate a fresh record of `kind` for a digest not yet in the pool.
    pub(crate) fn create_object(&mut self, id: ObjectId, kind: ObjectType) -> ObjectResult<ObjectRef> {
        if self.cleared {
            return Err(ObjectError::PoolCleared);
        }
        let obj = self.slabs.alloc(ObjectRecord::new(id, kind));
        self.table.insert(obj, &id, &self.slabs);
        Ok(obj)
    }

    /// The record for `id`, creating an untyped, unparsed one on first sight.
    pub fn lookup_unknown_object(&mut self, id: &ObjectId) -> ObjectResult<ObjectRef> {
        match self.lookup_object(id) {
            Some(obj) => Ok(obj),
            None => self.create_object(*id, ObjectType::Unknown),
        }
    }

    /// The record for `id` as a `kind`.
    ///
    /// A miss creates the record directly in the `kind` slab; a hit is
    /// narrowed with [`as_type`](Self::as_type).
    pub fn lookup_typed(&mut self, id: &ObjectId, kind: ObjectType) -> ObjectResult<ObjectRef> {
        match self.lookup_object(id) {
            Some(obj) => self.as_type(obj, kind),
            None => self.create_object(*id, kind),
        }
    }

    pub fn lookup_blob(&mut self, id: &ObjectId) -> ObjectResult<ObjectRef> {
        self.lookup_typed(id, ObjectType::Blob)
    }

    pub fn lookup_tree(&mut self, id: &ObjectId) -> ObjectResult<ObjectRef> {
        self.lookup_typed(id, ObjectType::Tree)
    }

    pub fn lookup_commit(&mut self, id: &ObjectId) -> ObjectResult<ObjectRef> {
        self.lookup_typed(id, ObjectType::Commit)
    }

    pub fn lookup_tag(&mut self, id: &ObjectId) -> ObjectResult<ObjectRef> {
        self.lookup_typed(id, ObjectType::Tag)
    }

    /// Check or set the type of a record.
    ///
    /// Same type: returned unchanged. `Unknown` record: narrowed in place to
    /// `wanted`, irreversibly. Anything else is a `TypeMismatch` and the
    /// record is left as it was.
    pub fn as_type(&mut self, obj: ObjectRef, wanted: ObjectType) -> ObjectResult<ObjectRef> {
        let record = self.slabs.get_mut(obj).ok_or(ObjectError::PoolCleared)?;
        let found = record.kind();
        if found == wanted {
            return Ok(obj);
        }
        if found.is_unknown() {
            record.narrow(wanted);
            return Ok(obj);
        }
        debug!(
            id = %record.id().short_hex(),
            %found,
            %wanted,
            "object type mismatch"
        );
        Err(ObjectError::TypeMismatch {
            id: *record.id(),
            found,
            wanted,
        })
    }

    // ---------------------------------------------------------------
    // Iteration and scratch flags
    // ---------------------------------------------------------------

    /// Number of identity table buckets, for bucket-indexed iteration.
    pub fn max_object_index(&self) -> usize {
        self.table.capacity()
    }

    /// The record in bucket `index`, if that bucket is occupied.
    pub fn indexed_object(&self, index: usize) -> Option<ObjectRef> {
        self.table.get_indexed(index)
    }

    /// Every record, in bucket order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, &ObjectRecord)> + '_ {
        self.table
            .iter()
            .filter_map(|obj| self.slabs.get(obj).map(|record| (obj, record)))
    }

    /// Clear `mask` from the flags of every record.
    pub fn clear_object_flags(&mut self, mask: u32) {
        for kind in [ObjectType::Unknown]
            .into_iter()
            .chain(ObjectType::CONCRETE)
        {
            for record in self.slabs.slab_mut(kind).iter_mut() {
                record.clear_flags(mask);
            }
        }
    }

    /// Clear `mask` from the flags of every commit record.
    pub fn clear_commit_marks(&mut self, mask: u32) {
        for obj in self.table.iter() {
            if let Some(record) = self.slabs.get_mut(obj) {
                if record.kind() == ObjectType::Commit {
                    record.clear_flags(mask);
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Payload release
    // ---------------------------------------------------------------

    /// Drop a tree's entry buffer. The tree stays parsed; reload the buffer
    /// with [`load_tree_buffer`](Self::load_tree_buffer).
    pub fn free_tree_buffer(&mut self, obj: ObjectRef) -> Option<Vec<u8>> {
        self.slabs.get_mut(obj)?.tree_mut()?.free_buffer()
    }

    /// Drop a commit's cached encoded buffer, keeping its parsed links.
    pub fn release_commit_buffer(&mut self, obj: ObjectRef) -> Option<Vec<u8>> {
        self.slabs.get_mut(obj)?.commit_mut()?.release_buffer()
    }

    // ---------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------

    /// Release every record and the bucket array.
    ///
    /// Type-specific buffers are dropped record by record first, then the
    /// slabs are released in bulk, then the table. The pool cannot be used
    /// to create records afterwards; build a new one instead.
    pub fn clear(&mut self) {
        let records = self.table.len();
        for obj in self.table.iter() {
            if let Some(record) = self.slabs.get_mut(obj) {
                record.release_payload();
            }
        }
        self.slabs.clear();
        self.table.clear();
        self.replace.clear();
        self.cleared = true;
        debug!(records, "cleared object pool");
    }
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl Index<ObjectRef> for ObjectPool {
    type Output = ObjectRecord;

    fn index(&self, obj: ObjectRef) -> &ObjectRecord {
        match self.slabs.get(obj) {
            Some(record) => record,
            None => panic!("stale object handle {obj:?}"),
        }
    }
}

impl IndexMut<ObjectRef> for ObjectPool {
    fn index_mut(&mut self, obj: ObjectRef) -> &mut ObjectRecord {
        match self.slabs.get_mut(obj) {
            Some(record) => record,
            None => panic!("stale object handle {obj:?}"),
        }
    }
}
