//! Open-addressing identity table keyed by object digest.
//!
//! The table only stores [`ObjectRef`] handles; the records (and therefore
//! the digests the table compares against) live in the pool's slabs and are
//! reached through a [`DigestOf`] implementation. Buckets are a power of two
//! long, collisions overflow linearly into the next empty bucket with
//! wraparound, and nothing is ever removed except by [`ObjectTable::clear`].
//!
//! # Invariants
//!
//! - `buckets.len()` is zero or a power of two, never below [`MIN_TABLE_SIZE`].
//! - Every live handle is reachable by probing from its digest's ideal bucket
//!   without crossing an empty bucket.
//! - After a growth step the table is more than twice as large as its
//!   live count.

use tracing::debug;
use vco_types::ObjectId;

use crate::record::ObjectRef;

/// Smallest bucket array the table allocates.
pub const MIN_TABLE_SIZE: usize = 32;

/// Resolves a handle to the digest of the record it names.
pub trait DigestOf {
    fn digest_of(&self, obj: ObjectRef) -> ObjectId;
}

#[derive(Debug, Default)]
pub struct ObjectTable {
    buckets: Vec<Option<ObjectRef>>,
    count: usize,
}

#[inline]
fn ideal_bucket(id: &ObjectId, size: usize) -> usize {
    id.table_hash() as usize & (size - 1)
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Whether a bucket array has been allocated yet.
    pub fn is_allocated(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Find the handle for `id`.
    ///
    /// A hit found past the ideal bucket is swapped into the ideal bucket,
    /// so repeatedly requested digests settle at probe distance zero. This
    /// changes bucket layout, never membership.
    pub fn lookup(&mut self, id: &ObjectId, records: &impl DigestOf) -> Option<ObjectRef> {
        if self.buckets.is_empty() {
            return None;
        }
        let size = self.buckets.len();
        let first = ideal_bucket(id, size);
        let mut i = first;
        while let Some(obj) = self.buckets[i] {
            if records.digest_of(obj) == *id {
                if i != first {
                    self.buckets.swap(i, first);
                }
                return Some(obj);
            }
            i = (i + 1) & (size - 1);
        }
        None
    }

    /// Number of buckets probed past the ideal one before `id` is found.
    ///
    /// Unlike [`lookup`](Self::lookup) this leaves the layout untouched.
    pub fn probe_distance(&self, id: &ObjectId, records: &impl DigestOf) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let size = self.buckets.len();
        let mut i = ideal_bucket(id, size);
        let mut distance = 0;
        while let Some(obj) = self.buckets[i] {
            if records.digest_of(obj) == *id {
                return Some(distance);
            }
            i = (i + 1) & (size - 1);
            distance += 1;
        }
        None
    }

    /// Whether adding one more handle must first grow the bucket array.
    pub fn needs_growth(&self) -> bool {
        // size - 1 <= 2 * count, written to stay in range for an empty table
        self.buckets.len() <= 2 * self.count + 1
    }

    /// Add a handle for a digest that is not yet present.
    ///
    /// Grows first when needed; the caller guarantees `id` is absent.
    pub fn insert(&mut self, obj: ObjectRef, id: &ObjectId, records: &impl DigestOf) {
        if self.needs_growth() {
            self.grow(records);
        }
        Self::place(&mut self.buckets, obj, id);
        self.count += 1;
    }

    fn place(buckets: &mut [Option<ObjectRef>], obj: ObjectRef, id: &ObjectId) {
        let size = buckets.len();
        let mut j = ideal_bucket(id, size);
        while buckets[j].is_some() {
            j = (j + 1) & (size - 1);
        }
        buckets[j] = Some(obj);
    }

    /// Double the bucket array (at least [`MIN_TABLE_SIZE`]) and re-place
    /// every live handle in old bucket order.
    pub fn grow(&mut self, records: &impl DigestOf) {
        let new_size = if self.buckets.len() < MIN_TABLE_SIZE {
            MIN_TABLE_SIZE
        } else {
            2 * self.buckets.len()
        };
        let mut new_buckets = vec![None; new_size];
        for obj in self.buckets.iter().flatten() {
            Self::place(&mut new_buckets, *obj, &records.digest_of(*obj));
        }
        debug!(
            from = self.buckets.len(),
            to = new_size,
            live = self.count,
            "grew object table"
        );
        self.buckets = new_buckets;
    }

    /// Handle stored in bucket `index`, if any.
    pub fn get_indexed(&self, index: usize) -> Option<ObjectRef> {
        self.buckets.get(index).copied().flatten()
    }

    /// Live handles in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.buckets.iter().flatten().copied()
    }

    /// Free the bucket array and forget every handle.
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.count = 0;
    }
}
