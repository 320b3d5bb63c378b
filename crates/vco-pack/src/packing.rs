//! The packing graph: every object selected for a pack plus its delta links.
//!
//! Entries live in one contiguous array and refer to each other by 1-based
//! position, never by address, so growing the array leaves every link
//! valid. Rarely needed per-entry fields (large delta sizes, tree depth,
//! layer) live in side arrays that are only allocated once some entry needs
//! them and are resized together with the entry array.
//!
//! # Threading
//!
//! The graph is filled by one thread through `&mut self`. Once filled it can
//! be shared by reference with delta-search workers, which may record delta
//! sizes concurrently through [`PackingData::set_delta_size`]. Growth needs
//! `&mut self`, so it can never overlap with those workers.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};
use vco_store::ObjectStore;
use vco_types::{ObjectId, ObjectType};

use crate::config::PackingConfig;
use crate::entry::{decode_link, encode_link, PackEntry};
use crate::error::{PackError, PackResult};

/// Where an entry's delta base lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaBase {
    /// Position of another entry of this graph.
    Member(usize),
    /// Index into the external (thin) bases.
    External(usize),
}

pub struct PackingData {
    config: PackingConfig,
    store: Arc<dyn ObjectStore>,
    objects: Vec<PackEntry>,
    nr_alloc: usize,
    ext_bases: Vec<PackEntry>,
    positions: HashMap<ObjectId, usize>,
    delta_size: OnceLock<Box<[AtomicU64]>>,
    tree_depth: Option<Vec<u32>>,
    layer: Option<Vec<u8>>,
}

impl fmt::Debug for PackingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackingData")
            .field("config", &self.config)
            .field("len", &self.objects.len())
            .field("nr_alloc", &self.nr_alloc)
            .field("ext_bases", &self.ext_bases.len())
            .field("delta_size", &self.delta_size.get().is_some())
            .field("tree_depth", &self.tree_depth.is_some())
            .field("layer", &self.layer.is_some())
            .finish_non_exhaustive()
    }
}

impl PackingData {
    /// An empty graph reading slow-path sizes from `store`.
    pub fn new(store: Arc<dyn ObjectStore>, config: PackingConfig) -> PackResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            objects: Vec::new(),
            nr_alloc: 0,
            ext_bases: Vec::new(),
            positions: HashMap::new(),
            delta_size: OnceLock::new(),
            tree_depth: None,
            layer: None,
        })
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of entries the array and its side arrays have room for.
    pub fn capacity(&self) -> usize {
        self.nr_alloc
    }

    pub fn ext_base_count(&self) -> usize {
        self.ext_bases.len()
    }

    /// Whether the large delta size array has been allocated.
    pub fn has_delta_size_array(&self) -> bool {
        self.delta_size.get().is_some()
    }

    // ---------------------------------------------------------------
    // Entries
    // ---------------------------------------------------------------

    /// Add `id` to the graph and return its position.
    ///
    /// An object already in the graph keeps its entry and position.
    pub fn add(&mut self, id: ObjectId, kind: ObjectType) -> usize {
        if let Some(&pos) = self.positions.get(&id) {
            return pos;
        }
        if self.objects.len() >= self.nr_alloc {
            self.grow();
        }
        let pos = self.objects.len();
        self.objects.push(PackEntry::new(id, kind));
        self.positions.insert(id, pos);
        pos
    }

    fn grow(&mut self) {
        let new_alloc = (self.nr_alloc + 1024) * 3 / 2;
        self.objects.reserve_exact(new_alloc - self.objects.len());
        if let Some(sizes) = self.delta_size.get_mut() {
            let mut grown: Vec<AtomicU64> = Vec::with_capacity(new_alloc);
            grown.extend(sizes.iter_mut().map(|s| AtomicU64::new(*s.get_mut())));
            grown.resize_with(new_alloc, || AtomicU64::new(0));
            *sizes = grown.into_boxed_slice();
        }
        if let Some(depths) = &mut self.tree_depth {
            depths.resize(new_alloc, 0);
        }
        if let Some(layers) = &mut self.layer {
            layers.resize(new_alloc, 0);
        }
        debug!(from = self.nr_alloc, to = new_alloc, "grew packing graph");
        self.nr_alloc = new_alloc;
    }

    pub fn find(&self, id: &ObjectId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn entry(&self, pos: usize) -> Option<&PackEntry> {
        self.objects.get(pos)
    }

    pub fn entry_mut(&mut self, pos: usize) -> Option<&mut PackEntry> {
        self.objects.get_mut(pos)
    }

    pub fn ext_base(&self, index: usize) -> Option<&PackEntry> {
        self.ext_bases.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PackEntry)> + '_ {
        self.objects.iter().enumerate()
    }

    fn checked(&self, pos: usize) -> PackResult<&PackEntry> {
        self.objects.get(pos).ok_or(PackError::InvalidPosition {
            position: pos,
            len: self.objects.len(),
        })
    }

    fn checked_mut(&mut self, pos: usize) -> PackResult<&mut PackEntry> {
        let len = self.objects.len();
        self.objects
            .get_mut(pos)
            .ok_or(PackError::InvalidPosition { position: pos, len })
    }

    // ---------------------------------------------------------------
    // Delta links
    // ---------------------------------------------------------------

    pub fn delta(&self, pos: usize) -> Option<DeltaBase> {
        let entry = self.objects.get(pos)?;
        decode_link(entry.delta_idx).map(|i| {
            if entry.ext_base {
                DeltaBase::External(i)
            } else {
                DeltaBase::Member(i)
            }
        })
    }

    pub fn base_entry(&self, base: DeltaBase) -> Option<&PackEntry> {
        match base {
            DeltaBase::Member(pos) => self.objects.get(pos),
            DeltaBase::External(index) => self.ext_bases.get(index),
        }
    }

    /// Point `pos` at the member `base`, or clear its base.
    ///
    /// Only the entry's own link changes; threading it into the base's
    /// child list is up to the caller.
    pub fn set_delta(&mut self, pos: usize, base: Option<usize>) -> PackResult<()> {
        if let Some(base) = base {
            self.checked(base)?;
        }
        let entry = self.checked_mut(pos)?;
        entry.delta_idx = encode_link(base);
        entry.ext_base = false;
        Ok(())
    }

    /// Make `pos` a delta against an object outside the graph.
    ///
    /// Records a new external base and returns its index.
    pub fn set_delta_ext(&mut self, pos: usize, base: ObjectId, kind: ObjectType) -> PackResult<usize> {
        self.checked(pos)?;
        let index = self.ext_bases.len();
        let mut ext = PackEntry::new(base, kind);
        ext.preferred_base = true;
        ext.filled = true;
        self.ext_bases.push(ext);

        let entry = &mut self.objects[pos];
        entry.delta_idx = encode_link(Some(index));
        entry.ext_base = true;
        trace!(base = %base.short_hex(), index, "added external base");
        Ok(index)
    }

    pub fn delta_child(&self, pos: usize) -> Option<usize> {
        decode_link(self.objects.get(pos)?.delta_child_idx)
    }

    pub fn set_delta_child(&mut self, pos: usize, child: Option<usize>) -> PackResult<()> {
        if let Some(child) = child {
            self.checked(child)?;
        }
        self.checked_mut(pos)?.delta_child_idx = encode_link(child);
        Ok(())
    }

    pub fn delta_sibling(&self, pos: usize) -> Option<usize> {
        decode_link(self.objects.get(pos)?.delta_sibling_idx)
    }

    pub fn set_delta_sibling(&mut self, pos: usize, sibling: Option<usize>) -> PackResult<()> {
        if let Some(sibling) = sibling {
            self.checked(sibling)?;
        }
        self.checked_mut(pos)?.delta_sibling_idx = encode_link(sibling);
        Ok(())
    }

    /// Entries deltified against `pos`: its first child, then that child's
    /// siblings.
    pub fn children(&self, pos: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.delta_child(pos), move |&child| self.delta_sibling(child))
    }

    /// Number of delta links between `pos` and the end of its chain.
    ///
    /// An external base counts as one link. Stops after `len()` steps, so a
    /// cyclic chain reports a depth of at most `len()`.
    pub fn delta_depth(&self, pos: usize) -> usize {
        let mut depth = 0;
        let mut cur = self.delta(pos);
        while let Some(base) = cur {
            depth += 1;
            if depth >= self.objects.len() {
                break;
            }
            cur = match base {
                DeltaBase::Member(next) => self.delta(next),
                DeltaBase::External(_) => None,
            };
        }
        depth
    }

    // ---------------------------------------------------------------
    // Sizes
    // ---------------------------------------------------------------

    fn size_slow(&self, entry: &PackEntry) -> PackResult<u64> {
        trace!(id = %entry.id().short_hex(), "object size from store");
        self.store
            .object_size(entry.id())?
            .ok_or(PackError::ObjectNotFound(*entry.id()))
    }

    /// The object size of `pos`, from the inline field or the store.
    ///
    /// Sizes read from the store are not cached.
    pub fn size(&self, pos: usize) -> PackResult<u64> {
        let entry = self.checked(pos)?;
        match entry.inline_size() {
            Some(size) => Ok(size),
            None => self.size_slow(entry),
        }
    }

    /// Record the object size of `pos`.
    ///
    /// # Panics
    ///
    /// A size too large for the inline field is not stored; the store is
    /// asked instead. If the store disagrees with `size` this panics with a
    /// [`PackError::CapacityInvariantViolation`] message.
    pub fn set_size(&mut self, pos: usize, size: u64) -> PackResult<()> {
        let limit = self.config.size_limit();
        let entry = self.checked_mut(pos)?;
        if size < limit {
            entry.store_size(Some(size as u32));
            return Ok(());
        }
        entry.store_size(None);
        let entry = &self.objects[pos];
        let actual = self.size_slow(entry)?;
        if actual != size {
            panic!(
                "{}",
                PackError::CapacityInvariantViolation {
                    id: *entry.id(),
                    declared: size,
                    actual,
                }
            );
        }
        Ok(())
    }

    /// `size(pos) < rhs`, asking the store only when the answer depends on it.
    pub fn size_less_than(&self, pos: usize, rhs: u64) -> PackResult<bool> {
        let entry = self.checked(pos)?;
        if let Some(size) = entry.inline_size() {
            return Ok(size < rhs);
        }
        // An out-of-line size is at least the limit.
        if rhs < self.config.size_limit() {
            return Ok(false);
        }
        Ok(self.size_slow(entry)? < rhs)
    }

    /// `size(pos) > rhs`, asking the store only when the answer depends on it.
    pub fn size_greater_than(&self, pos: usize, rhs: u64) -> PackResult<bool> {
        let entry = self.checked(pos)?;
        if let Some(size) = entry.inline_size() {
            return Ok(size > rhs);
        }
        if rhs < self.config.size_limit() {
            return Ok(true);
        }
        Ok(self.size_slow(entry)? > rhs)
    }

    /// The delta size recorded for `pos`.
    ///
    /// `None` when the entry has no delta base. Only meaningful after
    /// [`set_delta_size`](Self::set_delta_size) was called for the entry.
    pub fn delta_size(&self, pos: usize) -> Option<u64> {
        let entry = self.objects.get(pos)?;
        if !entry.has_delta() {
            return None;
        }
        entry.inline_delta_size().or_else(|| {
            self.delta_size
                .get()
                .and_then(|sizes| sizes.get(pos))
                .map(|size| size.load(Ordering::Relaxed))
        })
    }

    /// Record the delta size of `pos`. Safe to call from several threads.
    ///
    /// Sizes too large for the inline field go to a side array covering the
    /// whole graph, allocated by whichever caller needs it first.
    pub fn set_delta_size(&self, pos: usize, size: u64) -> PackResult<()> {
        let entry = self.checked(pos)?;
        if size < self.config.delta_size_limit() {
            entry.store_delta_size(Some(size as u32));
            return Ok(());
        }
        let sizes = self.delta_size.get_or_init(|| {
            debug!(entries = self.nr_alloc, "allocating delta size array");
            (0..self.nr_alloc).map(|_| AtomicU64::new(0)).collect()
        });
        sizes[pos].store(size, Ordering::Relaxed);
        entry.store_delta_size(None);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Side fields
    // ---------------------------------------------------------------

    /// Tree depth of `pos`; 0 until some entry records one.
    pub fn tree_depth(&self, pos: usize) -> u32 {
        self.tree_depth
            .as_ref()
            .and_then(|depths| depths.get(pos))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_tree_depth(&mut self, pos: usize, depth: u32) -> PackResult<()> {
        self.checked(pos)?;
        let nr_alloc = self.nr_alloc;
        self.tree_depth.get_or_insert_with(|| vec![0; nr_alloc])[pos] = depth;
        Ok(())
    }

    /// Layer of `pos`; 0 until some entry records one.
    pub fn layer(&self, pos: usize) -> u8 {
        self.layer
            .as_ref()
            .and_then(|layers| layers.get(pos))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_layer(&mut self, pos: usize, layer: u8) -> PackResult<()> {
        self.checked(pos)?;
        let nr_alloc = self.nr_alloc;
        self.layer.get_or_insert_with(|| vec![0; nr_alloc])[pos] = layer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;
    use vco_store::{InMemoryObjectStore, ObjectKind, StoreResult, StoredObject};

    /// Store wrapper counting slow-path size lookups.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryObjectStore,
        size_calls: AtomicUsize,
    }

    impl CountingStore {
        fn calls(&self) -> usize {
            self.size_calls.load(Ordering::SeqCst)
        }
    }

    impl ObjectStore for CountingStore {
        fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
            self.inner.read(id)
        }
        fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
            self.inner.write(object)
        }
        fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
            self.inner.exists(id)
        }
        fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
            self.inner.delete(id)
        }
        fn object_size(&self, id: &ObjectId) -> StoreResult<Option<u64>> {
            self.size_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.object_size(id)
        }
    }

    fn id(n: usize) -> ObjectId {
        ObjectId::from_bytes(format!("entry-{n}").as_bytes())
    }

    fn graph(n: usize) -> PackingData {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let mut pack = PackingData::new(store, PackingConfig::default()).unwrap();
        for i in 0..n {
            pack.add(id(i), ObjectType::Blob);
        }
        pack
    }

    fn narrow_config() -> PackingConfig {
        PackingConfig {
            size_bits: 8,
            delta_size_bits: 4,
        }
    }

    #[test]
    fn add_is_idempotent_and_findable() {
        let mut pack = graph(3);
        assert_eq!(pack.len(), 3);
        assert_eq!(pack.add(id(1), ObjectType::Blob), 1);
        assert_eq!(pack.len(), 3);
        assert_eq!(pack.find(&id(2)), Some(2));
        assert_eq!(pack.find(&id(9)), None);
        assert_eq!(pack.entry(0).unwrap().id(), &id(0));
        assert!(pack.entry(3).is_none());
    }

    #[test]
    fn capacity_grows_by_half_plus_a_block() {
        let mut pack = graph(1);
        assert_eq!(pack.capacity(), 1536);
        for i in 1..=1536 {
            pack.add(id(i), ObjectType::Blob);
        }
        assert_eq!(pack.capacity(), 3840);
    }

    #[test]
    fn links_survive_growth() {
        let mut pack = graph(10);
        pack.set_delta(9, Some(3)).unwrap();
        pack.set_delta_child(3, Some(9)).unwrap();
        pack.set_tree_depth(9, 7).unwrap();
        pack.set_delta_size(9, 1 << 30).unwrap();

        for i in 10..5000 {
            pack.add(id(i), ObjectType::Blob);
        }
        assert!(pack.capacity() >= 5000);
        assert_eq!(pack.delta(9), Some(DeltaBase::Member(3)));
        assert_eq!(pack.delta_child(3), Some(9));
        assert_eq!(pack.tree_depth(9), 7);
        assert_eq!(pack.delta_size(9), Some(1 << 30));

        pack.set_delta(4999, Some(9)).unwrap();
        pack.set_delta_size(4999, 1 << 31).unwrap();
        pack.set_tree_depth(4999, 2).unwrap();
        assert_eq!(pack.delta_size(4999), Some(1 << 31));
        assert_eq!(pack.tree_depth(4999), 2);
    }

    #[test]
    fn delta_forest_links() {
        let mut pack = graph(5);
        // 0 is the base of 1, 2 and 3; 4 deltas against 3.
        for child in [1, 2, 3] {
            pack.set_delta(child, Some(0)).unwrap();
        }
        pack.set_delta(4, Some(3)).unwrap();
        pack.set_delta_child(0, Some(3)).unwrap();
        pack.set_delta_sibling(3, Some(2)).unwrap();
        pack.set_delta_sibling(2, Some(1)).unwrap();
        pack.set_delta_child(3, Some(4)).unwrap();

        assert_eq!(pack.children(0).collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(pack.children(3).collect::<Vec<_>>(), [4]);
        assert_eq!(pack.children(4).count(), 0);
        assert_eq!(pack.delta_depth(4), 2);
        assert_eq!(pack.delta_depth(0), 0);

        pack.set_delta(4, None).unwrap();
        pack.set_delta_child(3, None).unwrap();
        assert_eq!(pack.delta(4), None);
        assert!(!pack.entry(4).unwrap().has_delta());
        assert_eq!(pack.children(3).count(), 0);
    }

    #[test]
    fn setting_links_at_invalid_positions_fails() {
        let mut pack = graph(2);
        assert!(matches!(
            pack.set_delta(0, Some(2)),
            Err(PackError::InvalidPosition { position: 2, len: 2 })
        ));
        assert!(matches!(
            pack.set_delta_sibling(5, None),
            Err(PackError::InvalidPosition { position: 5, .. })
        ));
        assert_eq!(pack.delta(0), None);
        assert!(pack.size(7).is_err());
    }

    #[test]
    fn external_bases_resolve_separately() {
        let mut pack = graph(2);
        let thin = ObjectId::from_bytes(b"thin base");
        let index = pack.set_delta_ext(1, thin, ObjectType::Tree).unwrap();
        assert_eq!(index, 0);
        assert_eq!(pack.ext_base_count(), 1);

        let base = pack.delta(1).unwrap();
        assert_eq!(base, DeltaBase::External(0));
        let ext = pack.base_entry(base).unwrap();
        assert_eq!(ext.id(), &thin);
        assert!(ext.preferred_base);
        assert!(pack.entry(1).unwrap().has_ext_base());
        assert_eq!(pack.delta_depth(1), 1);

        // Relinking to a member clears the external flag.
        pack.set_delta(1, Some(0)).unwrap();
        assert_eq!(pack.delta(1), Some(DeltaBase::Member(0)));
    }

    #[test]
    fn large_sizes_come_from_the_store_every_time() {
        let store = Arc::new(CountingStore::default());
        let small = store
            .write(&StoredObject::new(ObjectKind::Blob, vec![1; 10]))
            .unwrap();
        let large = store
            .write(&StoredObject::new(ObjectKind::Blob, vec![2; 300]))
            .unwrap();
        let mut pack = PackingData::new(store.clone(), narrow_config()).unwrap();
        let s = pack.add(small, ObjectType::Blob);
        let l = pack.add(large, ObjectType::Blob);

        pack.set_size(s, 10).unwrap();
        assert_eq!(pack.size(s).unwrap(), 10);
        assert_eq!(store.calls(), 0);

        pack.set_size(l, 300).unwrap();
        assert_eq!(store.calls(), 1);
        assert!(pack.entry(s).unwrap().size_valid());
        assert!(!pack.entry(l).unwrap().size_valid());
        assert_eq!(pack.size(l).unwrap(), 300);
        assert_eq!(pack.size(l).unwrap(), 300);
        assert_eq!(store.calls(), 3);

        // Below the inline limit the answer is known without the store.
        assert!(!pack.size_less_than(l, 100).unwrap());
        assert!(pack.size_greater_than(l, 100).unwrap());
        assert_eq!(store.calls(), 3);
        assert!(pack.size_less_than(l, 1000).unwrap());
        assert!(!pack.size_greater_than(l, 1000).unwrap());
        assert_eq!(store.calls(), 5);

        assert!(pack.size_less_than(s, 11).unwrap());
        assert!(!pack.size_greater_than(s, 10).unwrap());
        assert_eq!(store.calls(), 5);
    }

    #[test]
    #[should_panic(expected = "declared as 999")]
    fn mismatched_large_size_panics() {
        let store = Arc::new(InMemoryObjectStore::new());
        let large = store
            .write(&StoredObject::new(ObjectKind::Blob, vec![0; 300]))
            .unwrap();
        let mut pack = PackingData::new(store, narrow_config()).unwrap();
        let pos = pack.add(large, ObjectType::Blob);
        let _ = pack.set_size(pos, 999);
    }

    #[test]
    fn large_size_of_missing_object_is_an_error() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let mut pack = PackingData::new(store, narrow_config()).unwrap();
        let pos = pack.add(id(0), ObjectType::Blob);
        assert!(matches!(
            pack.set_size(pos, 1000),
            Err(PackError::ObjectNotFound(missing)) if missing == id(0)
        ));
    }

    #[test]
    fn delta_size_spills_lazily() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let mut pack = PackingData::new(store, narrow_config()).unwrap();
        for i in 0..3 {
            pack.add(id(i), ObjectType::Blob);
        }
        pack.set_delta(1, Some(0)).unwrap();
        pack.set_delta(2, Some(0)).unwrap();

        pack.set_delta_size(1, 15).unwrap();
        assert!(!pack.has_delta_size_array());
        assert_eq!(pack.delta_size(1), Some(15));

        pack.set_delta_size(2, 16).unwrap();
        assert!(pack.has_delta_size_array());
        assert_eq!(pack.delta_size(2), Some(16));
        assert_eq!(pack.delta_size(1), Some(15));
        assert_eq!(pack.delta_size(0), None);
    }

    #[test]
    fn concurrent_delta_sizes_share_one_side_array() {
        let mut pack = graph(64);
        for pos in 1..64 {
            pack.set_delta(pos, Some(0)).unwrap();
        }
        let pack = &pack;
        std::thread::scope(|s| {
            for t in 0..8usize {
                s.spawn(move || {
                    for pos in (1..64).filter(|p| p % 8 == t) {
                        let size = (1u64 << 20) + pos as u64;
                        pack.set_delta_size(pos, size).unwrap();
                    }
                });
            }
        });
        assert!(pack.has_delta_size_array());
        for pos in 1..64 {
            assert_eq!(pack.delta_size(pos), Some((1 << 20) + pos as u64));
        }
    }

    #[test]
    fn side_fields_default_to_zero() {
        let mut pack = graph(3);
        assert_eq!(pack.tree_depth(1), 0);
        assert_eq!(pack.layer(1), 0);
        pack.set_layer(2, 4).unwrap();
        pack.set_tree_depth(1, 9).unwrap();
        assert_eq!(pack.layer(2), 4);
        assert_eq!(pack.layer(0), 0);
        assert_eq!(pack.tree_depth(1), 9);
        assert!(pack.set_layer(3, 1).is_err());
    }

    proptest! {
        #[test]
        fn chain_links_are_stable(len in 2usize..200, extra in 0usize..3000) {
            let mut pack = graph(len);
            for pos in 1..len {
                pack.set_delta(pos, Some(pos - 1)).unwrap();
            }
            for i in len..len + extra {
                pack.add(id(i), ObjectType::Blob);
            }
            for pos in 1..len {
                prop_assert_eq!(pack.delta(pos), Some(DeltaBase::Member(pos - 1)));
            }
            prop_assert_eq!(pack.delta_depth(len - 1), len - 1);
        }
    }
}
