use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use vco_types::{ObjectId, ObjectType};

/// Stored form of an optional position: `position + 1`, or 0 for none.
pub(crate) fn encode_link(position: Option<usize>) -> u32 {
    match position {
        Some(pos) => u32::try_from(pos + 1)
            .unwrap_or_else(|_| panic!("pack position {pos} out of range")),
        None => 0,
    }
}

pub(crate) fn decode_link(stored: u32) -> Option<usize> {
    (stored != 0).then(|| stored as usize - 1)
}

/// Packing metadata for one object.
///
/// Delta links are stored as 1-based positions so that 0 can mean "no
/// link". `delta_idx` points into the graph's own entries, or into its
/// external bases when `ext_base` is set; child and sibling links always
/// point at own entries.
#[derive(Debug)]
pub struct PackEntry {
    id: ObjectId,
    kind: ObjectType,

    size: u32,
    size_valid: bool,
    delta_size: AtomicU32,
    delta_size_valid: AtomicBool,

    pub(crate) delta_idx: u32,
    pub(crate) delta_child_idx: u32,
    pub(crate) delta_sibling_idx: u32,
    pub(crate) ext_base: bool,

    /// Present only as a delta base, not written to the pack.
    pub preferred_base: bool,
    /// Skip this entry during delta search.
    pub no_try_delta: bool,
    /// Type and size information has been filled in.
    pub filled: bool,
}

impl PackEntry {
    pub(crate) fn new(id: ObjectId, kind: ObjectType) -> Self {
        Self {
            id,
            kind,
            size: 0,
            size_valid: false,
            delta_size: AtomicU32::new(0),
            delta_size_valid: AtomicBool::new(false),
            delta_idx: 0,
            delta_child_idx: 0,
            delta_sibling_idx: 0,
            ext_base: false,
            preferred_base: false,
            no_try_delta: false,
            filled: false,
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn kind(&self) -> ObjectType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ObjectType) {
        self.kind = kind;
    }

    /// Whether the delta base is an external (thin) base.
    pub fn has_ext_base(&self) -> bool {
        self.ext_base
    }

    /// Whether the object size is held inline rather than in the store.
    pub fn size_valid(&self) -> bool {
        self.size_valid
    }

    pub fn has_delta(&self) -> bool {
        self.delta_idx != 0
    }

    pub(crate) fn inline_size(&self) -> Option<u64> {
        self.size_valid.then_some(self.size as u64)
    }

    pub(crate) fn store_size(&mut self, size: Option<u32>) {
        match size {
            Some(size) => {
                self.size = size;
                self.size_valid = true;
            }
            None => self.size_valid = false,
        }
    }

    pub(crate) fn inline_delta_size(&self) -> Option<u64> {
        self.delta_size_valid
            .load(Ordering::Acquire)
            .then(|| self.delta_size.load(Ordering::Relaxed) as u64)
    }

    pub(crate) fn store_delta_size(&self, size: Option<u32>) {
        match size {
            Some(size) => {
                self.delta_size.store(size, Ordering::Relaxed);
                self.delta_size_valid.store(true, Ordering::Release);
            }
            None => self.delta_size_valid.store(false, Ordering::Release),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_one_based() {
        assert_eq!(encode_link(None), 0);
        assert_eq!(encode_link(Some(0)), 1);
        assert_eq!(decode_link(0), None);
        assert_eq!(decode_link(1), Some(0));
        assert_eq!(decode_link(encode_link(Some(41))), Some(41));
    }

    #[test]
    fn new_entry_has_no_links_or_sizes() {
        let e = PackEntry::new(ObjectId::from_bytes(b"e"), ObjectType::Blob);
        assert!(!e.has_delta());
        assert!(!e.has_ext_base());
        assert_eq!(e.inline_size(), None);
        assert_eq!(e.inline_delta_size(), None);
    }

    #[test]
    fn inline_sizes_can_be_invalidated() {
        let mut e = PackEntry::new(ObjectId::from_bytes(b"e"), ObjectType::Tree);
        e.store_size(Some(12));
        e.store_delta_size(Some(3));
        assert_eq!(e.inline_size(), Some(12));
        assert_eq!(e.inline_delta_size(), Some(3));
        e.store_size(None);
        e.store_delta_size(None);
        assert_eq!(e.inline_size(), None);
        assert_eq!(e.inline_delta_size(), None);
    }
}
