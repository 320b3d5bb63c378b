//! Object records: the in-memory representation of one digest.
//!
//! A record is created the first time a digest is seen, usually with no type
//! (`ObjectType::Unknown`) and nothing parsed. Narrowing gives it a type,
//! exactly once; parsing fills in the type's payload and sets `parsed`.
//! Records are owned by the pool's slabs and addressed through [`ObjectRef`]
//! handles.

use vco_store::{StoreResult, Tree};
use vco_types::{ObjectId, ObjectType};

/// Handle to a record inside an object pool.
///
/// Two handles are equal exactly when they name the same record. Handles are
/// only meaningful for the pool that produced them, and only until that pool
/// is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    slab: ObjectType,
    pos: u32,
}

impl ObjectRef {
    pub(crate) fn new(slab: ObjectType, pos: u32) -> Self {
        Self { slab, pos }
    }

    /// The slab the record was allocated from.
    ///
    /// This is the type the record had at creation, so a record created
    /// untyped stays in the `Unknown` slab after it is narrowed.
    pub fn slab(&self) -> ObjectType {
        self.slab
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }
}

/// Tree payload: the encoded entry list, loaded lazily and droppable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeData {
    buffer: Option<Vec<u8>>,
}

impl TreeData {
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Decode the retained buffer. `None` if the buffer is not loaded.
    pub fn entries(&self) -> Option<StoreResult<Tree>> {
        self.buffer.as_deref().map(Tree::decode)
    }

    pub(crate) fn set_buffer(&mut self, buffer: Vec<u8>) {
        self.buffer = Some(buffer);
    }

    pub(crate) fn free_buffer(&mut self) -> Option<Vec<u8>> {
        self.buffer.take()
    }
}

/// Commit payload: links to the root tree and parent commits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitData {
    tree: Option<ObjectRef>,
    parents: Vec<ObjectRef>,
    buffer: Option<Vec<u8>>,
}

impl CommitData {
    pub fn tree(&self) -> Option<ObjectRef> {
        self.tree
    }

    pub fn parents(&self) -> &[ObjectRef] {
        &self.parents
    }

    /// The cached encoded commit, if one is held.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub(crate) fn set_links(&mut self, tree: ObjectRef, parents: Vec<ObjectRef>) {
        self.tree = Some(tree);
        self.parents = parents;
    }

    pub(crate) fn cache_buffer(&mut self, buffer: Vec<u8>) {
        if self.buffer.is_none() {
            self.buffer = Some(buffer);
        }
    }

    pub(crate) fn release(&mut self) {
        self.buffer = None;
        self.parents = Vec::new();
        self.tree = None;
    }

    pub(crate) fn release_buffer(&mut self) -> Option<Vec<u8>> {
        self.buffer.take()
    }
}

/// Tag payload: the digest the tag points at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagData {
    target: Option<ObjectId>,
    tagged: Option<ObjectRef>,
    name: String,
}

impl TagData {
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Record of the tagged object, typed as the tag declared it.
    pub fn tagged(&self) -> Option<ObjectRef> {
        self.tagged
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_target(&mut self, target: ObjectId, tagged: ObjectRef, name: String) {
        self.target = Some(target);
        self.tagged = Some(tagged);
        self.name = name;
    }

    pub(crate) fn release(&mut self) {
        self.name = String::new();
    }
}

/// Type-specific part of a record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    None,
    Blob,
    Tree(TreeData),
    Commit(CommitData),
    Tag(TagData),
}

impl Payload {
    fn for_type(kind: ObjectType) -> Self {
        match kind {
            ObjectType::Unknown => Self::None,
            ObjectType::Blob => Self::Blob,
            ObjectType::Tree => Self::Tree(TreeData::default()),
            ObjectType::Commit => Self::Commit(CommitData::default()),
            ObjectType::Tag => Self::Tag(TagData::default()),
        }
    }
}

/// One digest's object.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    id: ObjectId,
    kind: ObjectType,
    parsed: bool,
    flags: u32,
    payload: Payload,
}

impl ObjectRecord {
    pub(crate) fn new(id: ObjectId, kind: ObjectType) -> Self {
        Self {
            id,
            kind,
            parsed: false,
            flags: 0,
            payload: Payload::for_type(kind),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn kind(&self) -> ObjectType {
        self.kind
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    // Traversal scratch bits. Their meaning belongs to whichever algorithm
    // is running; every user clears its own bits when done.

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn has_flags(&self, mask: u32) -> bool {
        self.flags & mask != 0
    }

    pub fn set_flags(&mut self, mask: u32) {
        self.flags |= mask;
    }

    pub fn clear_flags(&mut self, mask: u32) {
        self.flags &= !mask;
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_tree(&self) -> Option<&TreeData> {
        match &self.payload {
            Payload::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&CommitData> {
        match &self.payload {
            Payload::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagData> {
        match &self.payload {
            Payload::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn tree_mut(&mut self) -> Option<&mut TreeData> {
        match &mut self.payload {
            Payload::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub(crate) fn commit_mut(&mut self) -> Option<&mut CommitData> {
        match &mut self.payload {
            Payload::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub(crate) fn tag_mut(&mut self) -> Option<&mut TagData> {
        match &mut self.payload {
            Payload::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Give an untyped record its type. Callers check `kind` first.
    pub(crate) fn narrow(&mut self, kind: ObjectType) {
        debug_assert!(self.kind.is_unknown());
        self.kind = kind;
        self.payload = Payload::for_type(kind);
    }

    pub(crate) fn mark_parsed(&mut self) {
        self.parsed = true;
    }

    /// Drop owned buffers ahead of a bulk slab release.
    pub(crate) fn release_payload(&mut self) {
        match &mut self.payload {
            Payload::Tree(tree) => {
                tree.free_buffer();
            }
            Payload::Commit(commit) => commit.release(),
            Payload::Tag(tag) => tag.release(),
            Payload::None | Payload::Blob => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_unparsed_with_clear_flags() {
        let rec = ObjectRecord::new(ObjectId::from_bytes(b"x"), ObjectType::Unknown);
        assert!(!rec.is_parsed());
        assert_eq!(rec.flags(), 0);
        assert_eq!(rec.payload(), &Payload::None);
    }

    #[test]
    fn narrowing_installs_matching_payload() {
        let mut rec = ObjectRecord::new(ObjectId::from_bytes(b"x"), ObjectType::Unknown);
        rec.narrow(ObjectType::Commit);
        assert_eq!(rec.kind(), ObjectType::Commit);
        assert!(rec.as_commit().is_some());
        assert!(rec.as_tree().is_none());
        assert!(rec.as_tag().is_none());
    }

    #[test]
    fn flags_are_plain_bit_storage() {
        let mut rec = ObjectRecord::new(ObjectId::from_bytes(b"x"), ObjectType::Blob);
        rec.set_flags(0b101);
        assert!(rec.has_flags(0b001));
        assert!(!rec.has_flags(0b010));
        rec.clear_flags(0b001);
        assert_eq!(rec.flags(), 0b100);
    }

    #[test]
    fn commit_buffer_is_cached_once() {
        let mut commit = CommitData::default();
        commit.cache_buffer(b"first".to_vec());
        commit.cache_buffer(b"second".to_vec());
        assert_eq!(commit.buffer(), Some(&b"first"[..]));
        assert_eq!(commit.release_buffer(), Some(b"first".to_vec()));
        assert_eq!(commit.buffer(), None);
    }

    #[test]
    fn release_payload_drops_tree_buffer() {
        let mut rec = ObjectRecord::new(ObjectId::from_bytes(b"t"), ObjectType::Tree);
        rec.tree_mut().unwrap().set_buffer(b"[]".to_vec());
        rec.release_payload();
        assert!(!rec.as_tree().unwrap().has_buffer());
        assert!(rec.as_tree().unwrap().entries().is_none());
    }
}
