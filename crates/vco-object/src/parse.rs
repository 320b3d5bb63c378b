//! Promoting records from "seen" to "parsed".
//!
//! Parsing reads an object's encoded bytes from an [`ObjectStore`], checks
//! them against the digest (after following the replacement map), decodes
//! them by type and only then marks the record parsed. A record that fails
//! any step stays unparsed, so a caller may retry once the store is fixed.

use tracing::{trace, warn};
use vco_store::{Commit, ObjectKind, ObjectStore, StoreError, StoredObject, Tag, Tree};
use vco_types::{ObjectId, ObjectType};

use crate::error::{ObjectError, ObjectResult};
use crate::pool::ObjectPool;
use crate::record::ObjectRef;

fn corrupt(id: ObjectId, kind: ObjectType, err: StoreError) -> ObjectError {
    ObjectError::Corrupt {
        id,
        kind,
        reason: err.to_string(),
    }
}

impl ObjectPool {
    fn replacement_for(&self, id: &ObjectId) -> ObjectResult<ObjectId> {
        if self.config().replace_refs {
            self.replace_map().lookup(id)
        } else {
            Ok(*id)
        }
    }

    /// Read `repl` and check its bytes hash to `repl`.
    fn read_verified(store: &dyn ObjectStore, id: &ObjectId, repl: &ObjectId) -> ObjectResult<StoredObject> {
        let obj = store.read(repl)?.ok_or(ObjectError::NotFound(*id))?;
        if obj.verify(repl).is_err() {
            warn!(id = %repl.short_hex(), "hash mismatch");
            return Err(ObjectError::Integrity { id: *repl });
        }
        Ok(obj)
    }

    fn mark_parsed(&mut self, obj: ObjectRef) {
        if let Some(record) = self.slabs.get_mut(obj) {
            record.mark_parsed();
        }
    }

    /// Make sure the record for `id` is parsed and return it.
    ///
    /// An already parsed record is returned without touching the store.
    /// Blobs the store can identify cheaply are verified and marked parsed
    /// without decoding anything; their content is read on first use by the
    /// caller. Everything else is read, verified and decoded.
    pub fn parse_object(&mut self, store: &dyn ObjectStore, id: &ObjectId) -> ObjectResult<ObjectRef> {
        let repl = self.replacement_for(id)?;

        let existing = self.lookup_object(id);
        if let Some(obj) = existing {
            if self[obj].is_parsed() {
                return Ok(obj);
            }
        }

        let cheap_blob = match existing.map(|obj| self[obj].kind()) {
            Some(ObjectType::Blob) => store.exists(&repl)?,
            Some(_) => false,
            None => store.object_kind(&repl)? == Some(ObjectKind::Blob),
        };
        if cheap_blob {
            Self::read_verified(store, id, &repl)?;
            let obj = match existing {
                Some(obj) => obj,
                None => self.lookup_blob(id)?,
            };
            self.mark_parsed(obj);
            trace!(id = %id.short_hex(), "parsed blob without decoding");
            return Ok(obj);
        }

        let stored = Self::read_verified(store, id, &repl)?;
        self.parse_object_buffer(id, stored.kind.into(), stored.data)
    }

    /// Decode bytes that were already read and verified for `id`.
    ///
    /// Tree bytes and commit bytes are kept on the record for reuse; blob
    /// bytes are discarded.
    pub fn parse_object_buffer(
        &mut self,
        id: &ObjectId,
        kind: ObjectType,
        data: Vec<u8>,
    ) -> ObjectResult<ObjectRef> {
        match kind {
            ObjectType::Blob => {
                let obj = self.lookup_blob(id)?;
                self.mark_parsed(obj);
                Ok(obj)
            }
            ObjectType::Tree => {
                let obj = self.lookup_tree(id)?;
                let loaded = self[obj].as_tree().is_some_and(|t| t.has_buffer());
                if !(self[obj].is_parsed() && loaded) {
                    Tree::decode(&data).map_err(|e| corrupt(*id, kind, e))?;
                    if let Some(tree) = self[obj].tree_mut() {
                        tree.set_buffer(data);
                    }
                    self.mark_parsed(obj);
                }
                Ok(obj)
            }
            ObjectType::Commit => {
                let obj = self.lookup_commit(id)?;
                if !self[obj].is_parsed() {
                    let commit = Commit::decode(&data).map_err(|e| corrupt(*id, kind, e))?;
                    let tree = self.lookup_tree(&commit.tree)?;
                    let parents = commit
                        .parents
                        .iter()
                        .map(|parent| self.lookup_commit(parent))
                        .collect::<ObjectResult<Vec<_>>>()?;
                    if let Some(payload) = self[obj].commit_mut() {
                        payload.set_links(tree, parents);
                    }
                    self.mark_parsed(obj);
                }
                if let Some(payload) = self[obj].commit_mut() {
                    payload.cache_buffer(data);
                }
                Ok(obj)
            }
            ObjectType::Tag => {
                let obj = self.lookup_tag(id)?;
                if !self[obj].is_parsed() {
                    let tag = Tag::decode(&data).map_err(|e| corrupt(*id, kind, e))?;
                    let tagged = self.lookup_typed(&tag.target, tag.target_kind.into())?;
                    if let Some(payload) = self[obj].tag_mut() {
                        payload.set_target(tag.target, tagged, tag.name);
                    }
                    self.mark_parsed(obj);
                }
                Ok(obj)
            }
            ObjectType::Unknown => {
                warn!(id = %id.short_hex(), "object has unknown type");
                Err(ObjectError::UnknownType { id: *id })
            }
        }
    }

    /// Reload the entry buffer of a tree whose buffer was freed.
    pub fn load_tree_buffer(&mut self, store: &dyn ObjectStore, obj: ObjectRef) -> ObjectResult<()> {
        let record = &self[obj];
        let id = *record.id();
        let Some(tree) = record.as_tree() else {
            return Err(ObjectError::TypeMismatch {
                id,
                found: record.kind(),
                wanted: ObjectType::Tree,
            });
        };
        if tree.has_buffer() {
            return Ok(());
        }
        let repl = self.replacement_for(&id)?;
        let stored = Self::read_verified(store, &id, &repl)?;
        if stored.kind != ObjectKind::Tree {
            return Err(ObjectError::TypeMismatch {
                id,
                found: stored.kind.into(),
                wanted: ObjectType::Tree,
            });
        }
        self.parse_object_buffer(&id, ObjectType::Tree, stored.data)?;
        Ok(())
    }
}
