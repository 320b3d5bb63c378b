//! Ordered, duplicate-tolerant lists of records with per-entry names.
//!
//! Traversals collect their starting points (revision arguments, pending
//! trees) in an [`ObjectArray`]. The same record may appear several times
//! under different names; [`ObjectArray::dedup`] only folds entries whose
//! record and name both match.

use std::borrow::Cow;
use std::ops::Index;

use vco_store::EntryMode;

use crate::record::ObjectRef;

const EMPTY_NAME: Cow<'static, str> = Cow::Borrowed("");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectArrayEntry {
    pub item: ObjectRef,
    /// Name the entry was reached by. Empty names share one static string.
    pub name: Option<Cow<'static, str>>,
    pub path: Option<String>,
    pub mode: Option<EntryMode>,
}

impl ObjectArrayEntry {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn intern(name: Option<&str>) -> Option<Cow<'static, str>> {
    match name {
        None => None,
        Some("") => Some(EMPTY_NAME),
        Some(name) => Some(Cow::Owned(name.to_owned())),
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObjectArray {
    entries: Vec<ObjectArrayEntry>,
}

impl ObjectArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, item: ObjectRef, name: Option<&str>) {
        self.push_with_path(item, name, None, None);
    }

    pub fn push_with_path(
        &mut self,
        item: ObjectRef,
        name: Option<&str>,
        path: Option<&str>,
        mode: Option<EntryMode>,
    ) {
        self.entries.push(ObjectArrayEntry {
            item,
            name: intern(name),
            path: path.map(str::to_owned),
            mode,
        });
    }

    /// Remove the last entry and return its record.
    pub fn pop(&mut self) -> Option<ObjectRef> {
        self.entries.pop().map(|entry| entry.item)
    }

    /// Keep only the entries `keep` accepts, preserving order.
    pub fn filter(&mut self, mut keep: impl FnMut(&ObjectArrayEntry) -> bool) {
        self.entries.retain(|entry| keep(entry));
    }

    /// Drop every entry that repeats an earlier entry's record and name.
    ///
    /// Quadratic; arrays hold traversal roots, not whole histories.
    pub fn dedup(&mut self) {
        let mut dst = 0;
        for src in 0..self.entries.len() {
            let entry = &self.entries[src];
            let seen = self.entries[..dst]
                .iter()
                .any(|kept| kept.item == entry.item && kept.name == entry.name);
            if seen {
                continue;
            }
            if src != dst {
                self.entries.swap(src, dst);
            }
            dst += 1;
        }
        self.entries.truncate(dst);
    }

    pub fn contains(&self, item: ObjectRef) -> bool {
        self.entries.iter().any(|entry| entry.item == item)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&ObjectArrayEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectArrayEntry> {
        self.entries.iter()
    }
}

impl Index<usize> for ObjectArray {
    type Output = ObjectArrayEntry;

    fn index(&self, index: usize) -> &ObjectArrayEntry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a ObjectArray {
    type Item = &'a ObjectArrayEntry;
    type IntoIter = std::slice::Iter<'a, ObjectArrayEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ObjectArray {
    type Item = ObjectArrayEntry;
    type IntoIter = std::vec::IntoIter<ObjectArrayEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ObjectPool;
    use vco_types::ObjectId;

    fn refs(n: u32) -> (ObjectPool, Vec<ObjectRef>) {
        let mut pool = ObjectPool::default();
        let refs = (0..n)
            .map(|i| {
                pool.lookup_unknown_object(&ObjectId::from_bytes(&i.to_le_bytes()))
                    .unwrap()
            })
            .collect();
        (pool, refs)
    }

    fn pairs(array: &ObjectArray) -> Vec<(ObjectRef, Option<&str>)> {
        array.iter().map(|e| (e.item, e.name())).collect()
    }

    #[test]
    fn dedup_matches_record_and_name() {
        let (_pool, r) = refs(2);
        let mut array = ObjectArray::new();
        array.push(r[0], Some("a"));
        array.push(r[1], Some("b"));
        array.push(r[0], Some("a"));
        array.push(r[0], Some("c"));

        array.dedup();
        assert_eq!(
            pairs(&array),
            [(r[0], Some("a")), (r[1], Some("b")), (r[0], Some("c"))]
        );
    }

    #[test]
    fn dedup_treats_missing_and_empty_names_apart() {
        let (_pool, r) = refs(1);
        let mut array = ObjectArray::new();
        array.push(r[0], None);
        array.push(r[0], Some(""));
        array.push(r[0], None);
        array.push(r[0], Some(""));
        array.dedup();
        assert_eq!(pairs(&array), [(r[0], None), (r[0], Some(""))]);
    }

    #[test]
    fn empty_names_are_shared() {
        let (_pool, r) = refs(1);
        let mut array = ObjectArray::new();
        array.push(r[0], Some(""));
        assert!(matches!(array[0].name, Some(Cow::Borrowed(""))));
        array.push(r[0], Some("x"));
        assert!(matches!(array[1].name, Some(Cow::Owned(_))));
    }

    #[test]
    fn filter_keeps_order() {
        let (_pool, r) = refs(4);
        let mut array = ObjectArray::new();
        for (i, obj) in r.iter().enumerate() {
            let name = i.to_string();
            array.push_with_path(*obj, Some(name.as_str()), Some("dir/file"), Some(EntryMode::Regular));
        }
        array.filter(|e| e.item != r[1]);
        let kept: Vec<_> = array.iter().map(|e| e.item).collect();
        assert_eq!(kept, [r[0], r[2], r[3]]);
        assert_eq!(array[0].path.as_deref(), Some("dir/file"));
        assert_eq!(array[0].mode, Some(EntryMode::Regular));
    }

    #[test]
    fn pop_returns_last_and_tolerates_empty() {
        let (_pool, r) = refs(2);
        let mut array = ObjectArray::new();
        assert_eq!(array.pop(), None);
        array.push(r[0], None);
        array.push(r[1], None);
        assert_eq!(array.pop(), Some(r[1]));
        assert!(array.contains(r[0]));
        assert!(!array.contains(r[1]));
        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.pop(), None);
    }
}
