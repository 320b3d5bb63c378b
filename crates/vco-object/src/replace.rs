use std::collections::HashMap;
use std::sync::Mutex;

use vco_types::ObjectId;

use crate::error::{ObjectError, ObjectResult};

/// Digest redirection consulted before reading object content.
///
/// This is the one piece of pool state that background threads may touch
/// (pack construction reads through it), so it sits behind its own lock and
/// every method takes `&self`.
#[derive(Debug)]
pub struct ReplaceMap {
    map: Mutex<HashMap<ObjectId, ObjectId>>,
    max_depth: usize,
}

impl ReplaceMap {
    pub fn new(max_depth: usize) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            max_depth,
        }
    }

    /// Redirect `original` to `replacement`. Returns the previous target.
    pub fn add(&self, original: ObjectId, replacement: ObjectId) -> Option<ObjectId> {
        self.map
            .lock()
            .expect("lock poisoned")
            .insert(original, replacement)
    }

    pub fn remove(&self, original: &ObjectId) -> Option<ObjectId> {
        self.map.lock().expect("lock poisoned").remove(original)
    }

    pub fn len(&self) -> usize {
        self.map.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The digest whose content stands in for `id`.
    ///
    /// Follows redirections until one has no further target. Examines at
    /// most `max_depth` digests; a longer chain (or a cycle) is an error.
    pub fn lookup(&self, id: &ObjectId) -> ObjectResult<ObjectId> {
        let map = self.map.lock().expect("lock poisoned");
        if map.is_empty() {
            return Ok(*id);
        }
        let mut cur = *id;
        for _ in 0..self.max_depth {
            match map.get(&cur) {
                None => return Ok(cur),
                Some(next) => cur = *next,
            }
        }
        Err(ObjectError::ReplaceDepthExceeded(*id))
    }

    pub(crate) fn clear(&self) {
        self.map.lock().expect("lock poisoned").clear();
    }
}
