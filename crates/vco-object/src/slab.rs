//! Bulk, per-type record storage.
//!
//! A [`Slab`] hands out fixed-size records in blocks of [`BLOCK_LEN`]. A
//! block is allocated with its full capacity up front and never grows, so a
//! record never moves once stored. Records are addressed by their `u32`
//! position and are never freed one at a time; [`Slab::clear`] drops every
//! block at once.

/// Records per block.
pub const BLOCK_LEN: usize = 1024;

#[derive(Debug)]
pub struct Slab<T> {
    blocks: Vec<Vec<T>>,
    len: usize,
}

impl<T> Slab<T> {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Store `value` and return its position.
    ///
    /// # Panics
    ///
    /// Panics if the slab already holds `u32::MAX` records. Running out of
    /// record space is not recoverable at this layer.
    pub fn alloc(&mut self, value: T) -> u32 {
        let pos = u32::try_from(self.len).unwrap_or_else(|_| panic!("slab exhausted"));
        if self.len % BLOCK_LEN == 0 {
            self.blocks.push(Vec::with_capacity(BLOCK_LEN));
        }
        self.blocks[self.len / BLOCK_LEN].push(value);
        self.len += 1;
        pos
    }

    pub fn get(&self, pos: u32) -> Option<&T> {
        let pos = pos as usize;
        self.blocks.get(pos / BLOCK_LEN)?.get(pos % BLOCK_LEN)
    }

    pub fn get_mut(&mut self, pos: u32) -> Option<&mut T> {
        let pos = pos as usize;
        self.blocks.get_mut(pos / BLOCK_LEN)?.get_mut(pos % BLOCK_LEN)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks currently allocated.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Records in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.blocks.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.blocks.iter_mut().flatten()
    }

    /// Release every block.
    pub fn clear(&mut self) {
        self.blocks = Vec::new();
        self.len = 0;
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_dense() {
        let mut slab = Slab::new();
        assert_eq!(slab.alloc("a"), 0);
        assert_eq!(slab.alloc("b"), 1);
        assert_eq!(slab.get(1), Some(&"b"));
        assert_eq!(slab.get(2), None);
        assert_eq!(slab.len(), 2);
    }

    #[test]
    fn records_do_not_move_when_blocks_are_added() {
        let mut slab = Slab::new();
        slab.alloc(0usize);
        let first: *const usize = slab.get(0).unwrap();
        for i in 1..(3 * BLOCK_LEN + 7) {
            slab.alloc(i);
        }
        assert_eq!(slab.block_count(), 4);
        assert!(std::ptr::eq(first, slab.get(0).unwrap()));
        assert_eq!(slab.get((2 * BLOCK_LEN + 5) as u32), Some(&(2 * BLOCK_LEN + 5)));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut slab = Slab::new();
        let pos = slab.alloc(String::from("x"));
        slab.get_mut(pos).unwrap().push('y');
        assert_eq!(slab.get(pos).map(String::as_str), Some("xy"));
    }

    #[test]
    fn clear_releases_all_blocks() {
        let mut slab = Slab::new();
        for i in 0..(BLOCK_LEN + 1) {
            slab.alloc(i);
        }
        slab.clear();
        assert!(slab.is_empty());
        assert_eq!(slab.block_count(), 0);
        assert_eq!(slab.get(0), None);
        assert_eq!(slab.alloc(9), 0);
    }

    #[test]
    fn iter_follows_allocation_order() {
        let mut slab = Slab::new();
        for i in 0..(BLOCK_LEN + 3) {
            slab.alloc(i);
        }
        assert!(slab.iter().copied().eq(0..(BLOCK_LEN + 3)));
    }
}
