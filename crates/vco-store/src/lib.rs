//! Backing object store for version-control objects.
//!
//! This crate is the boundary between the in-memory object layer and
//! wherever encoded objects actually live. It defines what a store must
//! answer (`read`, `exists`, a cheap type hint, a cheap size lookup) and
//! ships one implementation.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file content
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- root tree, parent commits and a message
//! - [`Tag`] -- named pointer at another object
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe.
//! 3. The store never interprets object contents on read; decoding belongs
//!    to the caller.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, ObjectKind, StoredObject, Tag, Tree, TreeEntry};
pub use traits::ObjectStore;
