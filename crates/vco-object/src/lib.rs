//! In-process object layer for version-control objects.
//!
//! Every digest the process touches gets exactly one [`ObjectRecord`], owned
//! by an [`ObjectPool`] and addressed through a copyable [`ObjectRef`]. A
//! record starts out untyped and unparsed; it is narrowed to a concrete type
//! at most once and marked parsed once its bytes have been read from an
//! [`ObjectStore`](vco_store::ObjectStore), verified and decoded.
//!
//! # Layout
//!
//! - [`ObjectTable`] -- open-addressing digest index over handles
//! - [`Slab`] -- block allocator, one per record type
//! - [`ReplaceMap`] -- digest redirection consulted while parsing
//! - [`ObjectArray`] -- named lists of records used as traversal roots
//!
//! # Threading
//!
//! The pool is driven by one thread at a time: even lookups reorder table
//! buckets and take `&mut self`. The replacement map is the exception and
//! can be read from any thread.

pub mod array;
pub mod config;
pub mod error;
pub mod parse;
pub mod pool;
pub mod record;
pub mod replace;
pub mod slab;
pub mod table;

pub use array::{ObjectArray, ObjectArrayEntry};
pub use config::PoolConfig;
pub use error::{ObjectError, ObjectResult};
pub use pool::{ObjectPool, PoolState};
pub use record::{CommitData, ObjectRecord, ObjectRef, Payload, TagData, TreeData};
pub use replace::ReplaceMap;
pub use slab::Slab;
pub use table::{DigestOf, ObjectTable};
