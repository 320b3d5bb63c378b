//! Foundation types for version-control objects.
//!
//! Every other `vco` crate depends on `vco-types`. It only carries the two
//! values that identify an object everywhere else in the system:
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 digest)
//! - [`ObjectType`] -- The commit/tree/blob/tag discriminant, including the
//!   `Unknown` state of a record whose type has not been narrowed yet

pub mod error;
pub mod kind;
pub mod object;

pub use error::TypeError;
pub use kind::ObjectType;
pub use object::ObjectId;
