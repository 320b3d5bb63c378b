//! Error types for the object layer.

use vco_store::StoreError;
use vco_types::{ObjectId, ObjectType};

/// Errors produced by object lookup, narrowing and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// The record already has a type and a different one was requested.
    #[error("object {id} is a {found}, not a {wanted}")]
    TypeMismatch {
        id: ObjectId,
        found: ObjectType,
        wanted: ObjectType,
    },

    /// The bytes the store returned do not hash to the requested digest.
    #[error("hash mismatch {id}")]
    Integrity { id: ObjectId },

    /// The backing store has no object with this digest.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The store reported a type the object layer cannot decode.
    #[error("object {id} has unknown type")]
    UnknownType { id: ObjectId },

    /// The object body could not be decoded as its declared type.
    #[error("corrupt {kind} {id}: {reason}")]
    Corrupt {
        id: ObjectId,
        kind: ObjectType,
        reason: String,
    },

    /// Following replacement digests did not terminate.
    #[error("replace depth too high for object {0}")]
    ReplaceDepthExceeded(ObjectId),

    /// The pool has been cleared and can no longer create records.
    #[error("object pool has been cleared")]
    PoolCleared,

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for object layer results.
pub type ObjectResult<T> = Result<T, ObjectError>;
