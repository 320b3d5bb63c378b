use thiserror::Error;
use vco_store::StoreError;
use vco_types::ObjectId;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("object not found in store: {0}")]
    ObjectNotFound(ObjectId),

    #[error("no pack entry at position {position} (graph holds {len})")]
    InvalidPosition { position: usize, len: usize },

    /// A size that does not fit the inline field disagrees with the store.
    ///
    /// Never returned: `PackingData::set_size` panics with this message.
    #[error("size of {id} declared as {declared} but the store reports {actual}")]
    CapacityInvariantViolation {
        id: ObjectId,
        declared: u64,
        actual: u64,
    },

    #[error("invalid packing configuration: {0}")]
    InvalidConfig(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type PackResult<T> = Result<T, PackError>;
