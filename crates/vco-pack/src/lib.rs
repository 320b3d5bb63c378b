//! Pack entry index graph.
//!
//! Holds the per-object metadata a pack writer needs while choosing delta
//! bases: object type, sizes, and the delta forest (each entry's base, first
//! child and next sibling). Building the pack itself happens elsewhere.
//!
//! # Layout
//!
//! - [`PackingData`] -- the growable entry array, external bases and side
//!   arrays
//! - [`PackEntry`] -- one object's packing metadata
//! - [`PackingConfig`] -- inline field widths

pub mod config;
pub mod entry;
pub mod error;
pub mod packing;

pub use config::PackingConfig;
pub use entry::PackEntry;
pub use error::{PackError, PackResult};
pub use packing::{DeltaBase, PackingData};
