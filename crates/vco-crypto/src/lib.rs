//! Content hashing for version-control objects.
//!
//! Object digests are domain-separated BLAKE3 hashes: the object type is
//! mixed into the hash so that a blob and a tree with identical bytes never
//! share a digest. Verification recomputes the digest from the bytes a
//! backing store returned.
//!
//! All crypto operations wrap established libraries -- no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
