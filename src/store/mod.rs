//! Token store — OAuth token pair persisted in S3 with a local staging file.

pub mod cache;
pub mod object;
pub mod s3;

pub use cache::{TokenCache, TokenPair, DEFAULT_STAGING_PATH};
pub use object::{MemoryObjectStore, ObjectLocation, ObjectStore};
pub use s3::S3ObjectStore;
