//! Image ingestion: staging, key derivation and the pipeline itself.

mod key;
mod pipeline;
mod staging;

pub use key::StorageKey;
pub use pipeline::IngestPipeline;
