//! Store and retrieve sessions.
//!
//! [`IngestPipeline`] runs one store session: bounded read, forward chain,
//! `Backend::put`. [`RetrievePipeline`] runs one fetch session: a producer
//! task streams `Backend::get` into an in-process pipe while the session
//! reverses whatever comes out the other end.

mod ingest;
mod retrieve;

pub use ingest::{IngestPipeline, DEFAULT_SIZE_LIMIT};
pub use retrieve::{RetrievePipeline, DEFAULT_PIPE_CAPACITY};

use store::StoreError;

use crate::transform::TransformError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("no data received for {secs}s")]
    IdleTimeout { secs: u64 },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Backend(#[from] StoreError),

    #[error("storage task ended without reporting a result")]
    ProducerAborted,
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::Backend(err) if err.is_not_found())
    }
}
