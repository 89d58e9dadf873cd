/**
 * Ordered composition of transforms into a
 *  forward (store) and exactly-reversed
 *  (retrieve) pipeline.
 */
pub mod chain;
/**
 * Store and retrieve sessions that tie the
 *  transform chain to a storage backend.
 */
pub mod pipeline;
/**
 * Serde-facing parameters for building
 *  a transform chain from configuration.
 */
pub mod settings;
/**
 * Single reversible byte transforms:
 *  encryption, compression and encoding.
 */
pub mod transform;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::chain::TransformChain;
    pub use crate::pipeline::{IngestPipeline, PipelineError, RetrievePipeline};
    pub use crate::settings::{CipherSettings, GzipSettings, TransformSettings};
    pub use crate::transform::{Transform, TransformError, TransformKind};
    pub use crate::version::build_info;
}
