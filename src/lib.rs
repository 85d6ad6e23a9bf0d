pub mod config;
pub mod constants;
pub mod error;
pub mod explore;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use pipeline::processing::{transform, TransformOutput, TransformStats, Transformer};
pub use pipeline::{Pipeline, PipelineResult};
pub use types::{CleanRecord, RawDate, RawRecord};
