// Murmur: topic discovery for short free-text responses
//
// This is the library root. Each module corresponds to a major stage of the
// clustering pipeline.

pub mod cluster;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod text;
pub mod topics;

pub use error::{PipelineError, Result};
