// Pipeline orchestration: corpus records through clustering to labels.

pub mod corpus;
pub mod run;

pub use corpus::{AnnotatedDocument, Document};
pub use run::{Mode, PipelineOutput, TopicPipeline};
