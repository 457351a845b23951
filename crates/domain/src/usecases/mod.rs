//! Application use cases / business logic

pub mod batch;
pub mod generate;
pub mod merge;

pub use batch::{BatchConfig, BatchTagger};
pub use generate::TagGenerator;
pub use merge::{MergeOutcome, TagMergeEngine, final_tags};
