pub mod inserter;
pub mod normalizer;
pub mod orchestrator;

pub use inserter::{CommitSummary, DuplicatePolicy, Insertion};
pub use normalizer::{
    JavaNormalizer, NoopNormalizer, Normalize, NormalizeOptions, NormalizeReport, NormalizeScope,
};
pub use orchestrator::{GenerationReport, GenerationState, Generator};
