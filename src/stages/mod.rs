pub mod chunker;
pub mod classifier;
pub mod normalizer;
pub mod pipeline;

pub use chunker::split;
pub use classifier::LineClassifier;
pub use normalizer::normalize;
pub use pipeline::*;
