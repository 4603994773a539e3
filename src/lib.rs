pub mod errors;
pub mod io;
pub mod llm;
pub mod models;
pub mod patterns;
pub mod registry;
pub mod stages;

pub use errors::BackendError;
pub use io::{read_document, HumanDocument, MachineDocument};
pub use llm::{AnthropicClient, AnthropicConfig};
pub use models::{Chunk, ChunkConfig, RawCandidate, Record, RecordKind, SceneType, SpeakerField};
pub use registry::SpeakerRegistry;
pub use stages::{
    normalize, process, process_with_backend, LineClassifier, PipelineConfig, PipelineResult,
};
