pub mod document_source;
pub mod generation_backend;

pub use document_source::DocumentSource;
pub use generation_backend::GenerationBackend;
