pub mod chunk_ctx;
pub mod exam_pipeline;

pub use chunk_ctx::ChunkCtx;
pub use exam_pipeline::{ExamPipeline, GenerationRequest};
