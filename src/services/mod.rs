pub mod block_text;
pub mod chunker;
pub mod generation_service;
pub mod payload_merger;
pub mod prompts;
pub mod quiz_grader;
pub mod tree_walker;

pub use chunker::chunk_text;
pub use generation_service::GenerationClient;
pub use payload_merger::merge_payloads;
pub use quiz_grader::{grade_mcqs, parse_answers, QuizReport, ReviewItem};
pub use tree_walker::{DocumentTreeWalker, WalkReport, WalkSettings};
