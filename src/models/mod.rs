pub mod notion;
pub mod payload;
pub mod session;

pub use notion::{
    Block, BlockContent, DatabaseEntry, PaginatedList, PropertyValue, RichText, TextBlock,
};
pub use payload::{
    Flashcard, GenerationOutcome, GenerationPayload, Mcq, MergedPayload, MockExam, MockQuestion,
    MERGED_MOCK_EXAM_TITLE,
};
pub use session::{NewFlashcard, SavedFlashcard};
