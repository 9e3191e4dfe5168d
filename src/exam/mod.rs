//! Exam building and administration
//!
//! The selector assembles a question list from the catalog; the session
//! walks it sequentially, collecting one answer record per question.

pub mod selector;
pub mod session;

// Re-export commonly used types
pub use selector::{CurriculumHalf, HALF_EXAM_SIZE, RANDOM_EXAM_SIZE};
pub use session::{AnswerPrompt, AnswerRecord, ExamOutcome, ExamSession};
