//! Answer extraction module
//!
//! Turns detected bubble regions into the fixed-length answer vector the
//! scorer consumes.

pub mod answers;

pub use answers::{AnswerExtractor, AnswerVector, ExtractionDiagnostics};
