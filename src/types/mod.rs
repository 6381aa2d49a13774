//! Core type definitions shared across the diagnosis engine.

pub mod request;
pub mod result;

pub use request::{DiagnosisMode, DiagnosisRequest};
pub use result::{DiagnosisResult, QuestionAnswer, Severity, SourceTier};
