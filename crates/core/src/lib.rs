//! Core logic for the skills assessment service.
//!
//! A session is a caller-owned sequence of turns. Each incoming turn is relayed
//! to a completion service under a fixed evaluator persona; when the caller
//! signals the end of the session, the full history is summarised by a second
//! completion call and the summary is delivered by email.

pub mod catalog;
pub mod email;
pub mod error;
pub mod finalizer;
pub mod llm_client;
pub mod prompts;
pub mod session;
pub mod turn;

pub use error::AssessmentError;
