//! Wire types shared by every endpoint of the registry backend
//!
//! All endpoints answer with the same envelope:
//! `{ success, data?, error?, message?, detalhes? }`. The `error` member is a
//! plain string on older routes and `{ code, message, details? }` on the
//! versioned API; both shapes are accepted.

pub mod envelope;

pub use envelope::{ApiEnvelope, PageInfo, RecordIssue, ServerErrorBody, ServerFailure};
