//! Test helper modules for fono-admin integration tests
//!
//! - StubBackend: in-process REST backend with canned responses that records
//!   every request it receives

#![allow(dead_code)]

pub mod stub_backend;

pub use stub_backend::{envelope_ok, RecordedCall, StubBackend};
