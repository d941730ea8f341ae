//! fono-admin library - phonogram catalogue administration client
//!
//! Page state (selection, import pipeline, error panel, bulk actions, ECAD
//! workflows) lives here so it can be driven both by the CLI and by tests.

pub mod bulk;
pub mod client;
pub mod error;
pub mod import;
pub mod inflight;
pub mod pages;
pub mod pagination;
pub mod selection;
pub mod upload;
pub mod view;

pub use client::{ApiClient, Reply};
pub use error::{ClientError, Result};
