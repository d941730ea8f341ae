//! # Fono Common Library
//!
//! Shared code for the phonogram registry administration tools:
//! - API envelope and pagination types
//! - Domain models (fonogramas, participants, ECAD submissions, batch import)
//! - Configuration loading
//! - Client-side validators (ISRC, CPF, CNPJ, durations)
//! - Display helpers (truncation, timestamps)

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod text;
pub mod time;
pub mod validation;

pub use error::{Error, Result};
pub use models::RecordId;
