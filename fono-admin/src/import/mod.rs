//! Batch import: upload, review and confirmation

pub mod error_groups;
pub mod grid;
pub mod pipeline;

pub use error_groups::{ErrorDetail, ErrorGroup, ErrorPanel, INITIAL_GROUPS};
pub use grid::{GridRow, ReviewGrid, OVERSCAN, ROW_HEIGHT};
pub use pipeline::{ConfirmTicket, ImportPipeline, ImportState, StateTransition, UploadTicket};
