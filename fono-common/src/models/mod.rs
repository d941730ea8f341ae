//! Domain models for the phonogram registry
//!
//! These mirror the JSON served by the backend. Field names keep the wire
//! (Portuguese) spelling; every field except the identifier is optional
//! because list and detail endpoints serialize different subsets.

pub mod bulk;
pub mod ecad;
pub mod fonograma;
pub mod import;
pub mod record_id;

pub use bulk::{BulkDeleteRequest, BulkDeleteSummary, BulkUpdateRequest, BulkUpdateSummary};
pub use ecad::{
    EcadStats, EcadStatus, EnvioDetail, EnvioFonograma, EnvioList, EnvioSummary, GenerateRequest,
    GeneratedFile, OutputFormat, ReturnSummary,
};
pub use fonograma::{
    Autor, Documento, Editora, Fonograma, FonogramaFilters, FonogramaPage, FonogramaSummary,
    Interprete, Musico,
};
pub use import::{
    CellValue, ConfirmSummary, ImportSummary, ImportedRow, ValidationError, ValidationReport,
};
pub use record_id::RecordId;
