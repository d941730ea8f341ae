//! Files sent as `multipart/form-data`
//!
//! Each upload endpoint accepts a fixed set of spreadsheet formats. Files are
//! checked against the allow-list before any request is built.

use std::path::Path;

use crate::error::{ClientError, Result};

pub const MIME_CSV: &str = "text/csv";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_TXT: &str = "text/plain";

/// Formats accepted by the batch import validation endpoint
pub const IMPORT_FORMATS: &[(&str, &str)] = &[("csv", MIME_CSV), ("xls", MIME_XLS), ("xlsx", MIME_XLSX)];

/// Formats accepted for ECAD return files
pub const RETURN_FORMATS: &[(&str, &str)] = &[
    ("csv", MIME_CSV),
    ("xls", MIME_XLS),
    ("xlsx", MIME_XLSX),
    ("txt", MIME_TXT),
];

pub const UNSUPPORTED_IMPORT_MESSAGE: &str = "Formato não suportado: use CSV, XLS ou XLSX";
pub const UNSUPPORTED_RETURN_MESSAGE: &str = "Formato não suportado: use XLSX, XLS, CSV ou TXT";

/// A file read into memory, ready to be attached to a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory content; the MIME type is derived from the extension
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).unwrap_or("application/octet-stream").to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a file from disk
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::UnsupportedFile(format!("Not a file: {}", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// MIME type for a known spreadsheet extension
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = extension(file_name)?;
    RETURN_FORMATS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// A file passes when its extension or its MIME type is on the list
pub fn is_allowed(file_name: &str, mime: &str, formats: &[(&str, &str)]) -> bool {
    let by_extension = extension(file_name)
        .map(|ext| formats.iter().any(|(known, _)| *known == ext))
        .unwrap_or(false);
    let mime = mime.trim().to_lowercase();
    by_extension || formats.iter().any(|(_, known)| *known == mime)
}

/// Check a file destined for the batch import endpoint
pub fn check_import_file(file: &UploadFile) -> Result<()> {
    if is_allowed(&file.file_name, &file.mime, IMPORT_FORMATS) {
        Ok(())
    } else {
        Err(ClientError::UnsupportedFile(UNSUPPORTED_IMPORT_MESSAGE.to_string()))
    }
}

/// Check an ECAD return file
pub fn check_return_file(file: &UploadFile) -> Result<()> {
    if is_allowed(&file.file_name, &file.mime, RETURN_FORMATS) {
        Ok(())
    } else {
        Err(ClientError::UnsupportedFile(UNSUPPORTED_RETURN_MESSAGE.to_string()))
    }
}
