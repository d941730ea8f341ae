//! Batch import payloads returned by the validation endpoint

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw spreadsheet cell
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Null or blank text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part of whole floats: 3.0, not 3
            CellValue::Float(x) => write!(f, "{:?}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One parsed spreadsheet line: column name → cell, in file column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedRow {
    cells: Vec<(String, CellValue)>,
}

impl ImportedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and stub servers
    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a cell, replacing an existing value for the same column in place
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, cell)) => *cell = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for ImportedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ImportedRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = ImportedRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to cell value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ImportedRow, A::Error> {
                let mut row = ImportedRow {
                    cells: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((column, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A problem found on one line of an uploaded file
///
/// `line` is 1-based and matches the row's position in the returned rows.
/// Line 0 denotes a file-level problem.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValidationError {
    #[serde(rename = "linha", alias = "line", default)]
    pub line: u32,

    #[serde(rename = "campo", alias = "field", default)]
    pub field: Option<String>,

    #[serde(rename = "valor", alias = "value", default)]
    pub value: CellValue,

    #[serde(rename = "erro", alias = "message", default)]
    pub message: String,
}

/// Response of `POST /api/lote/validar`
///
/// `rows` travel in the envelope's `data`, `errors` alongside it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub rows: Vec<ImportedRow>,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn summary(&self) -> ImportSummary {
        let lines: HashSet<u32> = self.errors.iter().map(|e| e.line).collect();
        let total_linhas = self.rows.len() as u64;
        let linhas_com_erro = lines.len() as u64;
        ImportSummary {
            total_linhas,
            linhas_com_erro,
            linhas_validas: total_linhas.saturating_sub(linhas_com_erro),
            total_erros: self.errors.len() as u64,
        }
    }

    /// Rows whose line has no error, in file order
    pub fn valid_rows(&self) -> Vec<ImportedRow> {
        let lines: HashSet<u32> = self.errors.iter().map(|e| e.line).collect();
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !lines.contains(&(*index as u32 + 1)))
            .map(|(_, row)| row.clone())
            .collect()
    }
}

/// Result of `POST /api/lote/confirmar`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfirmSummary {
    /// New fonogramas created
    #[serde(default)]
    pub salvos: u64,
    /// Existing fonogramas (matched by ISRC) updated
    #[serde(default)]
    pub atualizados: u64,
}

/// Counters shown above the review grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_linhas: u64,
    pub linhas_com_erro: u64,
    pub linhas_validas: u64,
    pub total_erros: u64,
}
