//! Bulk edit and bulk delete payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::{Error, Result};

/// Fields that may be changed through a bulk edit
pub const EDITABLE_FIELDS: &[&str] = &[
    "situacao",
    "genero",
    "status_ecad",
    "idioma",
    "formato",
    "territorio",
    "prioridade",
    "selo",
    "album",
];

/// Body of `PUT /api/v1/fonogramas/lote`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<RecordId>,
    pub campos: BTreeMap<String, String>,
}

impl BulkUpdateRequest {
    /// Set a single field on every id
    pub fn single_field(ids: Vec<RecordId>, field: &str, value: &str) -> Result<Self> {
        let mut problems = Vec::new();
        if ids.is_empty() {
            problems.push("Selecione pelo menos um fonograma".to_string());
        }
        if !EDITABLE_FIELDS.contains(&field) {
            problems.push(format!("Campo não pode ser editado em lote: {}", field));
        }
        let value = value.trim();
        if value.is_empty() {
            problems.push("Informe o novo valor".to_string());
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }

        let mut campos = BTreeMap::new();
        campos.insert(field.to_string(), value.to_string());
        Ok(Self { ids, campos })
    }
}

/// Body of `DELETE /api/v1/fonogramas/lote`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulkUpdateSummary {
    #[serde(default)]
    pub atualizados: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulkDeleteSummary {
    #[serde(default)]
    pub deletados: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_field_body() {
        let req = BulkUpdateRequest::single_field(
            vec![RecordId::Int(1), RecordId::Int(2)],
            "situacao",
            " ATIVO ",
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"ids": [1, 2], "campos": {"situacao": "ATIVO"}})
        );
    }

    #[test]
    fn test_single_field_rejects_empty_inputs() {
        match BulkUpdateRequest::single_field(vec![], "isrc", "") {
            Err(Error::Validation(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
