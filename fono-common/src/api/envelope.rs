//! Response envelope, error body and pagination metadata

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    /// `false` (or absent) means a business failure
    #[serde(default)]
    pub success: bool,

    /// Payload on success
    pub data: Option<T>,

    /// Error description on failure
    pub error: Option<ServerErrorBody>,

    /// Human-readable message (present on success and failure)
    pub message: Option<String>,

    /// Per-record diagnostics attached to some failures
    pub detalhes: Option<Value>,

    /// Pagination metadata sent next to a bare list in `data`
    #[serde(default)]
    pub meta: Option<PageInfo>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope, mainly for stub servers in tests
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            detalhes: None,
            meta: None,
        }
    }

    /// Failed envelope with a plain error string
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ServerErrorBody::Text(error.into())),
            message: None,
            detalhes: None,
            meta: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach pagination metadata
    pub fn with_meta(mut self, meta: PageInfo) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Describe this envelope as a failure
    ///
    /// Message priority: `error` → `message` → `fallback`.
    pub fn failure(&self, fallback: &str) -> ServerFailure {
        let message = self
            .error
            .as_ref()
            .map(|e| e.message().to_string())
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        let details = self.error.as_ref().map(ServerErrorBody::details).unwrap_or_default();

        let records = self
            .detalhes
            .as_ref()
            .and_then(|d| d.get("erros"))
            .and_then(|e| serde_json::from_value::<Vec<RecordIssue>>(e.clone()).ok())
            .unwrap_or_default();

        ServerFailure {
            message,
            details,
            records,
        }
    }
}

/// The `error` member of an envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ServerErrorBody {
    Text(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        message: String,
        #[serde(default)]
        details: Option<Value>,
    },
}

impl ServerErrorBody {
    pub fn message(&self) -> &str {
        match self {
            ServerErrorBody::Text(text) => text,
            ServerErrorBody::Detailed { message, .. } => message,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ServerErrorBody::Text(_) => None,
            ServerErrorBody::Detailed { code, .. } => code.as_deref(),
        }
    }

    /// Flatten `details` into display lines
    pub fn details(&self) -> Vec<String> {
        let details = match self {
            ServerErrorBody::Detailed {
                details: Some(details),
                ..
            } => details,
            _ => return Vec::new(),
        };

        match details {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Value::String(s) => vec![s.clone()],
            Value::Null => Vec::new(),
            other => vec![other.to_string()],
        }
    }
}

/// A record rejected by a batch operation (`detalhes.erros[]`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecordIssue {
    #[serde(default)]
    pub isrc: String,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub erros: Vec<String>,
}

/// Normalised description of a server-reported failure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerFailure {
    pub message: String,
    pub details: Vec<String>,
    pub records: Vec<RecordIssue>,
}

/// Pagination metadata returned by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            total: 0,
            pages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_error_string() {
        let env: ApiEnvelope<Value> =
            serde_json::from_value(json!({"success": false, "error": "Fonograma não encontrado"}))
                .unwrap();
        let failure = env.failure("generic");
        assert_eq!(failure.message, "Fonograma não encontrado");
        assert!(failure.details.is_empty());
    }

    #[test]
    fn test_detailed_error_with_details() {
        let env: ApiEnvelope<Value> = serde_json::from_value(json!({
            "success": false,
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Validação falhou",
                "details": ["ISRC é obrigatório", "Título é obrigatório"]
            }
        }))
        .unwrap();

        assert_eq!(env.error.as_ref().unwrap().code(), Some("VALIDATION_ERROR"));
        let failure = env.failure("generic");
        assert_eq!(failure.message, "Validação falhou");
        assert_eq!(failure.details.len(), 2);
    }

    #[test]
    fn test_missing_success_is_failure_with_fallback() {
        let env: ApiEnvelope<Value> = serde_json::from_value(json!({})).unwrap();
        assert!(!env.success);
        assert_eq!(env.failure("Falha ao processar arquivo.").message, "Falha ao processar arquivo.");
    }

    #[test]
    fn test_record_issues_from_detalhes() {
        let env: ApiEnvelope<Value> = serde_json::from_value(json!({
            "success": false,
            "error": "Fonogramas com pendências",
            "detalhes": {"erros": [
                {"isrc": "BRUM71200729", "titulo": "Canção", "erros": ["Autores ausentes"]}
            ]}
        }))
        .unwrap();

        let failure = env.failure("generic");
        assert_eq!(failure.records.len(), 1);
        assert_eq!(failure.records[0].erros, vec!["Autores ausentes".to_string()]);
    }
}
