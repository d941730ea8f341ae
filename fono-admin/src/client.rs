//! REST client for the phonogram registry backend
//!
//! Every endpoint answers with the standard envelope
//! (`{ success, data, error, message }`). A response counts as successful only
//! when the HTTP status is 2xx and `success` is true; anything else becomes
//! [`ClientError::Server`] carrying the server's own message.

use std::path::Path;
use std::time::Duration;

use fono_common::api::{ApiEnvelope, ServerFailure};
use fono_common::config::{normalize_base_url, AdminConfig};
use fono_common::models::{
    BulkDeleteRequest, BulkDeleteSummary, BulkUpdateRequest, BulkUpdateSummary, ConfirmSummary,
    EcadStats, EnvioDetail, EnvioList, Fonograma, FonogramaFilters, FonogramaPage, GenerateRequest,
    GeneratedFile, ImportedRow, ReturnSummary, ValidationError, ValidationReport,
};
use fono_common::RecordId;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bulk::{ConfirmedDelete, DeleteScope};
use crate::error::{ClientError, Result};
use crate::upload::{check_import_file, check_return_file, UploadFile};

const USER_AGENT: &str = concat!("fono-admin/", env!("CARGO_PKG_VERSION"));

/// Fallback shown when a failed response carries no message
pub const GENERIC_FAILURE: &str = "Erro ao processar requisição";

/// Fallback for a failed validation upload
pub const UPLOAD_FAILURE: &str = "Falha ao processar arquivo.";

/// Page size used when loading ECAD submission candidates
pub const CANDIDATE_PAGE_SIZE: u32 = 100;

/// Successful payload plus the envelope's message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub data: T,
    pub message: Option<String>,
}

/// A file returned by a download endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// From `Content-Disposition`, when the server sent one
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    /// Write into `dir`, falling back to `fallback_name`
    pub async fn save(&self, dir: &Path, fallback_name: &str) -> Result<std::path::PathBuf> {
        let name = self.file_name.as_deref().unwrap_or(fallback_name);
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// `/api/lote/validar` puts the error list beside the envelope fields
#[derive(Deserialize)]
struct ValidationEnvelope {
    #[serde(flatten)]
    envelope: ApiEnvelope<Vec<ImportedRow>>,
    #[serde(default)]
    errors: Vec<ValidationError>,
}

#[derive(Serialize)]
struct ConfirmRequest<'a> {
    rows: &'a [ImportedRow],
}

/// Typed client over `reqwest`
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        Self::new(&config.api_url, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "API request");
        self.http_client.request(method, url)
    }

    /// Send and unwrap the envelope, failing on non-2xx or `success: false`
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<ApiEnvelope<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_envelope(status, &body, fallback)
    }

    async fn call_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Reply<T>> {
        let envelope = self.call::<T>(request, GENERIC_FAILURE).await?;
        let message = envelope.message;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::Decode("Response has no data".to_string()))?;
        Ok(Reply { data, message })
    }

    // ----------------------------------------------------------------------
    // Fonogramas
    // ----------------------------------------------------------------------

    /// One listing page
    pub async fn list_fonogramas(
        &self,
        page: u32,
        per_page: u32,
        filters: &FonogramaFilters,
    ) -> Result<FonogramaPage> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        query.extend(filters.query_pairs());

        let envelope = self
            .call::<FonogramaPage>(
                self.request(Method::GET, "/api/v1/fonogramas").query(&query),
                GENERIC_FAILURE,
            )
            .await?;

        let mut listing = envelope.data.unwrap_or_default();
        if let Some(meta) = envelope.meta {
            listing.pagination = meta;
        }
        Ok(listing)
    }

    /// Candidates for an ECAD submission (first 100 rows, optionally by status)
    pub async fn list_candidates(&self, status_ecad: Option<&str>) -> Result<FonogramaPage> {
        let filters = FonogramaFilters {
            status_ecad: status_ecad.map(str::to_string),
            ..Default::default()
        };
        self.list_fonogramas(1, CANDIDATE_PAGE_SIZE, &filters).await
    }

    pub async fn get_fonograma(&self, id: &RecordId) -> Result<Fonograma> {
        let path = format!("/api/v1/fonogramas/{}", id);
        Ok(self.call_data(self.request(Method::GET, &path)).await?.data)
    }

    /// Validate locally, then create
    pub async fn create_fonograma(&self, fonograma: &mut Fonograma) -> Result<Reply<Fonograma>> {
        fonograma.validate_for_submit()?;
        self.call_data(self.request(Method::POST, "/api/v1/fonogramas").json(&*fonograma))
            .await
    }

    /// Validate locally, then replace the record
    pub async fn update_fonograma(
        &self,
        id: &RecordId,
        fonograma: &mut Fonograma,
    ) -> Result<Reply<Fonograma>> {
        fonograma.validate_for_submit()?;
        let path = format!("/api/v1/fonogramas/{}", id);
        self.call_data(self.request(Method::PUT, &path).json(&*fonograma))
            .await
    }

    /// Apply one field change to many records
    pub async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<Reply<BulkUpdateSummary>> {
        let envelope = self
            .call::<BulkUpdateSummary>(
                self.request(Method::PUT, "/api/v1/fonogramas/lote").json(request),
                GENERIC_FAILURE,
            )
            .await?;
        Ok(Reply {
            data: envelope.data.unwrap_or_default(),
            message: envelope.message,
        })
    }

    /// Execute a confirmed delete
    pub async fn delete(&self, confirmed: &ConfirmedDelete) -> Result<Reply<BulkDeleteSummary>> {
        match confirmed.scope() {
            DeleteScope::Single(id) => {
                let path = format!("/api/v1/fonogramas/{}", id);
                let envelope = self
                    .call::<serde_json::Value>(self.request(Method::DELETE, &path), GENERIC_FAILURE)
                    .await?;
                Ok(Reply {
                    data: BulkDeleteSummary { deletados: 1 },
                    message: envelope.message,
                })
            }
            DeleteScope::Batch(ids) => {
                let body = BulkDeleteRequest { ids: ids.clone() };
                let envelope = self
                    .call::<BulkDeleteSummary>(
                        self.request(Method::DELETE, "/api/v1/fonogramas/lote").json(&body),
                        GENERIC_FAILURE,
                    )
                    .await?;
                Ok(Reply {
                    data: envelope.data.unwrap_or_default(),
                    message: envelope.message,
                })
            }
        }
    }

    // ----------------------------------------------------------------------
    // Batch import
    // ----------------------------------------------------------------------

    /// Upload a spreadsheet for server-side validation
    pub async fn validate_import(&self, file: &UploadFile) -> Result<ValidationReport> {
        check_import_file(file)?;
        let form = Form::new().part("file", file_part(file)?);

        let response = self
            .request(Method::POST, "/api/lote/validar")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        let parsed: ValidationEnvelope = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
            Err(_) => return Err(ClientError::server(status.as_u16(), failure_from_text(&body, UPLOAD_FAILURE))),
        };

        if !status.is_success() || !parsed.envelope.success {
            return Err(ClientError::server(
                status.as_u16(),
                parsed.envelope.failure(UPLOAD_FAILURE),
            ));
        }

        Ok(ValidationReport {
            rows: parsed.envelope.data.unwrap_or_default(),
            errors: parsed.errors,
        })
    }

    /// Persist reviewed rows
    pub async fn confirm_import(&self, rows: &[ImportedRow]) -> Result<Reply<ConfirmSummary>> {
        let envelope = self
            .call::<ConfirmSummary>(
                self.request(Method::POST, "/api/lote/confirmar")
                    .json(&ConfirmRequest { rows }),
                GENERIC_FAILURE,
            )
            .await?;
        Ok(Reply {
            data: envelope.data.unwrap_or_default(),
            message: envelope.message,
        })
    }

    // ----------------------------------------------------------------------
    // ECAD
    // ----------------------------------------------------------------------

    pub async fn ecad_stats(&self) -> Result<EcadStats> {
        Ok(self
            .call_data(self.request(Method::GET, "/api/v1/ecad/estatisticas"))
            .await?
            .data)
    }

    pub async fn ecad_envios(&self) -> Result<EnvioList> {
        let envelope = self
            .call::<EnvioList>(self.request(Method::GET, "/api/v1/ecad/envios"), GENERIC_FAILURE)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn ecad_envio(&self, id: &RecordId) -> Result<EnvioDetail> {
        let path = format!("/api/v1/ecad/envios/{}", id);
        Ok(self.call_data(self.request(Method::GET, &path)).await?.data)
    }

    /// Fetch the generated file of a submission
    pub async fn ecad_download(&self, id: &RecordId) -> Result<DownloadedFile> {
        let path = format!("/api/v1/ecad/envios/{}/download", id);
        let response = self.request(Method::GET, &path).send().await?;
        let status = response.status();

        let file_name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(content_disposition_filename);
        let body = response.bytes().await?;

        if !status.is_success() {
            let failure = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body)
                .map(|env| env.failure(GENERIC_FAILURE))
                .unwrap_or_else(|_| failure_from_text(&body, GENERIC_FAILURE));
            return Err(ClientError::server(status.as_u16(), failure));
        }

        Ok(DownloadedFile {
            file_name,
            bytes: body.to_vec(),
        })
    }

    /// Generate a submission file
    ///
    /// Business failures keep the per-record problems from `detalhes.erros`.
    pub async fn ecad_generate(&self, request: &GenerateRequest) -> Result<Reply<GeneratedFile>> {
        self.call_data(
            self.request(Method::POST, "/api/v1/ecad/gerar-arquivo")
                .json(request),
        )
        .await
    }

    /// Upload an ECAD return file
    pub async fn ecad_import_return(&self, file: &UploadFile) -> Result<Reply<ReturnSummary>> {
        check_return_file(file)?;
        let form = Form::new().part("file", file_part(file)?);
        self.call_data(
            self.request(Method::POST, "/api/v1/ecad/importar-retorno")
                .multipart(form),
        )
        .await
    }
}

fn file_part(file: &UploadFile) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime)
        .map_err(|e| ClientError::UnsupportedFile(e.to_string()))
}

/// Decode an envelope body according to the HTTP status
fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    fallback: &str,
) -> Result<ApiEnvelope<T>> {
    let envelope: ApiEnvelope<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
        Err(_) => {
            // Failure bodies may not match `T`; read them untyped
            let failure = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(body)
                .map(|env| env.failure(fallback))
                .unwrap_or_else(|_| failure_from_text(body, fallback));
            return Err(ClientError::server(status.as_u16(), failure));
        }
    };

    if !status.is_success() || !envelope.success {
        return Err(ClientError::server(status.as_u16(), envelope.failure(fallback)));
    }
    Ok(envelope)
}

fn failure_from_text(body: &[u8], fallback: &str) -> ServerFailure {
    let text = String::from_utf8_lossy(body).trim().to_string();
    ServerFailure {
        message: if text.is_empty() { fallback.to_string() } else { text },
        ..Default::default()
    }
}

/// File name from a `Content-Disposition` header, stripped of any directory part
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => Some(value.trim().trim_matches('"').to_string()),
            _ => None,
        }
    })?;

    Path::new(&raw)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}
