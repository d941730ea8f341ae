//! ECAD submission models

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::{Error, Result};

/// Submission status of a fonograma with ECAD
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EcadStatus {
    Pendente,
    NaoEnviado,
    Enviado,
    Aceito,
    Recusado,
    /// Any status this client does not know about
    #[serde(other)]
    Desconhecido,
}

impl EcadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcadStatus::Pendente => "PENDENTE",
            EcadStatus::NaoEnviado => "NAO_ENVIADO",
            EcadStatus::Enviado => "ENVIADO",
            EcadStatus::Aceito => "ACEITO",
            EcadStatus::Recusado => "RECUSADO",
            EcadStatus::Desconhecido => "DESCONHECIDO",
        }
    }
}

impl fmt::Display for EcadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EcadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDENTE" => Ok(EcadStatus::Pendente),
            "NAO_ENVIADO" => Ok(EcadStatus::NaoEnviado),
            "ENVIADO" => Ok(EcadStatus::Enviado),
            "ACEITO" => Ok(EcadStatus::Aceito),
            "RECUSADO" => Ok(EcadStatus::Recusado),
            other => Err(Error::InvalidInput(format!("Unknown ECAD status: {}", other))),
        }
    }
}

/// `GET /api/v1/ecad/estatisticas`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EcadStats {
    #[serde(default)]
    pub total_envios: u64,
    #[serde(default)]
    pub total_fonogramas_enviados: u64,
    #[serde(default)]
    pub por_status: HashMap<String, u64>,
}

impl EcadStats {
    fn count(&self, status: EcadStatus) -> u64 {
        self.por_status.get(status.as_str()).copied().unwrap_or(0)
    }

    pub fn aceitos(&self) -> u64 {
        self.count(EcadStatus::Aceito)
    }

    pub fn recusados(&self) -> u64 {
        self.count(EcadStatus::Recusado)
    }

    /// Sent and still awaiting a return file
    pub fn pendentes(&self) -> u64 {
        self.count(EcadStatus::Enviado)
    }
}

/// Row of the submissions list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvioSummary {
    pub id: RecordId,
    #[serde(default)]
    pub protocolo: Option<String>,
    #[serde(default)]
    pub data_envio: Option<String>,
    #[serde(default)]
    pub tipo_envio: Option<String>,
    #[serde(default)]
    pub metodo: Option<String>,
    #[serde(default)]
    pub formato_arquivo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_fonogramas: u64,
    #[serde(default)]
    pub aceitos: Option<u64>,
    #[serde(default)]
    pub recusados: Option<u64>,
    #[serde(default)]
    pub arquivo_gerado: Option<String>,
}

/// `GET /api/v1/ecad/envios/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvioDetail {
    #[serde(flatten)]
    pub envio: EnvioSummary,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub fonogramas: Vec<EnvioFonograma>,
}

/// Fonograma included in a submission
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvioFonograma {
    pub id: RecordId,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub status_ecad: Option<EcadStatus>,
}

/// Submissions list payload
///
/// Accepts both a bare array and `{ "envios": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvioList {
    pub envios: Vec<EnvioSummary>,
}

impl<'de> Deserialize<'de> for EnvioList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(Vec<EnvioSummary>),
            Wrapped {
                #[serde(default)]
                envios: Vec<EnvioSummary>,
            },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Bare(envios) | Wire::Wrapped { envios } => EnvioList { envios },
        })
    }
}

/// Output format of a generated submission file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Excel,
    Txt,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "txt" => Ok(OutputFormat::Txt),
            other => Err(Error::InvalidInput(format!("Unknown output format: {}", other))),
        }
    }
}

/// Body of `POST /api/v1/ecad/gerar-arquivo`; built once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    fonograma_ids: Vec<RecordId>,
    formato: OutputFormat,
}

impl GenerateRequest {
    /// Fails when no fonograma was chosen
    pub fn new(fonograma_ids: Vec<RecordId>, formato: OutputFormat) -> Result<Self> {
        if fonograma_ids.is_empty() {
            return Err(Error::Validation(vec![
                "Selecione pelo menos um fonograma".to_string(),
            ]));
        }
        Ok(Self {
            fonograma_ids,
            formato,
        })
    }

    pub fn fonograma_ids(&self) -> &[RecordId] {
        &self.fonograma_ids
    }

    pub fn formato(&self) -> OutputFormat {
        self.formato
    }
}

/// Result of a successful file generation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratedFile {
    pub protocolo: String,
    #[serde(default)]
    pub total_fonogramas: u64,
    #[serde(default)]
    pub arquivo: Option<String>,
}

/// Result of importing an ECAD return file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReturnSummary {
    #[serde(default)]
    pub processados: u64,
    #[serde(default)]
    pub aceitos: u64,
    #[serde(default)]
    pub recusados: u64,
}
