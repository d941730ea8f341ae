//! Fonograma (phonogram) records and their participants

use serde::{Deserialize, Serialize};

use super::ecad::EcadStatus;
use super::RecordId;
use crate::api::PageInfo;
use crate::validation;
use crate::{Error, Result};

/// Full phonogram record as served by `GET /api/v1/fonogramas/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Fonograma {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    // Identification
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub titulo_obra: Option<String>,
    #[serde(default)]
    pub duracao: Option<String>,
    #[serde(default)]
    pub ano_lanc: Option<i32>,
    #[serde(default)]
    pub ano_grav: Option<i32>,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    pub versao: Option<String>,
    #[serde(default)]
    pub idioma: Option<String>,
    #[serde(default)]
    pub cod_interno: Option<String>,
    #[serde(default)]
    pub cod_obra: Option<String>,
    #[serde(default)]
    pub cod_ecad: Option<String>,

    // Origin
    #[serde(default)]
    pub pais_origem: Option<String>,
    #[serde(default)]
    pub flag_nacional: Option<String>,

    // Producer
    #[serde(default)]
    pub prod_nome: Option<String>,
    #[serde(default)]
    pub prod_doc: Option<String>,
    #[serde(default)]
    pub prod_fantasia: Option<String>,
    #[serde(default)]
    pub prod_perc: Option<f64>,
    #[serde(default)]
    pub prod_assoc: Option<String>,

    // Release
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub faixa: Option<i32>,
    #[serde(default)]
    pub selo: Option<String>,
    #[serde(default)]
    pub formato: Option<String>,
    #[serde(default)]
    pub pais: Option<String>,
    #[serde(default)]
    pub tipo_lanc: Option<String>,
    #[serde(default)]
    pub data_lanc: Option<String>,

    // Management
    #[serde(default)]
    pub situacao: Option<String>,
    #[serde(default)]
    pub territorio: Option<String>,
    #[serde(default)]
    pub prioridade: Option<String>,
    #[serde(default, skip_serializing)]
    pub status_ecad: Option<EcadStatus>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,

    // Participants
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub autores: Vec<Autor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editoras: Vec<Editora>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interpretes: Vec<Interprete>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub musicos: Vec<Musico>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentos: Vec<Documento>,
}

impl Fonograma {
    /// Check the record before it is sent to the backend
    ///
    /// Normalises the ISRC to upper case and the duration to `MM:SS` in place.
    /// Returns every problem found, not just the first.
    pub fn validate_for_submit(&mut self) -> Result<()> {
        let mut problems = Vec::new();

        match self.isrc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => problems.push("ISRC é obrigatório".to_string()),
            Some(isrc) => {
                let isrc = isrc.to_uppercase();
                if !validation::is_valid_isrc(&isrc) {
                    problems.push("ISRC inválido. Formato esperado: BRXXXYYNNNNN".to_string());
                }
                self.isrc = Some(isrc);
            }
        }

        if self.titulo.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            problems.push("Título é obrigatório".to_string());
        }

        if let Some(duracao) = self.duracao.as_deref().filter(|d| !d.trim().is_empty()) {
            match validation::normalize_duration(duracao) {
                Some(formatted) => self.duracao = Some(formatted),
                None => problems.push(format!("Duração inválida: {} (use MM:SS)", duracao)),
            }
        }

        if let Some(doc) = self.prod_doc.as_deref().filter(|d| !d.trim().is_empty()) {
            if !validation::is_valid_document(doc) {
                problems.push(format!("Documento do produtor inválido: {}", doc));
            }
        }

        for autor in &self.autores {
            if !validation::is_valid_cpf(&autor.cpf) {
                problems.push(format!("CPF inválido para o autor {}", autor.nome));
            }
        }
        for editora in &self.editoras {
            if !validation::is_valid_cnpj(&editora.cnpj) {
                problems.push(format!("CNPJ inválido para a editora {}", editora.nome));
            }
        }
        for interprete in &self.interpretes {
            if !validation::is_valid_document(&interprete.doc) {
                problems.push(format!("Documento inválido para o intérprete {}", interprete.nome));
            }
        }
        for musico in &self.musicos {
            if !validation::is_valid_cpf(&musico.cpf) {
                problems.push(format!("CPF inválido para o músico {}", musico.nome));
            }
        }

        if !self.autores.is_empty() {
            let shares: Vec<f64> = self.autores.iter().map(|a| a.percentual).collect();
            if !validation::shares_total_100(&shares) {
                problems.push("Percentuais dos autores devem somar 100%".to_string());
            }
        }
        if !self.editoras.is_empty() {
            let shares: Vec<f64> = self.editoras.iter().map(|e| e.percentual).collect();
            if !validation::shares_total_100(&shares) {
                problems.push("Percentuais das editoras devem somar 100%".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems))
        }
    }
}

/// Author (composer, lyricist, ...)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Autor {
    pub nome: String,
    pub cpf: String,
    pub funcao: String,
    pub percentual: f64,
    #[serde(default)]
    pub cae_ipi: Option<String>,
}

/// Music publisher
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Editora {
    pub nome: String,
    pub cnpj: String,
    pub percentual: f64,
}

/// Performer; `doc` is a CPF or a CNPJ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Interprete {
    pub nome: String,
    pub doc: String,
    pub categoria: String,
    pub percentual: f64,
    #[serde(default)]
    pub associacao: Option<String>,
}

/// Session musician
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Musico {
    pub nome: String,
    pub cpf: String,
    pub instrumento: String,
    pub tipo: String,
    pub percentual: f64,
}

/// Supporting document (contract, declaration, ...)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Documento {
    pub tipo: String,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Listing row
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FonogramaSummary {
    pub id: RecordId,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub titulo_obra: Option<String>,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    pub prod_nome: Option<String>,
    #[serde(default)]
    pub situacao: Option<String>,
    #[serde(default)]
    pub status_ecad: Option<EcadStatus>,
    #[serde(default)]
    pub tentativas_envio: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FonogramaSummary {
    /// Status shown in the ECAD selection tab; unknown means never sent
    pub fn ecad_status_or_unsent(&self) -> EcadStatus {
        self.status_ecad.clone().unwrap_or(EcadStatus::NaoEnviado)
    }
}

/// `data` payload of `GET /api/v1/fonogramas`
///
/// Accepts `{ "fonogramas": [...], "pagination": {...} }` or a bare array, in
/// which case pagination comes from the envelope's `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FonogramaPage {
    pub fonogramas: Vec<FonogramaSummary>,
    pub pagination: PageInfo,
}

impl<'de> Deserialize<'de> for FonogramaPage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(Vec<FonogramaSummary>),
            Wrapped {
                #[serde(default)]
                fonogramas: Vec<FonogramaSummary>,
                #[serde(default)]
                pagination: PageInfo,
            },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Bare(fonogramas) => FonogramaPage {
                fonogramas,
                pagination: PageInfo::default(),
            },
            Wire::Wrapped {
                fonogramas,
                pagination,
            } => FonogramaPage {
                fonogramas,
                pagination,
            },
        })
    }
}

/// Listing filters; empty strings are treated as unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FonogramaFilters {
    pub search: Option<String>,
    pub situacao: Option<String>,
    pub genero: Option<String>,
    pub status_ecad: Option<String>,
}

impl FonogramaFilters {
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Non-empty filters as query parameters
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("situacao", &self.situacao),
            ("genero", &self.genero),
            ("status_ecad", &self.status_ecad),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}
