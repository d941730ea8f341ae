//! Batch import state machine
//!
//! Idle → Uploading → Reviewing → Confirming → Idle. A failed upload returns
//! to Idle with a message, a failed confirmation returns to Reviewing. Each
//! upload gets a fresh session id; a response carrying any other id is
//! discarded, which is how `clear()` abandons an in-flight upload.

use chrono::{DateTime, Utc};
use fono_common::models::{ConfirmSummary, ImportSummary, ImportedRow, ValidationReport};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error_groups::ErrorPanel;
use super::grid::ReviewGrid;
use crate::client::{ApiClient, Reply, UPLOAD_FAILURE};
use crate::error::{ClientError, Result};
use crate::upload::{check_import_file, UploadFile};

/// Import workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportState {
    /// Waiting for a file
    Idle,
    /// File sent to the validation endpoint
    Uploading,
    /// Rows and errors on screen
    Reviewing,
    /// Clean rows sent for persistence
    Confirming,
}

/// State transition record
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub session_id: Option<Uuid>,
    pub old_state: ImportState,
    pub new_state: ImportState,
    pub transitioned_at: DateTime<Utc>,
}

/// Handle for an outstanding upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    session_id: Uuid,
}

/// Handle for an outstanding confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmTicket {
    session_id: Uuid,
    rows: Vec<ImportedRow>,
}

impl ConfirmTicket {
    /// Rows to submit: every row whose line has no error
    pub fn rows(&self) -> &[ImportedRow] {
        &self.rows
    }
}

/// Batch import page state
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    state: ImportState,
    session_id: Option<Uuid>,
    file_name: Option<String>,
    grid: Option<ReviewGrid>,
    panel: ErrorPanel,
    summary: ImportSummary,
    last_error: Option<String>,
    notice: Option<String>,
    transitions: Vec<StateTransition>,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportPipeline {
    pub fn new() -> Self {
        Self {
            state: ImportState::Idle,
            session_id: None,
            file_name: None,
            grid: None,
            panel: ErrorPanel::default(),
            summary: ImportSummary::default(),
            last_error: None,
            notice: None,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The upload trigger is disabled while a file is in flight or being confirmed
    pub fn upload_enabled(&self) -> bool {
        !matches!(self.state, ImportState::Uploading | ImportState::Confirming)
    }

    pub fn confirm_enabled(&self) -> bool {
        self.state == ImportState::Reviewing
    }

    pub fn grid(&self) -> Option<&ReviewGrid> {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> Option<&mut ReviewGrid> {
        self.grid.as_mut()
    }

    pub fn panel(&self) -> &ErrorPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ErrorPanel {
        &mut self.panel
    }

    pub fn summary(&self) -> ImportSummary {
        self.summary
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Every state change since this pipeline was created
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    fn transition_to(&mut self, new_state: ImportState) {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        debug!(
            session_id = ?transition.session_id,
            "Import state {:?} -> {:?}",
            transition.old_state,
            transition.new_state
        );
        self.state = new_state;
        self.transitions.push(transition);
    }

    fn discard_result(&mut self) {
        self.grid = None;
        self.panel = ErrorPanel::default();
        self.summary = ImportSummary::default();
    }

    /// Accept a file and start a new session
    ///
    /// A rejected file leaves the state untouched apart from the message.
    pub fn begin_upload(&mut self, file: &UploadFile) -> Result<UploadTicket> {
        if !self.upload_enabled() {
            return Err(ClientError::Busy);
        }
        if let Err(e) = check_import_file(file) {
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.file_name = Some(file.file_name.clone());
        self.last_error = None;
        self.notice = None;
        self.discard_result();
        self.transition_to(ImportState::Uploading);
        info!(session_id = %session_id, file = %file.file_name, "Uploading import file");

        Ok(UploadTicket { session_id })
    }

    /// Apply the validation response; returns false when it was stale
    pub fn finish_upload(&mut self, ticket: UploadTicket, result: Result<ValidationReport>) -> bool {
        let report = match result {
            Ok(report) => report,
            Err(e) => return self.fail_upload(ticket, &e),
        };
        if !self.is_current(ticket.session_id, ImportState::Uploading) {
            return false;
        }

        self.summary = report.summary();
        self.grid = Some(ReviewGrid::new(report.rows, &report.errors));
        self.panel = ErrorPanel::build(report.errors);
        info!(
            total_linhas = self.summary.total_linhas,
            linhas_com_erro = self.summary.linhas_com_erro,
            total_erros = self.summary.total_erros,
            "Import file validated"
        );
        self.transition_to(ImportState::Reviewing);
        true
    }

    fn fail_upload(&mut self, ticket: UploadTicket, error: &ClientError) -> bool {
        if !self.is_current(ticket.session_id, ImportState::Uploading) {
            return false;
        }
        warn!("Import upload failed: {}", error);
        self.last_error = Some(upload_failure_message(error));
        self.session_id = None;
        self.transition_to(ImportState::Idle);
        true
    }

    fn is_current(&self, session_id: Uuid, expected: ImportState) -> bool {
        let current = self.session_id == Some(session_id) && self.state == expected;
        if !current {
            debug!(session_id = %session_id, "Discarding stale import response");
        }
        current
    }

    /// Drop everything and return to Idle without contacting the server
    pub fn clear(&mut self) {
        self.session_id = None;
        self.file_name = None;
        self.last_error = None;
        self.notice = None;
        self.discard_result();
        if self.state != ImportState::Idle {
            self.transition_to(ImportState::Idle);
        }
    }

    /// Start persisting the clean rows of the current review
    pub fn begin_confirm(&mut self) -> Result<ConfirmTicket> {
        if self.state != ImportState::Reviewing {
            return Err(ClientError::InvalidState(format!(
                "Cannot confirm while {:?}",
                self.state
            )));
        }
        let session_id = self
            .session_id
            .ok_or_else(|| ClientError::InvalidState("No import session".to_string()))?;

        let rows = self.grid.as_ref().map(ReviewGrid::clean_rows).unwrap_or_default();
        if rows.is_empty() {
            return Err(ClientError::Validation(vec![
                "Nenhuma linha válida para importar".to_string(),
            ]));
        }

        self.last_error = None;
        self.transition_to(ImportState::Confirming);
        Ok(ConfirmTicket { session_id, rows })
    }

    /// Apply the confirmation response; returns false when it was stale
    pub fn finish_confirm(&mut self, ticket: ConfirmTicket, result: Result<Reply<ConfirmSummary>>) -> bool {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => return self.fail_confirm(&ticket, &e),
        };
        if !self.is_current(ticket.session_id, ImportState::Confirming) {
            return false;
        }

        let notice = format!(
            "Importação concluída! Novos: {}, Atualizados: {}",
            reply.data.salvos, reply.data.atualizados
        );
        info!("{}", notice);
        self.clear();
        self.notice = Some(notice);
        true
    }

    fn fail_confirm(&mut self, ticket: &ConfirmTicket, error: &ClientError) -> bool {
        if !self.is_current(ticket.session_id, ImportState::Confirming) {
            return false;
        }
        warn!("Import confirmation failed: {}", error);
        self.last_error = Some(error.report_lines().join("\n"));
        self.transition_to(ImportState::Reviewing);
        true
    }

    /// Upload and apply the result in one step
    pub async fn upload(&mut self, client: &ApiClient, file: &UploadFile) -> Result<ImportSummary> {
        let ticket = self.begin_upload(file)?;
        match client.validate_import(file).await {
            Ok(report) => {
                self.finish_upload(ticket, Ok(report));
                Ok(self.summary)
            }
            Err(e) => {
                self.fail_upload(ticket, &e);
                Err(e)
            }
        }
    }

    /// Confirm and apply the result in one step
    pub async fn confirm(&mut self, client: &ApiClient) -> Result<ConfirmSummary> {
        let ticket = self.begin_confirm()?;
        match client.confirm_import(ticket.rows()).await {
            Ok(reply) => {
                let summary = reply.data;
                self.finish_confirm(ticket, Ok(reply));
                Ok(summary)
            }
            Err(e) => {
                self.fail_confirm(&ticket, &e);
                Err(e)
            }
        }
    }
}

/// Server message for business failures, generic text for everything else
fn upload_failure_message(error: &ClientError) -> String {
    match error {
        ClientError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
        _ => UPLOAD_FAILURE.to_string(),
    }
}
