//! ECAD submission workflows: envios, candidate selection, return import

use std::path::{Path, PathBuf};

use fono_common::models::{
    EcadStats, EcadStatus, EnvioDetail, EnvioList, EnvioSummary, FonogramaPage, FonogramaSummary,
    GenerateRequest, GeneratedFile, OutputFormat, ReturnSummary,
};
use fono_common::RecordId;
use tracing::{debug, info, warn};

use crate::client::{ApiClient, Reply};
use crate::error::{ClientError, Result};
use crate::inflight::{InFlight, Ticket};
use crate::selection::Selection;
use crate::upload::{check_return_file, UploadFile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EcadTab {
    #[default]
    Envios,
    Selecao,
    Retorno,
}

/// Keep the rows whose status (missing means never sent) matches `status`
pub fn filter_candidates(
    rows: Vec<FonogramaSummary>,
    status: Option<&EcadStatus>,
) -> Vec<FonogramaSummary> {
    match status {
        None => rows,
        Some(wanted) => rows
            .into_iter()
            .filter(|row| &row.ecad_status_or_unsent() == wanted)
            .collect(),
    }
}

/// ECAD page state
#[derive(Debug, Default)]
pub struct EcadPage {
    tab: EcadTab,
    stats: EcadStats,
    envios: Vec<EnvioSummary>,
    candidates: Vec<FonogramaSummary>,
    status_filter: Option<EcadStatus>,
    selection: Selection,
    formato: OutputFormat,
    overview_load: InFlight,
    candidate_load: InFlight,
    generating: InFlight,
    importing: InFlight,
    reload_needed: bool,
    last_error: Option<String>,
    notice: Option<String>,
}

impl EcadPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> EcadTab {
        self.tab
    }

    pub fn stats(&self) -> &EcadStats {
        &self.stats
    }

    pub fn envios(&self) -> &[EnvioSummary] {
        &self.envios
    }

    pub fn candidates(&self) -> &[FonogramaSummary] {
        &self.candidates
    }

    pub fn status_filter(&self) -> Option<&EcadStatus> {
        self.status_filter.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn formato(&self) -> OutputFormat {
        self.formato
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Stats and envios are out of date
    pub fn reload_needed(&self) -> bool {
        self.reload_needed
    }

    /// Switch tabs; returns true when the caller should load candidates
    pub fn select_tab(&mut self, tab: EcadTab) -> bool {
        self.tab = tab;
        tab == EcadTab::Selecao
    }

    pub fn set_formato(&mut self, formato: OutputFormat) {
        self.formato = formato;
    }

    fn record_error(&mut self, context: &str, e: &ClientError) {
        warn!("{}: {}", context, e);
        self.last_error = Some(e.report_lines().join("\n"));
    }

    // ----------------------------------------------------------------------
    // Overview: stats + envios
    // ----------------------------------------------------------------------

    pub fn begin_overview(&mut self) -> Ticket {
        self.overview_load.begin_replacing()
    }

    pub fn finish_overview(&mut self, ticket: Ticket, result: Result<(EcadStats, EnvioList)>) -> bool {
        if !self.overview_load.finish(ticket) {
            debug!("Discarding stale ECAD overview");
            return false;
        }
        match result {
            Ok((stats, list)) => {
                self.stats = stats;
                self.envios = list.envios;
                self.reload_needed = false;
            }
            Err(e) => self.record_error("ECAD overview load failed", &e),
        }
        true
    }

    // ----------------------------------------------------------------------
    // Candidates
    // ----------------------------------------------------------------------

    /// Change the status filter; an outstanding candidate load becomes stale
    pub fn set_status_filter(&mut self, status: Option<EcadStatus>) {
        self.status_filter = status;
        self.candidate_load.invalidate();
    }

    pub fn begin_candidates(&mut self) -> (Ticket, Option<EcadStatus>) {
        (self.candidate_load.begin_replacing(), self.status_filter.clone())
    }

    pub fn finish_candidates(&mut self, ticket: Ticket, result: Result<FonogramaPage>) -> bool {
        if !self.candidate_load.finish(ticket) {
            debug!("Discarding stale candidate list");
            return false;
        }
        match result {
            Ok(listing) => {
                self.candidates = filter_candidates(listing.fonogramas, self.status_filter.as_ref());
            }
            Err(e) => self.record_error("Candidate load failed", &e),
        }
        true
    }

    pub fn toggle(&mut self, id: RecordId) -> bool {
        self.selection.toggle(id)
    }

    fn candidate_ids(&self) -> Vec<RecordId> {
        self.candidates.iter().map(|c| c.id.clone()).collect()
    }

    pub fn header_checked(&self) -> bool {
        self.selection.all_selected(&self.candidate_ids())
    }

    pub fn set_header(&mut self, checked: bool) {
        let ids = self.candidate_ids();
        self.selection.set_all(&ids, checked);
    }

    // ----------------------------------------------------------------------
    // Generate
    // ----------------------------------------------------------------------

    pub fn generate_enabled(&self) -> bool {
        !self.selection.is_empty() && !self.generating.is_busy()
    }

    /// Validate the selection and claim the generate slot
    pub fn begin_generate(&mut self) -> Result<(Ticket, GenerateRequest)> {
        let request = GenerateRequest::new(self.selection.ids(), self.formato)?;
        let ticket = self.generating.begin()?;
        Ok((ticket, request))
    }

    pub fn finish_generate(&mut self, ticket: Ticket, result: Result<Reply<GeneratedFile>>) -> bool {
        if !self.generating.finish(ticket) {
            return false;
        }
        match result {
            Ok(reply) => {
                let file = reply.data;
                let notice = format!(
                    "Arquivo gerado! Protocolo: {} ({} fonograma(s))",
                    file.protocolo, file.total_fonogramas
                );
                info!("{}", notice);
                self.notice = Some(notice);
                self.last_error = None;
                self.selection.clear();
                self.tab = EcadTab::Envios;
                self.reload_needed = true;
            }
            Err(e) => self.record_error("ECAD generation failed", &e),
        }
        true
    }

    // ----------------------------------------------------------------------
    // Return import
    // ----------------------------------------------------------------------

    pub fn begin_import_return(&mut self, file: &UploadFile) -> Result<Ticket> {
        check_return_file(file)?;
        self.importing.begin()
    }

    pub fn finish_import_return(&mut self, ticket: Ticket, result: Result<Reply<ReturnSummary>>) -> bool {
        if !self.importing.finish(ticket) {
            return false;
        }
        match result {
            Ok(reply) => {
                let summary = reply.data;
                let notice = format!(
                    "Retorno processado: {} processado(s), {} aceito(s), {} recusado(s)",
                    summary.processados, summary.aceitos, summary.recusados
                );
                info!("{}", notice);
                self.notice = Some(notice);
                self.last_error = None;
                self.reload_needed = true;
            }
            Err(e) => self.record_error("Return import failed", &e),
        }
        true
    }

    /// Name used when the download carries no `Content-Disposition`
    pub fn download_fallback_name(&self, id: &RecordId) -> String {
        let extension = self
            .envios
            .iter()
            .find(|e| &e.id == id)
            .and_then(|e| e.formato_arquivo.as_deref())
            .filter(|f| f.eq_ignore_ascii_case("txt"))
            .map_or("xlsx", |_| "txt");
        format!("envio_{}.{}", id, extension)
    }

    // ----------------------------------------------------------------------
    // Drivers: begin, await, finish
    // ----------------------------------------------------------------------

    /// Reload stats and envios
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<()> {
        let ticket = self.begin_overview();
        match tokio::try_join!(client.ecad_stats(), client.ecad_envios()) {
            Ok(overview) => {
                self.finish_overview(ticket, Ok(overview));
                Ok(())
            }
            Err(e) => {
                if self.overview_load.finish(ticket) {
                    self.record_error("ECAD overview load failed", &e);
                }
                Err(e)
            }
        }
    }

    /// Reload the overview after a request the server already accepted
    ///
    /// A failure lands in `last_error`; the notice and the returned outcome stand.
    async fn refresh_after_mutation(&mut self, client: &ApiClient) {
        if let Err(e) = self.refresh(client).await {
            warn!("Overview reload after a successful change failed: {}", e);
        }
    }

    pub async fn load_candidates(&mut self, client: &ApiClient) -> Result<()> {
        let (ticket, status) = self.begin_candidates();
        match client.list_candidates(status.as_ref().map(EcadStatus::as_str)).await {
            Ok(listing) => {
                self.finish_candidates(ticket, Ok(listing));
                Ok(())
            }
            Err(e) => {
                if self.candidate_load.finish(ticket) {
                    self.record_error("Candidate load failed", &e);
                }
                Err(e)
            }
        }
    }

    /// Generate a submission file for the selection, then reload the overview
    pub async fn generate(&mut self, client: &ApiClient) -> Result<GeneratedFile> {
        let (ticket, request) = self.begin_generate()?;
        match client.ecad_generate(&request).await {
            Ok(reply) => {
                let file = reply.data.clone();
                self.finish_generate(ticket, Ok(reply));
                self.refresh_after_mutation(client).await;
                Ok(file)
            }
            Err(e) => {
                if self.generating.finish(ticket) {
                    self.record_error("ECAD generation failed", &e);
                }
                Err(e)
            }
        }
    }

    /// Upload an ECAD return file, then reload the overview
    pub async fn import_return(&mut self, client: &ApiClient, file: &UploadFile) -> Result<ReturnSummary> {
        let ticket = self.begin_import_return(file)?;
        match client.ecad_import_return(file).await {
            Ok(reply) => {
                let summary = reply.data;
                self.finish_import_return(ticket, Ok(reply));
                self.refresh_after_mutation(client).await;
                Ok(summary)
            }
            Err(e) => {
                if self.importing.finish(ticket) {
                    self.record_error("Return import failed", &e);
                }
                Err(e)
            }
        }
    }

    pub async fn detail(&self, client: &ApiClient, id: &RecordId) -> Result<EnvioDetail> {
        client.ecad_envio(id).await
    }

    /// Download an envio's generated file into `dir`
    pub async fn download(&self, client: &ApiClient, id: &RecordId, dir: &Path) -> Result<PathBuf> {
        let file = client.ecad_download(id).await?;
        let path = file.save(dir, &self.download_fallback_name(id)).await?;
        info!("Saved envio {} to {}", id, path.display());
        Ok(path)
    }
}
