//! Fonograma listing: filters, paging, selection and bulk actions
//!
//! Selection survives page changes as a set of ids; the header checkbox only
//! ever reflects the rows of the current page.

use fono_common::models::{FonogramaFilters, FonogramaPage, FonogramaSummary};
use fono_common::RecordId;
use tracing::{debug, info, warn};

use crate::bulk::{
    bulk_edit_request, delete_outcome, update_outcome, ConfirmedDelete, DeleteScope, PendingDelete,
};
use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::inflight::{InFlight, Ticket};
use crate::pagination::{Pagination, PAGE_SIZE};
use crate::selection::{BulkAffordances, Selection};

/// Parameters of one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: Ticket,
    pub page: u32,
    pub per_page: u32,
    pub filters: FonogramaFilters,
}

/// Listing page state
#[derive(Debug)]
pub struct ListingPage {
    filters: FonogramaFilters,
    page: u32,
    per_page: u32,
    rows: Vec<FonogramaSummary>,
    pagination: Pagination,
    selection: Selection,
    load: InFlight,
    bulk: InFlight,
    last_error: Option<String>,
    notice: Option<String>,
}

impl Default for ListingPage {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl ListingPage {
    pub fn new(per_page: u32) -> Self {
        Self {
            filters: FonogramaFilters::default(),
            page: 1,
            per_page: per_page.max(1),
            rows: Vec::new(),
            pagination: Pagination::default(),
            selection: Selection::new(),
            load: InFlight::new(),
            bulk: InFlight::new(),
            last_error: None,
            notice: None,
        }
    }

    pub fn rows(&self) -> &[FonogramaSummary] {
        &self.rows
    }

    pub fn filters(&self) -> &FonogramaFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Ids of the rows on screen, in display order
    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    // ----------------------------------------------------------------------
    // Loading
    // ----------------------------------------------------------------------

    /// Start a load; any load still outstanding becomes stale
    pub fn begin_load(&mut self) -> LoadRequest {
        LoadRequest {
            ticket: self.load.begin_replacing(),
            page: self.page,
            per_page: self.per_page,
            filters: self.filters.clone(),
        }
    }

    /// Apply a listing response; returns false when it was stale
    pub fn finish_load(&mut self, ticket: Ticket, result: Result<FonogramaPage>) -> bool {
        if !self.load.finish(ticket) {
            debug!("Discarding stale listing response");
            return false;
        }
        match result {
            Ok(listing) => {
                self.pagination = Pagination::from_page_info(&listing.pagination);
                self.page = self.pagination.page;
                self.rows = listing.fonogramas;
                self.last_error = None;
            }
            Err(e) => self.record_load_error(&e),
        }
        true
    }

    fn record_load_error(&mut self, e: &ClientError) {
        warn!("Listing load failed: {}", e);
        self.last_error = Some(e.report_lines().join("\n"));
    }

    /// Replace the filters and go back to page 1
    pub fn set_filters(&mut self, filters: FonogramaFilters) {
        self.filters = filters;
        self.page = 1;
        self.load.invalidate();
    }

    /// Clear every filter and go back to page 1
    pub fn clear_filters(&mut self) {
        self.set_filters(FonogramaFilters::default());
    }

    /// Move to a page, clamped to the known range once a load has succeeded
    pub fn go_to_page(&mut self, page: u32) {
        let page = page.max(1);
        self.page = match self.pagination.total_pages {
            0 => page,
            last => page.min(last),
        };
    }

    // ----------------------------------------------------------------------
    // Selection
    // ----------------------------------------------------------------------

    pub fn toggle(&mut self, id: RecordId) -> bool {
        self.selection.toggle(id)
    }

    /// Checked iff every visible row is selected
    pub fn header_checked(&self) -> bool {
        self.selection.all_selected(&self.visible_ids())
    }

    /// Header checkbox handler; only touches the visible rows
    pub fn set_header(&mut self, checked: bool) {
        let visible = self.visible_ids();
        self.selection.set_all(&visible, checked);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Bulk buttons are disabled while a bulk request is outstanding
    pub fn affordances(&self) -> BulkAffordances {
        if self.bulk.is_busy() {
            BulkAffordances::default()
        } else {
            self.selection.affordances()
        }
    }

    fn bulk_failed(&mut self, e: &ClientError) {
        warn!("Bulk action failed: {}", e);
        self.last_error = Some(e.report_lines().join("\n"));
    }

    fn bulk_succeeded(&mut self, notice: String) {
        info!("{}", notice);
        self.selection.clear();
        self.last_error = None;
        self.notice = Some(notice);
    }

    /// Apply a successful delete; a single delete only drops its own id
    fn delete_succeeded(&mut self, scope: &DeleteScope, notice: String) {
        match scope {
            DeleteScope::Batch(_) => self.bulk_succeeded(notice),
            DeleteScope::Single(id) => {
                info!("{}", notice);
                self.selection.deselect_all(std::iter::once(id));
                self.last_error = None;
                self.notice = Some(notice);
            }
        }
    }

    /// Reload after a mutation the server already accepted
    ///
    /// A failure lands in `last_error`; the mutation's outcome stands.
    async fn reload_after_mutation(&mut self, client: &ApiClient) {
        if let Err(e) = self.load(client).await {
            warn!("Reload after a successful change failed: {}", e);
        }
    }

    // ----------------------------------------------------------------------
    // Drivers: begin, await, finish
    // ----------------------------------------------------------------------

    pub async fn load(&mut self, client: &ApiClient) -> Result<()> {
        let request = self.begin_load();
        match client
            .list_fonogramas(request.page, request.per_page, &request.filters)
            .await
        {
            Ok(listing) => {
                self.finish_load(request.ticket, Ok(listing));
                Ok(())
            }
            Err(e) => {
                if self.load.finish(request.ticket) {
                    self.record_load_error(&e);
                }
                Err(e)
            }
        }
    }

    /// Set one field on every selected row, then reload
    pub async fn bulk_edit(&mut self, client: &ApiClient, field: &str, value: &str) -> Result<String> {
        let request = bulk_edit_request(&self.selection, field, value)?;
        let ticket = self.bulk.begin()?;
        let result = client.bulk_update(&request).await;
        self.bulk.finish(ticket);

        let reply = result.inspect_err(|e| self.bulk_failed(e))?;
        let notice = update_outcome(&reply);
        self.bulk_succeeded(notice.clone());
        self.reload_after_mutation(client).await;
        Ok(notice)
    }

    /// Ask for confirmation to delete the current selection
    pub fn request_bulk_delete(&self) -> Result<PendingDelete> {
        PendingDelete::from_selection(&self.selection)
    }

    /// Run a confirmed delete, then reload
    ///
    /// A batch delete clears the selection, a single delete only removes its
    /// own id, and only once the server accepts the request.
    pub async fn delete(&mut self, client: &ApiClient, confirmed: &ConfirmedDelete) -> Result<String> {
        let ticket = self.bulk.begin()?;
        let result = client.delete(confirmed).await;
        self.bulk.finish(ticket);

        let reply = result.inspect_err(|e| self.bulk_failed(e))?;
        let notice = delete_outcome(&reply);
        self.delete_succeeded(confirmed.scope(), notice.clone());
        self.reload_after_mutation(client).await;
        Ok(notice)
    }
}
