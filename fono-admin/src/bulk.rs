//! Bulk field edit and confirmed deletion
//!
//! Deleting is two-step: a [`PendingDelete`] carries the prompt shown to the
//! operator and only [`PendingDelete::confirm`] yields the [`ConfirmedDelete`]
//! that [`crate::client::ApiClient::delete`] accepts.

use fono_common::models::{BulkUpdateRequest, BulkUpdateSummary, BulkDeleteSummary};
use fono_common::RecordId;

use crate::client::Reply;
use crate::error::{ClientError, Result};
use crate::selection::Selection;

/// What a delete removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    /// `DELETE /api/v1/fonogramas/{id}`
    Single(RecordId),
    /// `DELETE /api/v1/fonogramas/lote`
    Batch(Vec<RecordId>),
}

impl DeleteScope {
    pub fn len(&self) -> usize {
        match self {
            DeleteScope::Single(_) => 1,
            DeleteScope::Batch(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A delete awaiting the operator's answer
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete {
    scope: DeleteScope,
}

impl PendingDelete {
    pub fn single(id: RecordId) -> Self {
        Self {
            scope: DeleteScope::Single(id),
        }
    }

    /// Everything currently selected; an empty selection is refused
    pub fn from_selection(selection: &Selection) -> Result<Self> {
        if selection.is_empty() {
            return Err(ClientError::Validation(vec![
                "Selecione pelo menos um fonograma".to_string(),
            ]));
        }
        Ok(Self {
            scope: DeleteScope::Batch(selection.ids()),
        })
    }

    pub fn prompt(&self) -> String {
        match &self.scope {
            DeleteScope::Single(_) => "Tem certeza que deseja deletar este fonograma?".to_string(),
            DeleteScope::Batch(ids) => {
                format!("Tem certeza que deseja deletar {} fonograma(s)?", ids.len())
            }
        }
    }

    pub fn scope(&self) -> &DeleteScope {
        &self.scope
    }

    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete { scope: self.scope }
    }
}

/// A delete the operator agreed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
    scope: DeleteScope,
}

impl ConfirmedDelete {
    pub fn scope(&self) -> &DeleteScope {
        &self.scope
    }
}

/// Bulk edit of one field over the current selection
pub fn bulk_edit_request(selection: &Selection, field: &str, value: &str) -> Result<BulkUpdateRequest> {
    Ok(BulkUpdateRequest::single_field(selection.ids(), field, value)?)
}

/// Operator-facing outcome: the server's counts, then its message if any
pub fn update_outcome(reply: &Reply<BulkUpdateSummary>) -> String {
    with_message(
        format!("{} fonograma(s) atualizado(s)", reply.data.atualizados),
        reply.message.as_deref(),
    )
}

pub fn delete_outcome(reply: &Reply<BulkDeleteSummary>) -> String {
    with_message(
        format!("{} fonograma(s) deletado(s)", reply.data.deletados),
        reply.message.as_deref(),
    )
}

fn with_message(counts: String, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!("{} - {}", counts, message),
        None => counts,
    }
}
