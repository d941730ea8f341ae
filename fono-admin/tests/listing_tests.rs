//! Integration tests for the fonograma listing against a stub backend
//!
//! Tests cover:
//! - Filters and page parameters on the wire
//! - Both listing response shapes
//! - Bulk delete and bulk edit over a selection, then reload
//! - Failures keep the selection

mod helpers;

use std::time::Duration;

use fono_admin::bulk::PendingDelete;
use fono_admin::pages::ListingPage;
use fono_admin::{ApiClient, ClientError};
use fono_common::models::FonogramaFilters;
use fono_common::RecordId;
use helpers::{envelope_ok, StubBackend};
use serde_json::{json, Value};

const LIST: &str = "/api/v1/fonogramas";
const BATCH: &str = "/api/v1/fonogramas/lote";

fn client(stub: &StubBackend) -> ApiClient {
    ApiClient::new(stub.base_url(), Duration::from_secs(5)).expect("Should build client")
}

fn rows(ids: std::ops::RangeInclusive<i64>) -> Value {
    Value::Array(
        ids.map(|id| {
            json!({
                "id": id,
                "isrc": format!("BRUM712{:05}", id),
                "titulo": format!("Faixa {}", id),
                "situacao": "ATIVO"
            })
        })
        .collect(),
    )
}

/// Bare row list with pagination in `meta`
fn listing(ids: std::ops::RangeInclusive<i64>, page: u32, pages: u32, total: u64) -> Value {
    json!({
        "success": true,
        "data": rows(ids),
        "meta": { "page": page, "per_page": 20, "total": total, "pages": pages }
    })
}

async fn loaded_page(stub: &StubBackend, client: &ApiClient) -> ListingPage {
    let mut page = ListingPage::default();
    page.load(client).await.unwrap();
    assert_eq!(stub.calls_to("GET", LIST).len(), 1);
    page
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_filters_and_page_on_the_wire() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=20, 2, 3, 45));
    let client = client(&stub);

    let mut page = ListingPage::default();
    page.set_filters(FonogramaFilters {
        search: Some("aquarela".into()),
        genero: Some("MPB".into()),
        status_ecad: Some("   ".into()),
        ..Default::default()
    });
    page.go_to_page(2);
    page.load(&client).await.unwrap();

    let call = &stub.calls_to("GET", LIST)[0];
    assert_eq!(call.query_param("page").as_deref(), Some("2"));
    assert_eq!(call.query_param("per_page").as_deref(), Some("20"));
    assert_eq!(call.query_param("search").as_deref(), Some("aquarela"));
    assert_eq!(call.query_param("genero").as_deref(), Some("MPB"));
    assert_eq!(call.query_param("status_ecad"), None);

    assert_eq!(page.rows().len(), 20);
    assert_eq!(page.pagination().footer(), "Página 2 de 3 (45 total)");
}

#[tokio::test]
async fn test_nested_listing_shape() {
    let stub = StubBackend::start().await;
    stub.on(
        "GET",
        LIST,
        200,
        envelope_ok(json!({
            "fonogramas": rows(1..=3),
            "pagination": { "page": 1, "per_page": 20, "total": 3, "pages": 1 }
        })),
    );
    let client = client(&stub);

    let page = loaded_page(&stub, &client).await;
    assert_eq!(page.rows().len(), 3);
    assert!(!page.pagination().has_controls());
}

#[tokio::test]
async fn test_failed_load_reports_server_message() {
    let stub = StubBackend::start().await;
    stub.on(
        "GET",
        LIST,
        500,
        json!({ "success": false, "error": "Banco de dados indisponível" }),
    );
    let client = client(&stub);

    let mut page = ListingPage::default();
    let err = page.load(&client).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    assert_eq!(page.last_error(), Some("Banco de dados indisponível"));
}

// =============================================================================
// Bulk delete
// =============================================================================

#[tokio::test]
async fn test_bulk_delete_five_selected() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=5, 1, 1, 5));
    stub.on(
        "DELETE",
        BATCH,
        200,
        json!({ "success": true, "data": { "deletados": 5 }, "message": "Fonogramas removidos" }),
    );
    let client = client(&stub);

    let mut page = loaded_page(&stub, &client).await;
    page.set_header(true);
    assert_eq!(page.selection().count(), 5);
    assert!(page.affordances().delete);

    let pending = page.request_bulk_delete().unwrap();
    assert_eq!(pending.prompt(), "Tem certeza que deseja deletar 5 fonograma(s)?");
    let notice = page.delete(&client, &pending.confirm()).await.unwrap();

    assert_eq!(notice, "5 fonograma(s) deletado(s) - Fonogramas removidos");
    let deletes = stub.calls_to("DELETE", BATCH);
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].json(), json!({ "ids": [1, 2, 3, 4, 5] }));

    assert!(page.selection().is_empty());
    assert!(!page.affordances().delete);
    // reloaded after the delete
    assert_eq!(stub.calls_to("GET", LIST).len(), 2);
    let methods: Vec<String> = stub.calls().iter().map(|c| c.method.clone()).collect();
    assert_eq!(methods, vec!["GET", "DELETE", "GET"]);
}

#[tokio::test]
async fn test_failed_bulk_delete_keeps_selection() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=5, 1, 1, 5));
    stub.on(
        "DELETE",
        BATCH,
        500,
        json!({ "success": false, "error": "Falha ao deletar" }),
    );
    let client = client(&stub);

    let mut page = loaded_page(&stub, &client).await;
    page.toggle(RecordId::Int(2));
    page.toggle(RecordId::Int(4));

    let pending = page.request_bulk_delete().unwrap();
    let err = page.delete(&client, &pending.confirm()).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { .. }));
    assert_eq!(page.selection().ids(), vec![RecordId::Int(2), RecordId::Int(4)]);
    assert_eq!(page.last_error(), Some("Falha ao deletar"));
    assert_eq!(stub.calls_to("GET", LIST).len(), 1);
}

#[tokio::test]
async fn test_single_delete_uses_record_path() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=2, 1, 1, 2));
    stub.on(
        "DELETE",
        "/api/v1/fonogramas/7",
        200,
        json!({ "success": true, "data": null, "message": "Fonograma removido" }),
    );
    let client = client(&stub);

    let mut page = ListingPage::default();
    let pending = PendingDelete::single(RecordId::Int(7));
    assert_eq!(pending.prompt(), "Tem certeza que deseja deletar este fonograma?");
    let notice = page.delete(&client, &pending.confirm()).await.unwrap();

    assert_eq!(notice, "1 fonograma(s) deletado(s) - Fonograma removido");
    assert!(stub.calls_to("DELETE", BATCH).is_empty());
}

#[tokio::test]
async fn test_single_delete_keeps_other_selected_rows() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=3, 1, 1, 3));
    stub.on(
        "DELETE",
        "/api/v1/fonogramas/3",
        200,
        json!({ "success": true, "data": null, "message": "Fonograma removido" }),
    );
    let client = client(&stub);

    let mut page = loaded_page(&stub, &client).await;
    page.toggle(RecordId::Int(1));
    page.toggle(RecordId::Int(2));

    let pending = PendingDelete::single(RecordId::Int(3));
    page.delete(&client, &pending.confirm()).await.unwrap();

    assert_eq!(page.selection().ids(), vec![RecordId::Int(1), RecordId::Int(2)]);
    assert!(page.affordances().delete);
}

#[tokio::test]
async fn test_delete_stands_when_reload_fails() {
    let stub = StubBackend::start().await;
    stub.on(
        "DELETE",
        BATCH,
        200,
        json!({ "success": true, "data": { "deletados": 2 }, "message": "Fonogramas removidos" }),
    );
    stub.on(
        "GET",
        LIST,
        500,
        json!({ "success": false, "error": "Listagem indisponível" }),
    );
    let client = client(&stub);

    let mut page = ListingPage::default();
    page.toggle(RecordId::Int(1));
    page.toggle(RecordId::Int(2));
    let pending = page.request_bulk_delete().unwrap();
    let notice = page.delete(&client, &pending.confirm()).await.unwrap();

    assert_eq!(notice, "2 fonograma(s) deletado(s) - Fonogramas removidos");
    assert_eq!(page.notice(), Some(notice.as_str()));
    assert_eq!(page.last_error(), Some("Listagem indisponível"));
    assert!(page.selection().is_empty());
    assert_eq!(stub.calls_to("DELETE", BATCH).len(), 1);
}

// =============================================================================
// Bulk edit
// =============================================================================

#[tokio::test]
async fn test_bulk_edit_selected_rows() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=3, 1, 1, 3));
    stub.on(
        "PUT",
        BATCH,
        200,
        json!({ "success": true, "data": { "atualizados": 2 } }),
    );
    let client = client(&stub);

    let mut page = loaded_page(&stub, &client).await;
    page.toggle(RecordId::Int(3));
    page.toggle(RecordId::Int(1));
    let notice = page.bulk_edit(&client, "situacao", "INATIVO").await.unwrap();

    assert_eq!(notice, "2 fonograma(s) atualizado(s)");
    assert_eq!(
        stub.calls_to("PUT", BATCH)[0].json(),
        json!({ "ids": [1, 3], "campos": { "situacao": "INATIVO" } })
    );
    assert!(page.selection().is_empty());
    assert_eq!(stub.calls_to("GET", LIST).len(), 2);
}

#[tokio::test]
async fn test_bulk_edit_rejects_protected_field_locally() {
    let stub = StubBackend::start().await;
    stub.on("GET", LIST, 200, listing(1..=3, 1, 1, 3));
    let client = client(&stub);

    let mut page = loaded_page(&stub, &client).await;
    page.toggle(RecordId::Int(1));
    let err = page.bulk_edit(&client, "isrc", "BRUM71200099").await.unwrap_err();

    match err {
        ClientError::Validation(problems) => {
            assert_eq!(problems, vec!["Campo não pode ser editado em lote: isrc"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(stub.calls_to("PUT", BATCH).is_empty());
    assert_eq!(page.selection().count(), 1);
}

#[tokio::test]
async fn test_bulk_edit_stands_when_reload_fails() {
    let stub = StubBackend::start().await;
    stub.on(
        "PUT",
        BATCH,
        200,
        json!({ "success": true, "data": { "atualizados": 1 } }),
    );
    let client = client(&stub);

    // no listing route: the reload answers 404
    let mut page = ListingPage::default();
    page.toggle(RecordId::Int(4));
    let notice = page.bulk_edit(&client, "genero", "SAMBA").await.unwrap();

    assert_eq!(notice, "1 fonograma(s) atualizado(s)");
    assert_eq!(page.last_error(), Some("Not found"));
    assert!(page.selection().is_empty());
}
