//! Integration tests for single-record CRUD against a stub backend
//!
//! Tests cover:
//! - Fetching one fonograma
//! - Local validation blocks create and update before any request
//! - Normalised fields on the wire
//! - Transport failures

mod helpers;

use std::time::Duration;

use fono_admin::{ApiClient, ClientError};
use fono_common::models::Fonograma;
use fono_common::RecordId;
use helpers::{envelope_ok, StubBackend};
use serde_json::json;

fn client(stub: &StubBackend) -> ApiClient {
    ApiClient::new(stub.base_url(), Duration::from_secs(5)).expect("Should build client")
}

fn draft() -> Fonograma {
    Fonograma {
        isrc: Some("brum71200001".into()),
        titulo: Some("Aquarela".into()),
        duracao: Some("3:45".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_fonograma() {
    let stub = StubBackend::start().await;
    stub.on(
        "GET",
        "/api/v1/fonogramas/12",
        200,
        envelope_ok(json!({
            "id": 12,
            "isrc": "BRUM71200001",
            "titulo": "Aquarela",
            "status_ecad": "ENVIADO",
            "autores": [{ "nome": "Toquinho", "cpf": "52998224725", "funcao": "COMPOSITOR", "percentual": 100.0 }]
        })),
    );
    let client = client(&stub);

    let fonograma = client.get_fonograma(&RecordId::Int(12)).await.unwrap();
    assert_eq!(fonograma.id, Some(RecordId::Int(12)));
    assert_eq!(fonograma.titulo.as_deref(), Some("Aquarela"));
    assert_eq!(fonograma.autores.len(), 1);
}

#[tokio::test]
async fn test_missing_fonograma_is_a_server_error() {
    let stub = StubBackend::start().await;
    let client = client(&stub);

    let err = client.get_fonograma(&RecordId::Int(404)).await.unwrap_err();
    match err {
        ClientError::Server { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_sends_normalised_record() {
    let stub = StubBackend::start().await;
    stub.on(
        "POST",
        "/api/v1/fonogramas",
        201,
        json!({
            "success": true,
            "data": { "id": 31, "isrc": "BRUM71200001", "titulo": "Aquarela" },
            "message": "Fonograma criado"
        }),
    );
    let client = client(&stub);

    let mut fonograma = draft();
    let reply = client.create_fonograma(&mut fonograma).await.unwrap();

    assert_eq!(reply.data.id, Some(RecordId::Int(31)));
    assert_eq!(reply.message.as_deref(), Some("Fonograma criado"));

    let sent = stub.calls_to("POST", "/api/v1/fonogramas")[0].json();
    assert_eq!(sent["isrc"], "BRUM71200001");
    assert_eq!(sent["duracao"], "03:45");
    // server-managed fields stay off the wire
    assert!(sent.get("id").is_none());
    assert!(sent.get("status_ecad").is_none());
}

#[tokio::test]
async fn test_invalid_record_is_never_sent() {
    let stub = StubBackend::start().await;
    let client = client(&stub);

    let mut fonograma = Fonograma {
        isrc: Some("XX123".into()),
        duracao: Some("3:75".into()),
        ..Default::default()
    };
    let err = client.create_fonograma(&mut fonograma).await.unwrap_err();

    match err {
        ClientError::Validation(problems) => {
            assert_eq!(problems.len(), 3);
            assert!(problems.contains(&"Título é obrigatório".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client
        .update_fonograma(&RecordId::Int(1), &mut fonograma)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_update_puts_to_record_path() {
    let stub = StubBackend::start().await;
    stub.on(
        "PUT",
        "/api/v1/fonogramas/31",
        200,
        envelope_ok(json!({ "id": 31, "isrc": "BRUM71200001", "titulo": "Aquarela (ao vivo)" })),
    );
    let client = client(&stub);

    let mut fonograma = draft();
    fonograma.titulo = Some("Aquarela (ao vivo)".into());
    let reply = client
        .update_fonograma(&RecordId::Int(31), &mut fonograma)
        .await
        .unwrap();

    assert_eq!(reply.data.titulo.as_deref(), Some("Aquarela (ao vivo)"));
    assert_eq!(stub.calls_to("PUT", "/api/v1/fonogramas/31").len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // port freed again before the request
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();

    let err = client.get_fonograma(&RecordId::Int(1)).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
