//! Integration tests for the EPP API client

use epp_desk::api::{DELIVERIES_NOT_FOUND, REGISTRATION_REJECTED, WORKER_NOT_FOUND};
use epp_desk::models::NewDelivery;
use epp_desk::AppError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn sample_delivery() -> NewDelivery {
    NewDelivery {
        trabajador_id: "w1".to_string(),
        fecha_entrega: "2025-02-24T14:30:00Z".parse().unwrap(),
        epp_entregado: "Casco".to_string(),
        unidades_entregadas: 2,
        referencia_tipo: "Orden de Trabajo".to_string(),
        nombre_hs_entrega: "Laura".to_string(),
        tarea_labor: "Cosecha".to_string(),
    }
}

#[tokio::test]
async fn test_find_worker_success() {
    let mock_server = MockServer::start().await;
    common::mount_worker(&mock_server, "1020", common::worker_json("w1", "1020")).await;

    let client = common::client_for(&mock_server);
    let worker = client.find_worker("1020").await.unwrap();

    assert_eq!(worker.id, "w1");
    assert_eq!(worker.full_name(), "Ana Rojas");
    assert_eq!(worker.centro_de_operacion, "Paratebueno");
}

#[tokio::test]
async fn test_find_worker_not_found() {
    let mock_server = MockServer::start().await;
    common::mount_worker_not_found(&mock_server, "999").await;

    let client = common::client_for(&mock_server);
    let err = client.find_worker("999").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref m) if m == WORKER_NOT_FOUND));
}

#[tokio::test]
async fn test_find_worker_invalid_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/epp/buscar-trabajador/1020"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server);
    let err = client.find_worker("1020").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_find_worker_transport_error() {
    // Nothing listens on the discard port
    let client = epp_desk::EppClient::from_str_url("http://127.0.0.1:9").unwrap();
    let err = client.find_worker("1020").await.unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}

#[tokio::test]
async fn test_deliveries_keep_api_order() {
    let mock_server = MockServer::start().await;
    common::mount_deliveries(
        &mock_server,
        "w1",
        vec![
            common::delivery_json("w1", "Botas", "2025-03-01T12:00:00.000Z"),
            common::delivery_json("w1", "Casco", "2024-01-01T12:00:00.000Z"),
        ],
    )
    .await;

    let client = common::client_for(&mock_server);
    let deliveries = client.deliveries_for("w1").await.unwrap();

    let epp: Vec<&str> = deliveries.iter().map(|d| d.epp_entregado.as_str()).collect();
    assert_eq!(epp, vec!["Botas", "Casco"]);
}

#[tokio::test]
async fn test_deliveries_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/epp/entregas-por-trabajador/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server);
    let err = client.deliveries_for("w1").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref m) if m == DELIVERIES_NOT_FOUND));
}

#[tokio::test]
async fn test_register_delivery_sends_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/epp/registrar-entrega-epp"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "trabajador_id": "w1",
            "fecha_entrega": "2025-02-24T14:30:00.000Z",
            "epp_entregado": "Casco",
            "unidades_entregadas": 2,
            "referencia_tipo": "Orden de Trabajo",
            "nombre_hs_entrega": "Laura",
            "tarea_labor": "Cosecha"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server);
    client.register_delivery(&sample_delivery()).await.unwrap();
}

#[tokio::test]
async fn test_register_delivery_rejected_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/epp/registrar-entrega-epp"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Faltan campos obligatorios" })),
        )
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server);
    let err = client.register_delivery(&sample_delivery()).await.unwrap_err();

    assert!(matches!(err, AppError::Rejected(ref m) if m == "Faltan campos obligatorios"));
}

#[tokio::test]
async fn test_register_delivery_rejected_without_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/epp/registrar-entrega-epp"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server);
    let err = client.register_delivery(&sample_delivery()).await.unwrap_err();

    assert!(matches!(err, AppError::Rejected(ref m) if m == REGISTRATION_REJECTED));
}
