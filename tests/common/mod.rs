//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use epp_desk::EppClient;

pub fn client_for(server: &MockServer) -> EppClient {
    EppClient::from_str_url(&server.uri()).expect("mock server URI is valid")
}

pub fn worker_json(id: &str, cedula: &str) -> Value {
    json!({
        "_id": id,
        "nombre": "Ana",
        "apellido": "Rojas",
        "cedula": cedula,
        "area": "Campo",
        "labor": "Cosecha",
        "cargo": "Operaria",
        "empresa": "Unipalma",
        "contacto": "3001234567",
        "centro_de_operacion": "Paratebueno"
    })
}

pub fn delivery_json(worker_id: &str, epp: &str, fecha: &str) -> Value {
    json!({
        "_id": format!("d-{}", epp),
        "trabajador_id": worker_id,
        "fecha_entrega": fecha,
        "epp_entregado": epp,
        "referencia_tipo": "Orden de Trabajo",
        "unidades_entregadas": 1,
        "nombre_hs_entrega": "Laura",
        "tarea_labor": "Cosecha"
    })
}

/// Answer the lookup for `cedula` with the given worker
pub async fn mount_worker(server: &MockServer, cedula: &str, worker: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/epp/buscar-trabajador/{}", cedula)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "trabajador": worker
        })))
        .mount(server)
        .await;
}

/// Answer the lookup for `cedula` with `success: false`
pub async fn mount_worker_not_found(server: &MockServer, cedula: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/epp/buscar-trabajador/{}", cedula)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Trabajador no encontrado"
        })))
        .mount(server)
        .await;
}

pub async fn mount_deliveries(server: &MockServer, worker_id: &str, deliveries: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/epp/entregas-por-trabajador/{}", worker_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "entregas": deliveries
        })))
        .mount(server)
        .await;
}
