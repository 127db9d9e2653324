//! HTTP client for the EPP API

use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    DeliveriesResponse, Delivery, MessageResponse, NewDelivery, Worker, WorkerResponse,
};

pub const WORKER_NOT_FOUND: &str = "Trabajador no encontrado";
pub const DELIVERIES_NOT_FOUND: &str = "No se encontraron entregas para este trabajador";
pub const REGISTRATION_REJECTED: &str = "Error al registrar la entrega de EPP";

/// Client for the worker lookup, delivery history and registration endpoints
#[derive(Debug, Clone)]
pub struct EppClient {
    client: Client,
    base_url: Url,
}

impl EppClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Parse `base_url` and build a client for it
    pub fn from_str_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self::new(url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/epp/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "epp"])
            .extend(segments);
        Ok(url)
    }

    /// Look up a worker by national ID
    ///
    /// The `success` flag in the body decides the outcome; the HTTP status is
    /// not inspected.
    pub async fn find_worker(&self, cedula: &str) -> Result<Worker> {
        let url = self.endpoint(&["buscar-trabajador", cedula])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body = response.text().await?;
        let parsed: WorkerResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::InvalidResponse(format!("worker lookup: {}", e)))?;

        match (parsed.success, parsed.trabajador) {
            (true, Some(worker)) => Ok(worker),
            (true, None) => Err(AppError::InvalidResponse(
                "worker lookup succeeded without a worker".to_string(),
            )),
            (false, _) => {
                tracing::debug!(
                    cedula,
                    message = parsed.message.as_deref().unwrap_or(""),
                    "Worker not found"
                );
                Err(AppError::NotFound(WORKER_NOT_FOUND.to_string()))
            }
        }
    }

    /// Fetch the delivery history of a worker, in the order the API returns it
    pub async fn deliveries_for(&self, worker_id: &str) -> Result<Vec<Delivery>> {
        let url = self.endpoint(&["entregas-por-trabajador", worker_id])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body = response.text().await?;
        let parsed: DeliveriesResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::InvalidResponse(format!("delivery history: {}", e)))?;

        if parsed.success {
            Ok(parsed.entregas)
        } else {
            tracing::debug!(
                worker_id,
                message = parsed.message.as_deref().unwrap_or(""),
                "No deliveries"
            );
            Err(AppError::NotFound(DELIVERIES_NOT_FOUND.to_string()))
        }
    }

    /// Register a delivery
    ///
    /// Any 2xx counts as success regardless of the body. Other statuses are
    /// rejected with the body's `message` when present.
    pub async fn register_delivery(&self, delivery: &NewDelivery) -> Result<()> {
        let url = self.endpoint(&["registrar-entrega-epp"])?;
        tracing::debug!(payload = ?delivery, "POST {}", url);

        let response = self.client.post(url).json(delivery).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MessageResponse>(&text)
                .ok()
                .and_then(|m| m.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| REGISTRATION_REJECTED.to_string());
            tracing::warn!("Registration rejected: {} - {}", status, text);
            return Err(AppError::Rejected(message));
        }

        Ok(())
    }
}
