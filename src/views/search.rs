//! Delivery search and export view

use std::path::{Path, PathBuf};

use crate::api::EppClient;
use crate::export::Exporter;
use crate::models::{Delivery, DeliveryRow, Worker};
use crate::notice::Notice;

pub const SEARCH_FAILED: &str = "Hubo un problema al buscar el trabajador";
pub const EXPORT_FAILED: &str = "No se pudo generar el PDF";

/// Search view-model: a worker and their delivery history
pub struct SearchView {
    client: EppClient,
    exporter: Exporter,
    cedula: String,
    worker: Option<Worker>,
    deliveries: Vec<Delivery>,
}

impl SearchView {
    pub fn new(client: EppClient) -> Self {
        Self::with_exporter(client, Exporter::default())
    }

    pub fn with_exporter(client: EppClient, exporter: Exporter) -> Self {
        Self {
            client,
            exporter,
            cedula: String::new(),
            worker: None,
            deliveries: Vec::new(),
        }
    }

    pub fn cedula(&self) -> &str {
        &self.cedula
    }

    pub fn set_cedula(&mut self, value: impl Into<String>) {
        self.cedula = value.into();
    }

    pub fn worker(&self) -> Option<&Worker> {
        self.worker.as_ref()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Look up the worker, then their deliveries
    ///
    /// The result is committed only when both requests succeed, so a failure
    /// at either step leaves the previous result on screen.
    pub async fn search(&mut self) -> Result<(), Notice> {
        let worker = self
            .client
            .find_worker(self.cedula.trim())
            .await
            .map_err(|e| {
                tracing::warn!("Worker lookup failed: {}", e);
                e.to_notice(SEARCH_FAILED)
            })?;

        let deliveries = self
            .client
            .deliveries_for(&worker.id)
            .await
            .map_err(|e| {
                tracing::warn!("Delivery history failed for {}: {}", worker.id, e);
                e.to_notice(SEARCH_FAILED)
            })?;

        tracing::info!(
            "Loaded {} deliveries for {}",
            deliveries.len(),
            worker.full_name()
        );
        self.worker = Some(worker);
        self.deliveries = deliveries;
        Ok(())
    }

    /// Display rows in API order
    pub fn rows(&self) -> Vec<DeliveryRow> {
        self.deliveries
            .iter()
            .enumerate()
            .map(|(i, d)| DeliveryRow::from_delivery(i, d))
            .collect()
    }

    pub fn can_export(&self) -> bool {
        self.worker.is_some() && !self.deliveries.is_empty()
    }

    /// Export the loaded history to `dir` and return the written path
    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf, Notice> {
        let document = self
            .exporter
            .export(&self.cedula, self.worker.as_ref(), &self.deliveries)
            .map_err(|e| e.to_notice(EXPORT_FAILED))?;

        document.save(dir).map_err(|e| e.to_notice(EXPORT_FAILED))
    }
}
