//! Export of a worker's delivery history to a paginated PDF
//!
//! 1. Build the search view as data ([`render::ExportView`])
//! 2. Render it without chrome, under a fixed heading, at 2x scale
//! 3. Plan A4 pages for the scaled snapshot ([`paginate::paginate`])
//! 4. Write the PDF ([`pdf::write_pdf`])

pub mod paginate;
pub mod pdf;
pub mod render;

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Delivery, DeliveryRow, Worker};
use pdf::PageSize;
use render::{Block, ExportView, Region, RegionKind, RenderOptions, TextStyle};

pub const EXPORT_HEADING: &str = "COMPROBANTES DE ENTREGAS EPP UNIPALMA";
pub const NOTHING_TO_EXPORT: &str = "No hay datos para descargar";

pub const VIEW_TITLE: &str = "Buscar Trabajador y Entregas de EPP";

/// Render scale used to keep text sharp
pub const EXPORT_SCALE: f32 = 2.0;

/// File name of the exported document for a worker
///
/// Characters that are unsafe in file names are replaced with `_`.
pub fn file_name(cedula: &str) -> String {
    let safe: String = cedula
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("comprobante_entregas_epp_{}.pdf", safe)
}

/// Build the search view for a worker and their deliveries
pub fn search_view(search_text: &str, worker: &Worker, rows: &[DeliveryRow]) -> ExportView {
    let worker_blocks = vec![
        Block::text(
            TextStyle::Body,
            format!("Nombre del trabajador: {}", worker.full_name()),
        ),
        Block::text(TextStyle::Body, format!("Cédula: {}", worker.cedula)),
        Block::text(
            TextStyle::Body,
            format!("Centro de operación: {}", worker.centro_de_operacion),
        ),
        Block::text(TextStyle::Body, format!("Cargo: {}", worker.cargo)),
        Block::text(TextStyle::Body, format!("Empresa: {}", worker.empresa)),
        Block::text(TextStyle::Body, format!("Contacto: {}", worker.contacto)),
    ];

    let mut delivery_blocks = Vec::with_capacity(rows.len() * 8);
    for row in rows {
        delivery_blocks.push(Block::text(
            TextStyle::Strong,
            format!("Entrega #{}", row.number),
        ));
        delivery_blocks.push(Block::text(TextStyle::Body, format!("Fecha: {}", row.fecha)));
        delivery_blocks.push(Block::text(
            TextStyle::Body,
            format!("EPP Entregado: {}", row.epp_entregado),
        ));
        delivery_blocks.push(Block::text(
            TextStyle::Body,
            format!("Unidades: {}", row.unidades),
        ));
        delivery_blocks.push(Block::text(
            TextStyle::Body,
            format!("Referencia/Tipo: {}", row.referencia_tipo),
        ));
        delivery_blocks.push(Block::text(
            TextStyle::Body,
            format!("Nombre Quien Entrega: {}", row.nombre_hs_entrega),
        ));
        delivery_blocks.push(Block::text(
            TextStyle::Body,
            format!("Tarea/Labor: {}", row.tarea_labor),
        ));
        delivery_blocks.push(Block::Rule);
    }

    ExportView {
        regions: vec![
            Region::new(
                RegionKind::Title,
                vec![Block::text(TextStyle::Title, VIEW_TITLE)],
            ),
            Region::new(
                RegionKind::SearchControls,
                vec![Block::text(
                    TextStyle::Body,
                    format!("Cédula: {}   [ Buscar ]", search_text),
                )],
            ),
            Region::new(RegionKind::WorkerDetails, worker_blocks),
            Region::new(
                RegionKind::ActionButtons,
                vec![Block::text(TextStyle::Body, "[ Descargar PDF ]")],
            ),
            Region::new(RegionKind::DeliveryList, delivery_blocks),
        ],
    }
}

/// A finished document, not yet written anywhere
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Write the document into `dir` under its file name
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(pages = self.page_count, "Saved {}", path.display());
        Ok(path)
    }
}

/// Renders delivery histories to PDF
#[derive(Debug, Clone)]
pub struct Exporter {
    pub page: PageSize,
    pub scale: f32,
    pub heading: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            scale: EXPORT_SCALE,
            heading: EXPORT_HEADING.to_string(),
        }
    }
}

impl Exporter {
    /// Export a worker's deliveries
    ///
    /// Fails with [`AppError::Precondition`] before rendering anything when
    /// there is no worker or no delivery.
    pub fn export(
        &self,
        search_text: &str,
        worker: Option<&Worker>,
        deliveries: &[Delivery],
    ) -> Result<ExportedDocument> {
        let worker = match worker {
            Some(worker) if !deliveries.is_empty() => worker,
            _ => return Err(AppError::Precondition(NOTHING_TO_EXPORT.to_string())),
        };

        let rows: Vec<DeliveryRow> = deliveries
            .iter()
            .enumerate()
            .map(|(i, d)| DeliveryRow::from_delivery(i, d))
            .collect();
        let view = search_view(search_text, worker, &rows);

        let opts = RenderOptions {
            scale: self.scale,
            exclude: RegionKind::CHROME.to_vec(),
            heading: Some(self.heading.clone()),
            ..Default::default()
        };
        let snapshot = render::render(&view, &opts);

        let image_height_mm =
            f64::from(snapshot.height) * self.page.width_mm / f64::from(snapshot.width);
        let placements = paginate::paginate(image_height_mm, self.page.height_mm);
        tracing::debug!(
            image_height_mm,
            pages = placements.len(),
            "Paginated export for {}",
            worker.cedula
        );

        let bytes = pdf::write_pdf(&snapshot, self.page, &placements)?;
        Ok(ExportedDocument {
            file_name: file_name(&worker.cedula),
            page_count: placements.len(),
            bytes,
        })
    }
}
