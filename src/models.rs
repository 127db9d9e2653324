//! Data models for workers and EPP deliveries

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Placeholder shown when a delivery date cannot be parsed
pub const INVALID_DATE: &str = "Fecha inválida";

/// A worker eligible to receive equipment, as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub cedula: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub labor: String,
    #[serde(default)]
    pub cargo: String,
    #[serde(default)]
    pub empresa: String,
    #[serde(default)]
    pub contacto: String,
    #[serde(default)]
    pub centro_de_operacion: String,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

/// A single recorded issuance of equipment to a worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub trabajador_id: String,
    /// Raw timestamp as sent by the API; may not parse
    #[serde(default)]
    pub fecha_entrega: String,
    #[serde(default)]
    pub epp_entregado: String,
    #[serde(default)]
    pub referencia_tipo: String,
    #[serde(default)]
    pub unidades_entregadas: Units,
    #[serde(default)]
    pub nombre_hs_entrega: String,
    #[serde(default)]
    pub tarea_labor: String,
}

impl Delivery {
    /// Delivery date as `dd/MM/yyyy` in local time, or [`INVALID_DATE`]
    pub fn formatted_date(&self) -> String {
        format_delivery_date(&self.fecha_entrega)
    }
}

/// Units on a stored delivery
///
/// Older records may hold null, negative or fractional values; those are kept
/// as sent so the rest of the history still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Units {
    #[default]
    Missing,
    Count(u64),
    Other(String),
}

impl<'de> Deserialize<'de> for Units {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Units::Missing,
            Value::Number(n) => match n.as_u64() {
                Some(count) => Units::Count(count),
                None => Units::Other(n.to_string()),
            },
            Value::String(s) => match s.trim().parse() {
                Ok(count) => Units::Count(count),
                Err(_) => Units::Other(s),
            },
            other => Units::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Missing => Ok(()),
            Units::Count(n) => write!(f, "{}", n),
            Units::Other(raw) => f.write_str(raw),
        }
    }
}

/// A delivery formatted for display, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRow {
    pub number: usize,
    pub fecha: String,
    pub epp_entregado: String,
    pub unidades: String,
    pub referencia_tipo: String,
    pub nombre_hs_entrega: String,
    pub tarea_labor: String,
}

impl DeliveryRow {
    pub fn from_delivery(index: usize, delivery: &Delivery) -> Self {
        Self {
            number: index + 1,
            fecha: delivery.formatted_date(),
            epp_entregado: delivery.epp_entregado.clone(),
            unidades: delivery.unidades_entregadas.to_string(),
            referencia_tipo: delivery.referencia_tipo.clone(),
            nombre_hs_entrega: delivery.nombre_hs_entrega.clone(),
            tarea_labor: delivery.tarea_labor.clone(),
        }
    }
}

/// Payload for registering a new delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDelivery {
    pub trabajador_id: String,
    #[serde(serialize_with = "serialize_millis")]
    pub fecha_entrega: DateTime<Utc>,
    pub epp_entregado: String,
    pub unidades_entregadas: u64,
    pub referencia_tipo: String,
    pub nombre_hs_entrega: String,
    pub tarea_labor: String,
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Response of the worker lookup endpoint
#[derive(Debug, Deserialize)]
pub struct WorkerResponse {
    #[serde(default)]
    pub success: bool,
    pub trabajador: Option<Worker>,
    pub message: Option<String>,
}

/// Response of the delivery history endpoint
#[derive(Debug, Deserialize)]
pub struct DeliveriesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub entregas: Vec<Delivery>,
    pub message: Option<String>,
}

/// Body of a rejected registration
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    pub message: Option<String>,
}

/// Parse a delivery timestamp in any of the shapes the API is known to send
pub fn parse_delivery_date(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_local_timezone(Local).earliest();
    }
    // Date-only strings are UTC midnight
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let utc = date.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(utc.with_timezone(&Local));
    }
    None
}

pub fn format_delivery_date(raw: &str) -> String {
    match parse_delivery_date(raw) {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}
