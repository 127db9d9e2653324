//! Delivery registration view

use chrono::Utc;

use crate::api::EppClient;
use crate::models::{NewDelivery, Worker};
use crate::notice::Notice;
use crate::signature::SignaturePad;
use crate::suggest::Suggestions;

pub const WORKER_REQUIRED: &str = "Debes buscar un trabajador primero";
pub const REGISTERED: &str = "Entrega de EPP registrada correctamente";
pub const REGISTRATION_FAILED: &str = "Hubo un problema al registrar la entrega de EPP";
pub const LOOKUP_FAILED: &str = "Hubo un problema al buscar el trabajador";
pub const INVALID_QUANTITY: &str = "La cantidad debe ser un número entero no negativo";
pub const MISSING_FIELDS: &str = "Completa todos los campos obligatorios";

/// Editable fields of the registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub cedula: String,
    pub epp_entregado: String,
    pub referencia_tipo: String,
    /// Raw text; parsed on submit
    pub unidades_entregadas: String,
    pub nombre_entrega: String,
    pub tarea_labor: String,
}

/// Parse the quantity field as a non-negative integer
pub fn parse_quantity(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Registration view-model
///
/// Submission is only possible once a worker lookup has succeeded.
pub struct RegistrationView {
    client: EppClient,
    issuer_name: Option<String>,
    form: RegistrationForm,
    worker: Option<Worker>,
    equipment: Suggestions,
    reference: Suggestions,
    signature: SignaturePad,
}

impl RegistrationView {
    /// `issuer_name` pre-fills the issuing-person field and is restored on clear
    pub fn new(client: EppClient, issuer_name: Option<String>) -> Self {
        if issuer_name.is_none() {
            tracing::warn!("No issuer name configured; the issuing-person field starts empty");
        }
        let form = RegistrationForm {
            nombre_entrega: issuer_name.clone().unwrap_or_default(),
            ..Default::default()
        };
        Self {
            client,
            issuer_name,
            form,
            worker: None,
            equipment: Suggestions::equipment(),
            reference: Suggestions::reference(),
            signature: SignaturePad::default(),
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn worker(&self) -> Option<&Worker> {
        self.worker.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.worker.is_some()
    }

    pub fn equipment_suggestions(&self) -> &Suggestions {
        &self.equipment
    }

    pub fn reference_suggestions(&self) -> &Suggestions {
        &self.reference
    }

    pub fn signature(&self) -> &SignaturePad {
        &self.signature
    }

    pub fn signature_mut(&mut self) -> &mut SignaturePad {
        &mut self.signature
    }

    pub fn set_cedula(&mut self, value: impl Into<String>) {
        self.form.cedula = value.into();
    }

    /// Set the equipment text and refilter its suggestions
    pub fn set_epp_entregado(&mut self, value: impl Into<String>) {
        self.form.epp_entregado = value.into();
        self.equipment.update(&self.form.epp_entregado);
    }

    /// Set the reference text and refilter its suggestions
    pub fn set_referencia_tipo(&mut self, value: impl Into<String>) {
        self.form.referencia_tipo = value.into();
        self.reference.update(&self.form.referencia_tipo);
    }

    pub fn set_unidades_entregadas(&mut self, value: impl Into<String>) {
        self.form.unidades_entregadas = value.into();
    }

    pub fn set_nombre_entrega(&mut self, value: impl Into<String>) {
        self.form.nombre_entrega = value.into();
    }

    pub fn set_tarea_labor(&mut self, value: impl Into<String>) {
        self.form.tarea_labor = value.into();
    }

    /// Resolve the worker for the current cédula
    ///
    /// On failure the previously resolved worker, if any, is kept.
    pub async fn lookup_worker(&mut self) -> Result<&Worker, Notice> {
        match self.client.find_worker(self.form.cedula.trim()).await {
            Ok(worker) => {
                tracing::info!("Resolved worker {} ({})", worker.full_name(), worker.id);
                Ok(&*self.worker.insert(worker))
            }
            Err(e) => {
                tracing::warn!("Worker lookup failed: {}", e);
                Err(e.to_notice(LOOKUP_FAILED))
            }
        }
    }

    /// Build the payload for the current form, stamped with the current time
    pub fn build_delivery(&self) -> Result<NewDelivery, Notice> {
        let worker = self
            .worker
            .as_ref()
            .ok_or_else(|| Notice::error(WORKER_REQUIRED))?;
        let form = &self.form;
        let required = [
            &form.epp_entregado,
            &form.referencia_tipo,
            &form.unidades_entregadas,
            &form.tarea_labor,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(Notice::error(MISSING_FIELDS));
        }
        let unidades = parse_quantity(&form.unidades_entregadas)
            .ok_or_else(|| Notice::error(INVALID_QUANTITY))?;

        Ok(NewDelivery {
            trabajador_id: worker.id.clone(),
            fecha_entrega: Utc::now(),
            epp_entregado: self.form.epp_entregado.clone(),
            unidades_entregadas: unidades,
            referencia_tipo: self.form.referencia_tipo.clone(),
            nombre_hs_entrega: self.form.nombre_entrega.clone(),
            tarea_labor: self.form.tarea_labor.clone(),
        })
    }

    /// Submit the delivery
    ///
    /// Returns the payload that was accepted. The form is left as is either way.
    pub async fn submit(&mut self) -> Result<NewDelivery, Notice> {
        let delivery = self.build_delivery()?;

        match self.client.register_delivery(&delivery).await {
            Ok(()) => {
                tracing::info!(
                    "Registered {} x{} for worker {}",
                    delivery.epp_entregado,
                    delivery.unidades_entregadas,
                    delivery.trabajador_id
                );
                Ok(delivery)
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                Err(e.to_notice(REGISTRATION_FAILED))
            }
        }
    }

    /// The notice shown after a successful submit
    pub fn registered_notice() -> Notice {
        Notice::success(REGISTERED)
    }

    /// Reset the form locally: fields emptied, worker dropped, issuer name
    /// restored, suggestions reset and signature cleared
    pub fn clear(&mut self) {
        self.form = RegistrationForm {
            nombre_entrega: self.issuer_name.clone().unwrap_or_default(),
            ..Default::default()
        };
        self.worker = None;
        self.equipment.reset();
        self.reference.reset();
        self.signature.clear();
        tracing::debug!("Registration form cleared");
    }

    pub fn clear_signature(&mut self) {
        self.signature.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Point;

    fn view(issuer: Option<&str>) -> RegistrationView {
        let client = EppClient::from_str_url("http://127.0.0.1:9").unwrap();
        RegistrationView::new(client, issuer.map(str::to_string))
    }

    #[test]
    fn test_issuer_name_prefilled() {
        assert_eq!(view(Some("Laura")).form().nombre_entrega, "Laura");
        assert_eq!(view(None).form().nombre_entrega, "");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity(" 12 "), Some(12));
        assert_eq!(parse_quantity("0"), Some(0));
        assert_eq!(parse_quantity("-1"), None);
        assert_eq!(parse_quantity("1000000"), Some(1_000_000));
        assert_eq!(parse_quantity("dos"), None);
        assert_eq!(parse_quantity("1.5"), None);
    }

    #[test]
    fn test_build_delivery_requires_worker() {
        let v = view(Some("Laura"));
        assert!(!v.can_submit());
        assert_eq!(v.build_delivery().unwrap_err(), Notice::error(WORKER_REQUIRED));
    }

    fn looked_up(v: &mut RegistrationView) {
        v.worker = Some(Worker {
            id: "w1".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_build_delivery_requires_every_field() {
        let mut v = view(Some("Laura"));
        looked_up(&mut v);
        assert_eq!(v.build_delivery().unwrap_err(), Notice::error(MISSING_FIELDS));

        v.set_epp_entregado("Casco");
        v.set_referencia_tipo("Orden de Trabajo");
        v.set_unidades_entregadas("2");
        v.set_tarea_labor("   ");
        assert_eq!(v.build_delivery().unwrap_err(), Notice::error(MISSING_FIELDS));

        v.set_tarea_labor("Poda");
        let delivery = v.build_delivery().unwrap();
        assert_eq!(delivery.trabajador_id, "w1");
        assert_eq!(delivery.unidades_entregadas, 2);
    }

    #[test]
    fn test_build_delivery_rejects_negative_quantity() {
        let mut v = view(None);
        looked_up(&mut v);
        v.set_epp_entregado("Casco");
        v.set_referencia_tipo("Orden de Trabajo");
        v.set_unidades_entregadas("-3");
        v.set_tarea_labor("Poda");

        assert_eq!(v.build_delivery().unwrap_err(), Notice::error(INVALID_QUANTITY));
    }

    #[test]
    fn test_typing_refilters_suggestions() {
        let mut v = view(None);
        v.set_epp_entregado("GUA");
        assert_eq!(v.equipment_suggestions().labels(), vec!["Guantes"]);

        v.set_referencia_tipo("soli");
        assert_eq!(v.reference_suggestions().labels(), vec!["Solicitud de EPP"]);

        // Free text outside the list is still accepted
        v.set_epp_entregado("Careta");
        assert!(v.equipment_suggestions().visible().is_empty());
        assert_eq!(v.form().epp_entregado, "Careta");
    }

    #[test]
    fn test_clear_resets_everything_but_issuer() {
        let mut v = view(Some("Laura"));
        v.set_cedula("1020");
        v.set_epp_entregado("Casco");
        v.set_referencia_tipo("Orden");
        v.set_unidades_entregadas("3");
        v.set_tarea_labor("Poda");
        v.set_nombre_entrega("Otro");
        v.signature_mut().begin_stroke(Point::new(5.0, 5.0));

        v.clear();

        assert_eq!(
            v.form(),
            &RegistrationForm {
                nombre_entrega: "Laura".to_string(),
                ..Default::default()
            }
        );
        assert!(v.worker().is_none());
        assert!(v.signature().is_empty());
        assert_eq!(v.equipment_suggestions().visible().len(), 4);
        assert_eq!(v.reference_suggestions().visible().len(), 3);
    }

    #[test]
    fn test_clear_without_issuer_leaves_name_empty() {
        let mut v = view(None);
        v.set_nombre_entrega("Alguien");
        v.clear();
        assert_eq!(v.form().nombre_entrega, "");
    }

    #[test]
    fn test_clear_signature_only() {
        let mut v = view(None);
        v.set_tarea_labor("Poda");
        v.signature_mut().begin_stroke(Point::new(5.0, 5.0));

        v.clear_signature();
        assert!(v.signature().is_empty());
        assert_eq!(v.form().tarea_labor, "Poda");
    }
}
