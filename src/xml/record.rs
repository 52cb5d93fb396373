use tracing::{debug, warn};

use super::document::{RecordDocument, RecordKind};
use super::writer::XmlWriter;
use super::{HASH_TYPE_SHA256, RECORD_VERSION, SF_NAMESPACE};
use crate::config::Settings;
use crate::core::*;

/// Renders records into schema-ordered `sf:RegistroAlta` / `sf:RegistroAnulacion`
/// documents.
///
/// Building validates first and reports every failed precondition together.
/// A record that passes is sealed: its hash is computed once and embedded as
/// the last element.
pub struct RecordXmlBuilder<'a> {
    settings: &'a Settings,
}

impl<'a> RecordXmlBuilder<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn build(&self, record: &InvoiceRecord) -> Result<RecordDocument, VerifactuError> {
        let header = record.header();
        let errors = record.validate();
        if !errors.is_empty() {
            warn!(
                number = header.number(),
                errors = errors.len(),
                "record failed validation"
            );
            return Err(VerifactuError::Validation(errors));
        }

        let hash = record.seal().to_string();
        let timestamp = header.timestamp();

        let mut w = XmlWriter::new();
        let kind = match record {
            InvoiceRecord::Submission(s) => {
                self.write_submission(&mut w, s, &timestamp, &hash)?;
                RecordKind::Submission
            }
            InvoiceRecord::Cancellation(c) => {
                self.write_cancellation(&mut w, c, &timestamp, &hash)?;
                RecordKind::Cancellation
            }
        };
        let xml = w.into_string()?;
        debug!(number = header.number(), hash = %hash, bytes = xml.len(), "record rendered");

        Ok(RecordDocument {
            kind,
            xml,
            hash,
            timestamp,
            issuer: header.issuer().clone(),
        })
    }

    fn write_submission(
        &self,
        w: &mut XmlWriter,
        s: &InvoiceSubmission,
        timestamp: &str,
        hash: &str,
    ) -> Result<(), VerifactuError> {
        let header = s.header();
        let issuer_id = header.issuer().tax_id();
        let root = RecordKind::Submission.element();

        w.start_element_with_attrs(root, &[("xmlns:sf", SF_NAMESPACE)])?;
        w.text_element("sf:IDVersion", RECORD_VERSION)?;

        w.start_element("sf:IDFactura")?;
        w.text_element("sf:IDEmisorFactura", issuer_id)?;
        w.text_element("sf:NumSerieFactura", header.number())?;
        w.text_element("sf:FechaExpedicionFactura", &format_date(header.issue_date()))?;
        w.end_element("sf:IDFactura")?;

        if let Some(reference) = header.external_reference() {
            w.text_element("sf:RefExterna", reference)?;
        }
        w.text_element("sf:NombreRazonEmisor", header.issuer().name())?;

        if s.is_correction() {
            w.text_element("sf:Subsanacion", YES)?;
        }

        w.text_element("sf:TipoFactura", s.invoice_type().code())?;

        if let Some(rect) = s.rectification() {
            w.text_element("sf:TipoRectificativa", rect.correction_type.code())?;
            w.start_element("sf:FacturasRectificadas")?;
            w.start_element("sf:IDFacturaRectificada")?;
            w.text_element("sf:IDEmisorFactura", issuer_id)?;
            w.text_element("sf:NumSerieFactura", &rect.number)?;
            w.text_element("sf:FechaExpedicionFactura", &format_date(rect.date))?;
            w.end_element("sf:IDFacturaRectificada")?;
            w.end_element("sf:FacturasRectificadas")?;
            if let Some(replaced) = rect.rectified_amounts {
                w.start_element("sf:ImporteRectificacion")?;
                w.text_element("sf:BaseRectificada", &format_amount(replaced.taxable_base))?;
                w.text_element("sf:CuotaRectificada", &format_amount(replaced.tax_amount))?;
                w.end_element("sf:ImporteRectificacion")?;
            }
        }

        w.text_element("sf:DescripcionOperacion", s.description())?;

        if s.invoice_type().omits_recipient() {
            w.text_element("sf:FacturaSinIdentifDestinatarioArt61d", YES)?;
        } else {
            w.text_element("sf:FacturaSinIdentifDestinatarioArt61d", NO)?;
            let recipient = s.recipient()?;
            w.start_element("sf:Destinatarios")?;
            w.start_element("sf:IDDestinatario")?;
            w.text_element("sf:NombreRazon", recipient.name())?;
            if recipient.is_domestic() {
                w.text_element("sf:NIF", recipient.tax_id())?;
            } else {
                let id = recipient.effective_id(s.operation_qualification());
                write_other_id(w, recipient.entity(), &id)?;
            }
            w.end_element("sf:IDDestinatario")?;
            w.end_element("sf:Destinatarios")?;
        }

        write_breakdown(w, s)?;

        let amounts = s.amounts();
        w.text_element("sf:CuotaTotal", &format_amount(amounts.tax_amount))?;
        w.text_element("sf:ImporteTotal", &format_amount(amounts.total_amount))?;

        write_chain(w, header)?;
        self.write_system(w)?;

        w.text_element("sf:FechaHoraHusoGenRegistro", timestamp)?;
        w.text_element("sf:TipoHuella", HASH_TYPE_SHA256)?;
        w.text_element("sf:Huella", hash)?;
        w.end_element(root)?;
        Ok(())
    }

    fn write_cancellation(
        &self,
        w: &mut XmlWriter,
        c: &InvoiceCancellation,
        timestamp: &str,
        hash: &str,
    ) -> Result<(), VerifactuError> {
        let header = c.header();
        let root = RecordKind::Cancellation.element();

        w.start_element_with_attrs(root, &[("xmlns:sf", SF_NAMESPACE)])?;
        w.text_element("sf:IDVersion", RECORD_VERSION)?;

        w.start_element("sf:IDFactura")?;
        w.text_element("sf:IDEmisorFacturaAnulada", header.issuer().tax_id())?;
        w.text_element("sf:NumSerieFacturaAnulada", header.number())?;
        w.text_element("sf:FechaExpedicionFacturaAnulada", &format_date(header.issue_date()))?;
        w.end_element("sf:IDFactura")?;

        if let Some(reference) = header.external_reference() {
            w.text_element("sf:RefExterna", reference)?;
        }

        if c.has_generator() {
            let generator = c.generator()?;
            w.text_element("sf:GeneradoPor", generator.kind.code())?;
            w.start_element("sf:Generador")?;
            write_party(w, &generator.entity)?;
            w.end_element("sf:Generador")?;
        }

        write_chain(w, header)?;
        self.write_system(w)?;

        w.text_element("sf:FechaHoraHusoGenRegistro", timestamp)?;
        w.text_element("sf:TipoHuella", HASH_TYPE_SHA256)?;
        w.text_element("sf:Huella", hash)?;
        w.end_element(root)?;
        Ok(())
    }

    fn write_system(&self, w: &mut XmlWriter) -> Result<(), VerifactuError> {
        let system = &self.settings.system;
        w.start_element("sf:SistemaInformatico")?;
        write_party(w, &system.provider)?;
        w.text_element("sf:NombreSistemaInformatico", &system.system_name)?;
        w.text_element("sf:IdSistemaInformatico", &system.system_id)?;
        w.text_element("sf:Version", &system.version)?;
        w.text_element("sf:NumeroInstalacion", &system.installation_number.to_string())?;
        w.text_element("sf:TipoUsoPosibleSoloVerifactu", system.verifactu_only_token())?;
        w.text_element("sf:TipoUsoPosibleMultiOT", system.multiple_taxpayers_token())?;
        w.text_element("sf:IndicadorMultiplesOT", system.multiple_taxpayers_indicator())?;
        w.end_element("sf:SistemaInformatico")?;
        Ok(())
    }
}

/// `NombreRazon` followed by `NIF` (domestic) or `IDOtro` (foreign).
fn write_party(w: &mut XmlWriter, entity: &LegalEntity) -> Result<(), VerifactuError> {
    w.text_element("sf:NombreRazon", entity.name())?;
    if entity.is_domestic() {
        w.text_element("sf:NIF", entity.tax_id())?;
    } else {
        write_other_id(w, entity, entity.tax_id())?;
    }
    Ok(())
}

fn write_other_id(w: &mut XmlWriter, entity: &LegalEntity, id: &str) -> Result<(), VerifactuError> {
    w.start_element("sf:IDOtro")?;
    w.text_element("sf:CodigoPais", entity.country_code())?;
    w.text_element("sf:IDType", entity.identification_type().code())?;
    w.text_element("sf:ID", id)?;
    w.end_element("sf:IDOtro")?;
    Ok(())
}

fn write_breakdown(w: &mut XmlWriter, s: &InvoiceSubmission) -> Result<(), VerifactuError> {
    let amounts = s.amounts();
    let exempt = s.is_vat_exempt_operation();

    w.start_element("sf:Desglose")?;
    w.start_element("sf:DetalleDesglose")?;
    w.text_element("sf:Impuesto", s.tax_type().code())?;
    w.text_element("sf:ClaveRegimen", s.tax_regime().code())?;

    match (s.exempt_operation(), s.effective_qualification()) {
        (Some(code), _) => {
            w.text_element("sf:OperacionExenta", code.code())?;
        }
        (None, Some(qualification)) => {
            w.text_element("sf:CalificacionOperacion", qualification.code())?;
        }
        (None, None) => {
            return Err(VerifactuError::Validation(vec![ValidationError::with_rule(
                "operation_qualification",
                "operation qualification or exempt operation must be set",
                "CalificacionOperacion",
            )]));
        }
    }

    if !exempt {
        w.text_element("sf:TipoImpositivo", &format_amount(amounts.tax_rate))?;
    }
    w.text_element("sf:BaseImponibleOimporteNoSujeto", &format_amount(amounts.taxable_base))?;
    if !exempt {
        w.text_element("sf:CuotaRepercutida", &format_amount(amounts.tax_amount))?;
    }

    w.end_element("sf:DetalleDesglose")?;
    w.end_element("sf:Desglose")?;
    Ok(())
}

fn write_chain(w: &mut XmlWriter, header: &RecordHeader) -> Result<(), VerifactuError> {
    w.start_element("sf:Encadenamiento")?;
    match header.chain() {
        ChainLink::First => {
            w.text_element("sf:PrimerRegistro", YES)?;
        }
        ChainLink::Previous(prev) => {
            w.start_element("sf:RegistroAnterior")?;
            w.text_element("sf:IDEmisorFactura", header.issuer().tax_id())?;
            w.text_element("sf:NumSerieFactura", prev.number())?;
            w.text_element("sf:FechaExpedicionFactura", &format_date(prev.date()))?;
            w.text_element("sf:Huella", prev.hash())?;
            w.end_element("sf:RegistroAnterior")?;
        }
    }
    w.end_element("sf:Encadenamiento")?;
    Ok(())
}
