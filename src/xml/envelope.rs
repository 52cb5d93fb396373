use super::document::{Envelope, SignedRecord};
use super::writer::XmlWriter;
use super::{DS_NAMESPACE, SF_NAMESPACE, SFLR_NAMESPACE};
use crate::core::VerifactuError;

/// Wraps a signed record in `sfLR:RegFactuSistemaFacturacion`.
///
/// The header repeats the issuer's name and tax id; the body holds the signed
/// record bytes unchanged. No XML prolog is emitted.
pub struct EnvelopeBuilder;

impl EnvelopeBuilder {
    pub fn wrap(signed: &SignedRecord) -> Result<Envelope, VerifactuError> {
        let issuer = signed.issuer();
        let mut w = XmlWriter::new();

        w.start_element_with_attrs(
            "sfLR:RegFactuSistemaFacturacion",
            &[
                ("xmlns:ds", DS_NAMESPACE),
                ("xmlns:sf", SF_NAMESPACE),
                ("xmlns:sfLR", SFLR_NAMESPACE),
            ],
        )?;
        w.start_element("sfLR:Cabecera")?;
        w.start_element("sf:ObligadoEmision")?;
        w.text_element("sf:NombreRazon", issuer.name())?;
        w.text_element("sf:NIF", issuer.tax_id())?;
        w.end_element("sf:ObligadoEmision")?;
        w.end_element("sfLR:Cabecera")?;

        w.start_element("sfLR:RegistroFactura")?;
        w.raw(strip_prolog(signed.xml()))?;
        w.end_element("sfLR:RegistroFactura")?;
        w.end_element("sfLR:RegFactuSistemaFacturacion")?;

        Ok(Envelope {
            xml: w.into_string()?,
            hash: signed.hash().to_string(),
            timestamp: signed.timestamp().to_string(),
        })
    }
}

/// Drop a leading `<?xml ...?>` declaration, if any.
pub(crate) fn strip_prolog(xml: &str) -> &str {
    let trimmed = xml.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return trimmed[end + 2..].trim_start();
        }
    }
    trimmed
}
