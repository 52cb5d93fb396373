//! Reader for the authority's SOAP response.
//!
//! Elements are matched by local name so prefix choices on the server side
//! do not matter.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::result::{Duplicate, LineResult, RecordStatus};
use crate::core::VerifactuError;

/// Fields read from a response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// SOAP `faultstring`, when the server answered with a fault.
    pub fault: Option<String>,
    /// Raw `EstadoEnvio`.
    pub status: Option<String>,
    pub csv: Option<String>,
    pub presentation_timestamp: Option<String>,
    pub wait_time: Option<u32>,
    pub lines: Vec<LineResult>,
}

/// Parse a response body. Only malformed XML is an error; missing elements
/// are left as `None` for the caller to judge.
pub fn parse_response(xml: &str) -> Result<ParsedResponse, VerifactuError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedResponse::default();
    let mut path: Vec<String> = Vec::new();
    let mut line: Option<LineResult> = None;
    let mut in_fault = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "RespuestaLinea" => line = Some(LineResult::default()),
                    "RegistroDuplicado" => {
                        if let Some(l) = line.as_mut() {
                            l.duplicate = Some(Duplicate::default());
                        }
                    }
                    "Fault" => in_fault = true,
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| VerifactuError::Xml(format!("response text: {err}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    handle_text(&mut parsed, line.as_mut(), &path, in_fault, text);
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "RespuestaLinea" {
                    if let Some(l) = line.take() {
                        parsed.lines.push(l);
                    }
                }
                if ended == "Fault" {
                    in_fault = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VerifactuError::Xml(format!(
                    "response parse error at {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    Ok(parsed)
}

fn handle_text(
    parsed: &mut ParsedResponse,
    line: Option<&mut LineResult>,
    path: &[String],
    in_fault: bool,
    text: &str,
) {
    let Some(current) = path.last().map(String::as_str) else {
        return;
    };

    if in_fault {
        if current == "faultstring" {
            parsed.fault = Some(text.to_string());
        }
        return;
    }

    if let Some(line) = line {
        let parent = path.iter().rev().nth(1).map(String::as_str);
        match (parent, current) {
            (Some("RegistroDuplicado"), "IdPeticionRegistroDuplicado") => {
                if let Some(d) = line.duplicate.as_mut() {
                    d.request_id = Some(text.to_string());
                }
            }
            (Some("RegistroDuplicado"), "EstadoRegistroDuplicado") => {
                if let Some(d) = line.duplicate.as_mut() {
                    d.status = Some(text.to_string());
                }
            }
            (Some("RegistroDuplicado"), "CodigoErrorRegistro") => {
                if let Some(d) = line.duplicate.as_mut() {
                    d.error_code = text.parse().ok();
                }
            }
            (Some("RegistroDuplicado"), "DescripcionErrorRegistro") => {
                if let Some(d) = line.duplicate.as_mut() {
                    d.error_description = Some(text.to_string());
                }
            }
            (_, "IDEmisorFactura") | (_, "IDEmisorFacturaAnulada") => {
                line.issuer_id = Some(text.to_string())
            }
            (_, "NumSerieFactura") | (_, "NumSerieFacturaAnulada") => {
                line.number = Some(text.to_string())
            }
            (_, "FechaExpedicionFactura") | (_, "FechaExpedicionFacturaAnulada") => {
                line.issue_date = Some(text.to_string())
            }
            (_, "TipoOperacion") => line.operation = Some(text.to_string()),
            (Some("RespuestaLinea"), "EstadoRegistro") => {
                line.status = RecordStatus::from_code(text)
            }
            (Some("RespuestaLinea"), "CodigoErrorRegistro") => line.error_code = text.parse().ok(),
            (Some("RespuestaLinea"), "DescripcionErrorRegistro") => {
                line.error_description = Some(text.to_string())
            }
            _ => {}
        }
        return;
    }

    match current {
        "CSV" => parsed.csv = Some(text.to_string()),
        "TimestampPresentacion" => parsed.presentation_timestamp = Some(text.to_string()),
        "TiempoEsperaEnvio" => parsed.wait_time = text.parse().ok(),
        "EstadoEnvio" => parsed.status = Some(text.to_string()),
        _ => {}
    }
}
