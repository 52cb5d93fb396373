//! SOAP submission to the AEAT Veri*Factu service.
//!
//! [`SubmissionClient::send`] never fails: transport problems, SOAP faults and
//! malformed answers are folded into the returned [`SubmissionResult`] so the
//! caller always has the hash, timestamp and raw exchange to persist.

mod response;
mod result;
mod transport;

pub use response::{ParsedResponse, parse_response};
pub use result::{
    Duplicate, LineResult, Outcome, RecordStatus, SubmissionResult, SubmissionStatus,
};
pub use transport::{HttpTransport, Transport, TransportResponse};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::core::{InvoiceRecord, TransportFault, VerifactuError};
use crate::sign::XmlSigner;
use crate::xml::{Envelope, EnvelopeBuilder, RecordXmlBuilder};

pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Wrap a registration envelope in a SOAP 1.1 body.
pub fn soap_request(envelope: &Envelope) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{SOAP_ENV_NAMESPACE}\"><soapenv:Header></soapenv:Header><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>",
        envelope.xml()
    )
}

/// Sends envelopes to the endpoint of the configured environment.
pub struct SubmissionClient<'a, T: Transport> {
    settings: &'a Settings,
    transport: T,
}

impl<'a, T: Transport> SubmissionClient<'a, T> {
    pub fn new(settings: &'a Settings, transport: T) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Build, sign, wrap and send one record.
    ///
    /// Errors before the network step (validation, signing) are returned as
    /// `Err`; everything after is reported in the result.
    pub fn submit(
        &self,
        record: &InvoiceRecord,
        signer: &XmlSigner,
    ) -> Result<SubmissionResult, VerifactuError> {
        let document = RecordXmlBuilder::new(self.settings).build(record)?;
        let signed = signer.sign(document)?;
        let envelope = EnvelopeBuilder::wrap(&signed)?;
        Ok(self.send(&envelope))
    }

    pub fn send(&self, envelope: &Envelope) -> SubmissionResult {
        let url = self.settings.environment.service_url();
        let request = soap_request(envelope);
        let mut result = SubmissionResult::new(envelope.hash(), envelope.timestamp());
        result.request = Some(request.clone());
        debug!(url, bytes = request.len(), hash = %envelope.hash(), "submitting record");

        let response = match self.transport.send(url, &request) {
            Ok(response) => response,
            Err(fault) => {
                warn!(error = %fault, "transport failed");
                result.response = fault.response.clone();
                result
                    .errors
                    .push(VerifactuError::Transport(fault.with_request(request)));
                return result;
            }
        };
        result.response = Some(response.body.clone());

        let parsed = match parse_response(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                if response.is_success() {
                    warn!(error = %e, "unreadable response");
                    result.errors.push(e);
                } else {
                    fail_http(&mut result, &request, &response);
                }
                return result;
            }
        };

        if let Some(faultstring) = parsed.fault {
            warn!(fault = %faultstring, status = response.status, "SOAP fault");
            result.errors.push(VerifactuError::Transport(
                TransportFault::new(format!("SOAP fault: {faultstring}"))
                    .with_request(request)
                    .with_response(response.body),
            ));
            return result;
        }
        if !response.is_success() {
            fail_http(&mut result, &request, &response);
            return result;
        }

        if let Some(ts) = parsed.presentation_timestamp {
            result.timestamp = ts;
        }
        result.csv = parsed.csv;
        result.wait_time = parsed.wait_time;
        result.lines = parsed.lines;

        let Some(raw_status) = parsed.status else {
            warn!("response carries no EstadoEnvio");
            result.errors.push(VerifactuError::Protocol(
                "response carries no EstadoEnvio".into(),
            ));
            return result;
        };
        let Some(status) = SubmissionStatus::from_code(&raw_status) else {
            warn!(status = %raw_status, "unknown EstadoEnvio");
            result.errors.push(VerifactuError::Protocol(format!(
                "unknown EstadoEnvio '{raw_status}'"
            )));
            return result;
        };

        result.status = Some(status);
        result.outcome = match status {
            SubmissionStatus::Accepted => Outcome::Accepted,
            SubmissionStatus::PartiallyAccepted => Outcome::PartiallyAccepted,
            SubmissionStatus::Rejected => Outcome::Rejected,
        };
        info!(
            outcome = ?result.outcome,
            csv = result.csv.as_deref().unwrap_or(""),
            error_code = ?result.error_code(),
            "submission finished"
        );
        result
    }
}

fn fail_http(result: &mut SubmissionResult, request: &str, response: &TransportResponse) {
    warn!(status = response.status, "HTTP error from service");
    result.errors.push(VerifactuError::Transport(
        TransportFault::new(format!("HTTP status {}", response.status))
            .with_request(request)
            .with_response(response.body.clone()),
    ));
}
