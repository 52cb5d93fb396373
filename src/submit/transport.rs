use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::der::{Decode, EncodePem};

use crate::config::TransportOptions;
use crate::core::{TransportFault, VerifactuError};
use crate::sign::CertificateSource;

/// Raw HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves a SOAP request to the authority and brings back whatever came back.
///
/// Implementations report network-level failures as a [`TransportFault`];
/// a non-2xx answer with a body is still a response.
pub trait Transport {
    fn send(&self, url: &str, body: &str) -> Result<TransportResponse, TransportFault>;
}

/// Blocking HTTPS transport authenticated with the issuer's certificate.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client that presents `source` as its TLS client identity.
    pub fn new(
        source: &impl CertificateSource,
        options: &TransportOptions,
    ) -> Result<Self, VerifactuError> {
        let cert_pem = Certificate::from_der(source.certificate())
            .and_then(|cert| cert.to_pem(LineEnding::LF))
            .map_err(|e| VerifactuError::Certificate(format!("certificate PEM encoding: {e}")))?;
        let key_pem = RsaPrivateKey::from_pkcs8_der(source.private_key())
            .and_then(|key| key.to_pkcs8_pem(LineEnding::LF))
            .map_err(|e| VerifactuError::Certificate(format!("private key PEM encoding: {e}")))?;

        let mut pem = cert_pem.into_bytes();
        pem.extend_from_slice(key_pem.as_bytes());
        let identity = reqwest::Identity::from_pem(&pem)
            .map_err(|e| VerifactuError::Certificate(format!("client identity: {e}")))?;

        let mut builder = Client::builder().identity(identity);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| VerifactuError::Transport(TransportFault::new(format!("client setup: {e}"))))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, body: &str) -> Result<TransportResponse, TransportFault> {
        debug!(url, bytes = body.len(), "posting SOAP request");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "")
            .body(body.to_string())
            .send()
            .map_err(|e| TransportFault::new(format!("request failed: {e}")).with_request(body))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| {
            TransportFault::new(format!("response body unreadable: {e}")).with_request(body)
        })?;
        debug!(status, bytes = text.len(), "SOAP response received");

        Ok(TransportResponse { status, body: text })
    }
}
