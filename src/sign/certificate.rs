use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, SecretDocument};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::der::{Decode, DecodePem, Encode};

use crate::core::VerifactuError;

/// Key material supplied to the signer and the mutual-TLS transport.
///
/// Implementations must refuse to hand out material for a missing,
/// unsupported or expired certificate; the signer assumes that check
/// already happened.
pub trait CertificateSource {
    /// DER-encoded X.509 certificate.
    fn certificate(&self) -> &[u8];
    /// DER-encoded PKCS#8 RSA private key.
    fn private_key(&self) -> &[u8];
}

/// In-memory certificate and private key, checked for validity on load.
///
/// Decrypting PKCS#12 containers or encrypted keys happens before this
/// point; the bundle takes plain DER or PEM.
pub struct CertificateBundle {
    certificate: Vec<u8>,
    private_key: SecretDocument,
    subject: String,
}

impl std::fmt::Debug for CertificateBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateBundle")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

fn cert_error(context: &str, e: impl std::fmt::Display) -> VerifactuError {
    VerifactuError::Certificate(format!("{context}: {e}"))
}

impl CertificateBundle {
    /// Load from a DER certificate and a DER private key (PKCS#8 or PKCS#1).
    pub fn from_der(certificate: &[u8], private_key: &[u8]) -> Result<Self, VerifactuError> {
        if certificate.is_empty() {
            return Err(VerifactuError::Certificate("certificate is missing".into()));
        }
        if private_key.is_empty() {
            return Err(VerifactuError::Certificate("private key is missing".into()));
        }
        let cert = Certificate::from_der(certificate)
            .map_err(|e| cert_error("unsupported certificate", e))?;
        let key = RsaPrivateKey::from_pkcs8_der(private_key)
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(private_key))
            .map_err(|e| cert_error("unsupported private key", e))?;
        Self::assemble(cert, key, SystemTime::now())
    }

    /// Load from PEM text. The key may be `PRIVATE KEY` or `RSA PRIVATE KEY`.
    pub fn from_pem(certificate: &str, private_key: &str) -> Result<Self, VerifactuError> {
        if certificate.trim().is_empty() {
            return Err(VerifactuError::Certificate("certificate is missing".into()));
        }
        if private_key.trim().is_empty() {
            return Err(VerifactuError::Certificate("private key is missing".into()));
        }
        let cert = Certificate::from_pem(certificate.as_bytes())
            .map_err(|e| cert_error("unsupported certificate", e))?;
        let key = RsaPrivateKey::from_pkcs8_pem(private_key)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key))
            .map_err(|e| cert_error("unsupported private key", e))?;
        Self::assemble(cert, key, SystemTime::now())
    }

    fn assemble(cert: Certificate, key: RsaPrivateKey, now: SystemTime) -> Result<Self, VerifactuError> {
        check_validity(&cert, now)?;

        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| cert_error("unreadable public key", e))?;
        let public = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| cert_error("certificate does not carry an RSA key", e))?;
        if public != key.to_public_key() {
            return Err(VerifactuError::Certificate(
                "private key does not match certificate".into(),
            ));
        }

        let subject = cert.tbs_certificate.subject.to_string();
        let certificate = cert
            .to_der()
            .map_err(|e| cert_error("certificate encoding", e))?;
        let private_key = key
            .to_pkcs8_der()
            .map_err(|e| cert_error("private key encoding", e))?;
        debug!(subject = %subject, "certificate loaded");

        Ok(Self {
            certificate,
            private_key,
            subject,
        })
    }

    /// RFC 4514 subject of the certificate.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl CertificateSource for CertificateBundle {
    fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    fn private_key(&self) -> &[u8] {
        self.private_key.as_bytes()
    }
}

/// Reject certificates outside their validity window at `now`.
pub fn check_validity(cert: &Certificate, now: SystemTime) -> Result<(), VerifactuError> {
    let validity = &cert.tbs_certificate.validity;
    if validity.not_after.to_system_time() < now {
        return Err(VerifactuError::Certificate(format!(
            "certificate expired on {}",
            DateTime::<Utc>::from(validity.not_after.to_system_time())
        )));
    }
    if validity.not_before.to_system_time() > now {
        return Err(VerifactuError::Certificate(format!(
            "certificate not valid before {}",
            DateTime::<Utc>::from(validity.not_before.to_system_time())
        )));
    }
    Ok(())
}
