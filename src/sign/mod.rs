//! Enveloped XML-DSig signatures over rendered records.
//!
//! The record is already in canonical form, so the reference digest is taken
//! over the record bytes directly and `SignedInfo` is serialized canonically
//! before signing with RSA-SHA256 (PKCS#1 v1.5).

mod certificate;

pub use certificate::{CertificateBundle, CertificateSource, check_validity};

use base64ct::{Base64, Encoding};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::der::Decode;

use crate::core::VerifactuError;
use crate::xml::writer::XmlWriter;
use crate::xml::{DS_NAMESPACE, RecordDocument, SignedRecord};

/// Exclusive XML canonicalization 1.0.
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
/// RSA with SHA-256.
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
/// SHA-256 digest.
pub const SHA256_DIGEST: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
/// Enveloped-signature transform.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

fn signing_error(context: &str, e: impl std::fmt::Display) -> VerifactuError {
    VerifactuError::Signing(format!("{context}: {e}"))
}

/// Signs [`RecordDocument`]s with the issuer's key.
pub struct XmlSigner {
    key: SigningKey<Sha256>,
    certificate_b64: String,
    subject: String,
}

impl XmlSigner {
    /// Parse the key material handed out by a [`CertificateSource`].
    pub fn new(source: &impl CertificateSource) -> Result<Self, VerifactuError> {
        let cert_der = source.certificate();
        let key_der = source.private_key();
        if cert_der.is_empty() {
            return Err(VerifactuError::Signing("certificate is missing".into()));
        }
        if key_der.is_empty() {
            return Err(VerifactuError::Signing("private key is missing".into()));
        }

        let cert = Certificate::from_der(cert_der)
            .map_err(|e| signing_error("certificate parse error", e))?;
        let private_key = RsaPrivateKey::from_pkcs8_der(key_der)
            .map_err(|e| signing_error("private key parse error", e))?;

        Ok(Self {
            key: SigningKey::<Sha256>::new(private_key),
            certificate_b64: Base64::encode_string(cert_der),
            subject: cert.tbs_certificate.subject.to_string(),
        })
    }

    /// Subject name placed in `X509SubjectName`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Append an enveloped signature as the last child of the record root.
    pub fn sign(&self, document: RecordDocument) -> Result<SignedRecord, VerifactuError> {
        let digest = digest_base64(document.xml());
        let signed_info = signed_info_xml(&digest, true)?;

        let signature = self
            .key
            .try_sign(signed_info.as_bytes())
            .map_err(|e| signing_error("signature failed", e))?;
        let signature_b64 = Base64::encode_string(&signature.to_vec());
        debug!(digest = %digest, subject = %self.subject, "record signed");

        let signature_xml = self.signature_xml(&digest, &signature_b64)?;
        let xml = insert_before_root_end(document.xml(), &signature_xml)?;
        Ok(SignedRecord::new(document, xml))
    }

    fn signature_xml(&self, digest: &str, signature_b64: &str) -> Result<String, VerifactuError> {
        let mut w = XmlWriter::new();
        w.start_element_with_attrs("ds:Signature", &[("xmlns:ds", DS_NAMESPACE)])?;
        w.raw(&signed_info_xml(digest, false)?)?;
        w.text_element("ds:SignatureValue", signature_b64)?;
        w.start_element("ds:KeyInfo")?;
        w.start_element("ds:X509Data")?;
        w.text_element("ds:X509SubjectName", &self.subject)?;
        w.text_element("ds:X509Certificate", &self.certificate_b64)?;
        w.end_element("ds:X509Data")?;
        w.end_element("ds:KeyInfo")?;
        w.end_element("ds:Signature")?;
        w.into_string()
    }
}

/// Base64 SHA-256 of the canonical record bytes.
pub fn digest_base64(canonical: &str) -> String {
    Base64::encode_string(&Sha256::digest(canonical.as_bytes()))
}

/// Canonical `ds:SignedInfo`. As the apex of the signed subset it carries
/// its own `xmlns:ds`; inside `ds:Signature` the declaration is inherited.
pub fn signed_info_xml(digest: &str, standalone: bool) -> Result<String, VerifactuError> {
    let mut w = XmlWriter::new();
    if standalone {
        w.start_element_with_attrs("ds:SignedInfo", &[("xmlns:ds", DS_NAMESPACE)])?;
    } else {
        w.start_element("ds:SignedInfo")?;
    }
    w.empty_element_with_attrs("ds:CanonicalizationMethod", &[("Algorithm", EXC_C14N)])?;
    w.empty_element_with_attrs("ds:SignatureMethod", &[("Algorithm", RSA_SHA256)])?;
    w.start_element_with_attrs("ds:Reference", &[("URI", "")])?;
    w.start_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:Transform", &[("Algorithm", ENVELOPED_SIGNATURE)])?;
    w.empty_element_with_attrs("ds:Transform", &[("Algorithm", EXC_C14N)])?;
    w.end_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:DigestMethod", &[("Algorithm", SHA256_DIGEST)])?;
    w.text_element("ds:DigestValue", digest)?;
    w.end_element("ds:Reference")?;
    w.end_element("ds:SignedInfo")?;
    w.into_string()
}

fn insert_before_root_end(xml: &str, fragment: &str) -> Result<String, VerifactuError> {
    let pos = xml
        .rfind("</")
        .ok_or_else(|| VerifactuError::Signing("record has no closing root tag".into()))?;
    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..pos]);
    out.push_str(fragment);
    out.push_str(&xml[pos..]);
    Ok(out)
}
