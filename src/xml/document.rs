use crate::core::LegalEntity;

/// Which record element a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `sf:RegistroAlta`
    Submission,
    /// `sf:RegistroAnulacion`
    Cancellation,
}

impl RecordKind {
    /// Qualified name of the record root element.
    pub fn element(&self) -> &'static str {
        match self {
            Self::Submission => "sf:RegistroAlta",
            Self::Cancellation => "sf:RegistroAnulacion",
        }
    }
}

/// A validated, hashed and rendered record. Only
/// [`RecordXmlBuilder`](super::RecordXmlBuilder) produces one, so holding a
/// value proves the build stage completed.
#[derive(Debug, Clone)]
pub struct RecordDocument {
    pub(crate) kind: RecordKind,
    pub(crate) xml: String,
    pub(crate) hash: String,
    pub(crate) timestamp: String,
    pub(crate) issuer: LegalEntity,
}

impl RecordDocument {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Canonical record XML without prolog.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Chain hash embedded as the record's last element.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// `FechaHoraHusoGenRegistro` as rendered.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn issuer(&self) -> &LegalEntity {
        &self.issuer
    }
}

/// A record carrying its enveloped signature.
#[derive(Debug, Clone)]
pub struct SignedRecord {
    pub(crate) document: RecordDocument,
    pub(crate) xml: String,
}

impl SignedRecord {
    #[cfg_attr(not(feature = "sign"), allow(dead_code))]
    pub(crate) fn new(document: RecordDocument, xml: String) -> Self {
        Self { document, xml }
    }

    /// Signed record XML without prolog.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn hash(&self) -> &str {
        self.document.hash()
    }

    pub fn timestamp(&self) -> &str {
        self.document.timestamp()
    }

    pub fn issuer(&self) -> &LegalEntity {
        self.document.issuer()
    }

    pub fn kind(&self) -> RecordKind {
        self.document.kind()
    }
}

/// The bytes to transmit: a signed record wrapped in the registration
/// envelope, prolog stripped.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub(crate) xml: String,
    pub(crate) hash: String,
    pub(crate) timestamp: String,
}

impl Envelope {
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    /// Hash of the wrapped record.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Generation timestamp of the wrapped record.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}
