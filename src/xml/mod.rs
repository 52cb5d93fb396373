//! Schema-exact XML for registration records and the transport envelope.
//!
//! Documents are written directly in canonical form (no declaration, no
//! indentation, namespace declarations only on the root element), so the bytes
//! produced here are the bytes that get digested and signed.

mod document;
mod envelope;
mod record;
pub mod writer;

pub use document::*;
pub use envelope::EnvelopeBuilder;
pub use record::RecordXmlBuilder;

/// Namespace of the record elements (`sf`).
pub const SF_NAMESPACE: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd";

/// Namespace of the registration envelope (`sfLR`).
pub const SFLR_NAMESPACE: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroLR.xsd";

/// XML-DSig namespace (`ds`).
pub const DS_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";

/// `IDVersion` of the record schema.
pub const RECORD_VERSION: &str = "1.0";

/// `TipoHuella` for SHA-256.
pub const HASH_TYPE_SHA256: &str = "01";
