//! # verifactu
//!
//! Invoice registration records for the Spanish Veri*Factu system: record
//! model, SHA-256 hash chain, schema-exact XML, XML-DSig signing and SOAP
//! submission to the AEAT.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are rounded half away
//! from zero to two decimals wherever they enter the hash or the XML.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use verifactu::config::Settings;
//! use verifactu::xml::RecordXmlBuilder;
//! use verifactu::*;
//!
//! let invoice = SubmissionBuilder::new(
//!     LegalEntity::new("Issuer SL", "89890001K"),
//!     "A-2024-001",
//!     NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
//!     InvoiceType::Standard,
//! )
//! .description("Consulting services")
//! .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
//! .qualification(OperationQualification::SubjectDirect)
//! .amounts(Amounts::new(dec!(21), dec!(100), dec!(21), dec!(121)))
//! .build()
//! .unwrap();
//!
//! let record = InvoiceRecord::from(invoice);
//! let document = RecordXmlBuilder::new(&Settings::default()).build(&record).unwrap();
//! assert_eq!(document.hash().len(), 64);
//! assert!(document.xml().starts_with("<sf:RegistroAlta"));
//! ```
//!
//! ## Pipeline
//!
//! [`xml::RecordXmlBuilder`] → `sign::XmlSigner` → [`xml::EnvelopeBuilder`] →
//! `submit::SubmissionClient`. Each stage only accepts the output type of the
//! previous one, so an unsigned record cannot be wrapped and an unwrapped one
//! cannot be sent.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Record model, hash chain, record XML, envelope, QR link, settings |
//! | `sign` | Enveloped XML-DSig signing, certificate bundle |
//! | `submit` | SOAP client, response parsing, typed results |
//! | `vat` | VAT number format validation, VIES |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod config;

#[cfg(feature = "core")]
pub mod qr;

#[cfg(feature = "core")]
pub mod xml;

#[cfg(feature = "sign")]
pub mod sign;

#[cfg(feature = "submit")]
pub mod submit;

#[cfg(feature = "vat")]
pub mod vat;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
