//! VAT number checks for foreign recipients.
//!
//! Format validation follows the VIES per-country shapes; the online check
//! calls the EU VIES REST API.
//!
//! # Example
//!
//! ```ignore
//! use verifactu::vat::*;
//!
//! // Format-only validation (no network)
//! assert!(validate_vat_format("ES", "B12345678").is_ok());
//! assert_eq!(sanitize_vat_number("ES", "es b-123.456 78", true), "B12345678");
//!
//! // VIES API check (async, requires network)
//! let result = check_vies("DE", "123456789").await?;
//! println!("{}", result.valid);
//! ```

mod format;
mod vies;

pub use format::{VatFormatError, sanitize_vat_number, validate_vat_format};
pub use vies::{VIES_URL, ViesError, ViesResult, check_vies};
