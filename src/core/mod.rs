//! Core record types, the hash chain and validation.
//!
//! This module provides the registration record model (invoice submissions
//! and cancellations), party identities, protocol code lists and the SHA-256
//! chain hash that links each record to its predecessor.

mod countries;
mod error;
pub mod hash;
mod identity;
pub mod money;
mod record;
mod types;

pub use countries::*;
pub use error::*;
pub use hash::compute_hash;
pub use identity::*;
pub use money::format_amount;
pub use record::*;
pub use types::*;
