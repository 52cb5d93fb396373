//! Chain hash (Huella) computation.
//!
//! The hash input is a fixed sequence of `key=value` pairs joined with `&`,
//! with values trimmed and never URL-encoded. The digest is SHA-256 rendered
//! as 64 upper-case hex characters.

use sha2::{Digest, Sha256};

use super::money::format_amount;
use super::record::{InvoiceCancellation, InvoiceRecord, InvoiceSubmission, format_date};

/// Build the exact hash input for a record.
///
/// The timestamp is passed in so the input can be reproduced for a known
/// timestamp (e.g. the one the authority recorded).
pub fn canonical_input(record: &InvoiceRecord, timestamp: &str) -> String {
    match record {
        InvoiceRecord::Submission(s) => submission_input(s, timestamp),
        InvoiceRecord::Cancellation(c) => cancellation_input(c, timestamp),
    }
}

fn submission_input(s: &InvoiceSubmission, timestamp: &str) -> String {
    let header = s.header();
    join_pairs(&[
        ("IDEmisorFactura", header.issuer().tax_id()),
        ("NumSerieFactura", header.number()),
        ("FechaExpedicionFactura", &format_date(header.issue_date())),
        ("TipoFactura", s.invoice_type().code()),
        ("CuotaTotal", &format_amount(s.amounts().tax_amount)),
        ("ImporteTotal", &format_amount(s.amounts().total_amount)),
        ("Huella", header.chain().prior_hash()),
        ("FechaHoraHusoGenRegistro", timestamp),
    ])
}

fn cancellation_input(c: &InvoiceCancellation, timestamp: &str) -> String {
    let header = c.header();
    join_pairs(&[
        ("IDEmisorFacturaAnulada", header.issuer().tax_id()),
        ("NumSerieFacturaAnulada", header.number()),
        ("FechaExpedicionFacturaAnulada", &format_date(header.issue_date())),
        ("Huella", c.prior_hash()),
        ("FechaHoraHusoGenRegistro", timestamp),
    ])
}

fn join_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", value.trim()))
        .collect::<Vec<_>>()
        .join("&")
}

/// SHA-256 of `input`, upper-case hex.
pub fn sha256_upper_hex(input: &str) -> String {
    hex::encode_upper(Sha256::digest(input.as_bytes()))
}

/// Compute the chain hash of a record.
///
/// Pure: the record is not sealed. When `explicit_timestamp` is given it is
/// used verbatim in place of the record's own generation timestamp.
pub fn compute_hash(record: &InvoiceRecord, explicit_timestamp: Option<&str>) -> String {
    let timestamp = match explicit_timestamp {
        Some(ts) => ts.to_string(),
        None => record.header().timestamp(),
    };
    sha256_upper_hex(&canonical_input(record, &timestamp))
}
