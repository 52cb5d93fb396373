//! Verification link printed as a QR code on issued invoices.
//!
//! Only the URL is produced here; rendering the code image is left to the
//! caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use url::form_urlencoded::Serializer;

use crate::config::{Environment, Settings};
use crate::core::{InvoiceSubmission, format_amount, format_date};

/// Link for a submission record, in the configured environment.
pub fn verification_url(settings: &Settings, record: &InvoiceSubmission) -> String {
    let header = record.header();
    build_url(
        settings.environment,
        header.issuer().tax_id(),
        header.number(),
        header.issue_date(),
        record.amounts().total_amount,
    )
}

/// `ValidarQR` link with `nif`, `numserie`, `fecha` and `importe`.
pub fn build_url(
    environment: Environment,
    issuer_id: &str,
    number: &str,
    date: NaiveDate,
    total: Decimal,
) -> String {
    let query = Serializer::new(String::new())
        .append_pair("nif", issuer_id)
        .append_pair("numserie", number)
        .append_pair("fecha", &format_date(date))
        .append_pair("importe", &format_amount(total))
        .finish();
    format!("{}{query}", environment.qr_base_url())
}
