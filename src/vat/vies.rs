//! EU VIES REST API client for VAT number validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::format::{VatFormatError, sanitize_vat_number, validate_vat_format};

/// Result of a VIES VAT number check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViesResult {
    pub country_code: String,
    pub vat_number: String,
    /// Whether the VAT number is currently registered.
    pub valid: bool,
    /// Date of the request (YYYY-MM-DD).
    pub request_date: Option<String>,
    /// Registered name, when the member state discloses it.
    pub name: Option<String>,
    /// Registered address, when the member state discloses it.
    pub address: Option<String>,
}

/// Error from the VIES check.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ViesError {
    /// The number was rejected locally; no request was made.
    InvalidFormat(VatFormatError),
    /// Network or HTTP error.
    Network(String),
    /// The VIES API returned an error (e.g. member state unavailable).
    ApiError(String),
    /// Failed to parse the response.
    ParseError(String),
}

impl fmt::Display for ViesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(e) => write!(f, "VAT number is invalid: {e}"),
            Self::Network(e) => write!(f, "VIES network error: {e}"),
            Self::ApiError(e) => write!(f, "VIES API error: {e}"),
            Self::ParseError(e) => write!(f, "VIES parse error: {e}"),
        }
    }
}

impl std::error::Error for ViesError {}

impl From<VatFormatError> for ViesError {
    fn from(e: VatFormatError) -> Self {
        Self::InvalidFormat(e)
    }
}

pub const VIES_URL: &str = "https://ec.europa.eu/taxation_customs/vies/rest-api/check-vat-number";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViesApiResponse {
    country_code: Option<String>,
    vat_number: Option<String>,
    valid: Option<bool>,
    request_date: Option<String>,
    name: Option<String>,
    address: Option<String>,
    error_wrappers: Option<Vec<ViesErrorWrapper>>,
}

#[derive(Debug, Deserialize)]
struct ViesErrorWrapper {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViesRequest {
    country_code: String,
    vat_number: String,
}

impl ViesRequest {
    fn new(country_code: &str, vat_number: &str) -> Self {
        Self {
            country_code: country_code.trim().to_ascii_uppercase(),
            vat_number: sanitize_vat_number(country_code, vat_number, false),
        }
    }
}

/// Check a VAT number against the EU VIES API.
///
/// The number is validated by format first and sanitized before sending.
/// `country_code` is the VIES prefix (e.g. "ES", "EL"), `vat_number` the part
/// after it.
///
/// # Errors
///
/// `ViesError::InvalidFormat` without touching the network,
/// `ViesError::Network` on connection issues,
/// `ViesError::ApiError` if a member state is unavailable,
/// `ViesError::ParseError` on unexpected response formats.
pub async fn check_vies(country_code: &str, vat_number: &str) -> Result<ViesResult, ViesError> {
    validate_vat_format(country_code, vat_number)?;
    let req = ViesRequest::new(country_code, vat_number);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| ViesError::Network(e.to_string()))?;

    debug!(country = %req.country_code, "VIES check");
    let resp = client
        .post(VIES_URL)
        .json(&req)
        .send()
        .await
        .map_err(|e| ViesError::Network(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ViesError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(ViesError::ApiError(format!("HTTP {status}: {body}")));
    }

    parse_vies_response(&body, &req)
}

fn parse_vies_response(body: &str, req: &ViesRequest) -> Result<ViesResult, ViesError> {
    let api_resp: ViesApiResponse =
        serde_json::from_str(body).map_err(|e| ViesError::ParseError(e.to_string()))?;

    if let Some(err) = api_resp.error_wrappers.as_ref().and_then(|w| w.first()) {
        let msg = err
            .message
            .clone()
            .or_else(|| err.error.clone())
            .unwrap_or_else(|| "unknown error".into());
        return Err(ViesError::ApiError(msg));
    }

    Ok(ViesResult {
        country_code: api_resp.country_code.unwrap_or_else(|| req.country_code.clone()),
        vat_number: api_resp.vat_number.unwrap_or_else(|| req.vat_number.clone()),
        valid: api_resp.valid.unwrap_or(false),
        request_date: api_resp.request_date,
        name: api_resp.name.filter(|n| n != "---" && !n.is_empty()),
        address: api_resp.address.filter(|a| a != "---" && !a.is_empty()),
    })
}
