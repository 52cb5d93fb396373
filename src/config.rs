//! Settings and environment selection.
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::SoftwareInfo;

/// Registration service, test environment.
pub const SANDBOX_SERVICE_URL: &str =
    "https://prewww1.aeat.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP";
/// Registration service, production.
pub const PRODUCTION_SERVICE_URL: &str =
    "https://www1.agenciatributaria.gob.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP";
/// QR verification base, test environment.
pub const SANDBOX_QR_URL: &str = "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR?";
/// QR verification base, production.
pub const PRODUCTION_QR_URL: &str = "https://www2.agenciatributaria.gob.es/wlpl/TIKE-CONT/ValidarQR?";

/// Which authority environment to talk to.
///
/// ```rust
/// use std::str::FromStr;
/// use verifactu::config::Environment;
///
/// assert_eq!(Environment::from_str("pre")?, Environment::Sandbox);
/// assert_eq!(Environment::from_str("PRODUCTION")?, Environment::Production);
/// # Ok::<(), verifactu::config::EnvironmentParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

/// Error returned when parsing an [`Environment`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentParseError {
    #[error("invalid environment: {input}")]
    Invalid { input: String },
}

impl FromStr for Environment {
    type Err = EnvironmentParseError;

    fn from_str(env: &str) -> Result<Self, Self::Err> {
        match env.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" | "pre" => Ok(Self::Sandbox),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(EnvironmentParseError::Invalid {
                input: env.to_string(),
            }),
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Endpoint of the registration service.
    pub fn service_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_SERVICE_URL,
            Self::Production => PRODUCTION_SERVICE_URL,
        }
    }

    /// Base of the public QR verification link, including the trailing `?`.
    pub fn qr_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_QR_URL,
            Self::Production => PRODUCTION_QR_URL,
        }
    }
}

/// Immutable settings passed into every component.
///
/// Loading is left to the caller; any serde format works.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub system: SoftwareInfo,
    #[serde(default)]
    pub environment: Environment,
}

impl Settings {
    pub fn new(system: SoftwareInfo, environment: Environment) -> Self {
        Self {
            system,
            environment,
        }
    }
}

/// Transport knobs chosen by the caller. No timeout is applied unless set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Option<Duration>,
}

impl TransportOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}
