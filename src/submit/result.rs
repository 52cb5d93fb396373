use serde::Serialize;

use crate::core::{TransportFault, VerifactuError};

/// `EstadoEnvio`: outcome of the whole submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubmissionStatus {
    /// Correcto
    Accepted,
    /// ParcialmenteCorrecto
    PartiallyAccepted,
    /// Incorrecto
    Rejected,
}

impl SubmissionStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Accepted => "Correcto",
            Self::PartiallyAccepted => "ParcialmenteCorrecto",
            Self::Rejected => "Incorrecto",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Correcto" => Some(Self::Accepted),
            "ParcialmenteCorrecto" => Some(Self::PartiallyAccepted),
            "Incorrecto" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// `EstadoRegistro`: outcome of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordStatus {
    /// Correcto
    Accepted,
    /// AceptadoConErrores
    AcceptedWithErrors,
    /// Incorrecto
    Rejected,
}

impl RecordStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Accepted => "Correcto",
            Self::AcceptedWithErrors => "AceptadoConErrores",
            Self::Rejected => "Incorrecto",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Correcto" => Some(Self::Accepted),
            "AceptadoConErrores" => Some(Self::AcceptedWithErrors),
            "Incorrecto" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Final state of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Accepted,
    PartiallyAccepted,
    Rejected,
    /// Network or RPC-layer failure, or a response without a status.
    TransportFailed,
}

/// The authority already holds a record with the same identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    /// IdPeticionRegistroDuplicado
    pub request_id: Option<String>,
    /// EstadoRegistroDuplicado
    pub status: Option<String>,
    /// CodigoErrorRegistro of the duplicated record.
    pub error_code: Option<u32>,
    /// DescripcionErrorRegistro of the duplicated record.
    pub error_description: Option<String>,
}

/// One `RespuestaLinea`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineResult {
    pub issuer_id: Option<String>,
    pub number: Option<String>,
    pub issue_date: Option<String>,
    /// TipoOperacion (`Alta` / `Anulacion`).
    pub operation: Option<String>,
    pub status: Option<RecordStatus>,
    /// CodigoErrorRegistro
    pub error_code: Option<u32>,
    /// DescripcionErrorRegistro
    pub error_description: Option<String>,
    pub duplicate: Option<Duplicate>,
}

/// Everything known about one submission, including failures.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub outcome: Outcome,
    /// EstadoEnvio, when the response carried one.
    pub status: Option<SubmissionStatus>,
    /// Hash of the submitted record.
    pub hash: String,
    /// Presentation timestamp assigned by the authority, or the record's own
    /// generation timestamp when the response has none.
    pub timestamp: String,
    /// Secure verification code (CSV).
    pub csv: Option<String>,
    /// TiempoEsperaEnvio, in seconds.
    pub wait_time: Option<u32>,
    pub lines: Vec<LineResult>,
    #[serde(skip)]
    pub errors: Vec<VerifactuError>,
    pub request: Option<String>,
    pub response: Option<String>,
}

impl SubmissionResult {
    pub(crate) fn new(hash: &str, timestamp: &str) -> Self {
        Self {
            outcome: Outcome::TransportFailed,
            status: None,
            hash: hash.to_string(),
            timestamp: timestamp.to_string(),
            csv: None,
            wait_time: None,
            lines: Vec::new(),
            errors: Vec::new(),
            request: None,
            response: None,
        }
    }

    /// The record was registered, possibly with warnings.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted | Outcome::PartiallyAccepted)
            && !self
                .lines
                .iter()
                .any(|l| l.status == Some(RecordStatus::Rejected))
    }

    /// First authority error code among the lines.
    pub fn error_code(&self) -> Option<u32> {
        self.lines.iter().find_map(|l| l.error_code)
    }

    /// First authority error description among the lines.
    pub fn error_description(&self) -> Option<&str> {
        self.lines.iter().find_map(|l| l.error_description.as_deref())
    }

    /// Duplicate marker of the first line reporting one.
    pub fn duplicate(&self) -> Option<&Duplicate> {
        self.lines.iter().find_map(|l| l.duplicate.as_ref())
    }

    /// The transport fault, if the send failed below the protocol level.
    pub fn fault(&self) -> Option<&TransportFault> {
        self.errors.iter().find_map(|e| match e {
            VerifactuError::Transport(fault) => Some(fault),
            _ => None,
        })
    }
}
