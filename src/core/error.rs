use thiserror::Error;

/// Errors that can occur while building, signing or submitting a record.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VerifactuError {
    /// One or more preconditions failed. All failures are reported together.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Recipient construction rejected the supplied identity.
    #[error("recipient error: {0}")]
    Recipient(String),

    /// Certificate or key material is missing, unsupported or expired.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// The XML signature could not be produced.
    #[error("signing error: {0}")]
    Signing(String),

    /// Network or RPC-layer failure.
    #[error("transport fault: {0}")]
    Transport(TransportFault),

    /// The authority answered with a well-formed but incomplete response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A hashed field was modified after the record hash was sealed.
    #[error("record sealed: {0}")]
    Sealed(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl VerifactuError {
    /// Shorthand for a single-entry validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationError::new(field, message)])
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "recipient.id").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Name of the schema element the rule protects, if any (e.g. "CalificacionOperacion").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule reference.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error tied to a schema element.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// Transport-level failure with the last raw exchange attached for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFault {
    /// Underlying fault message (network error, HTTP status, SOAP fault string).
    pub message: String,
    /// Last raw request body, if one was produced.
    pub request: Option<String>,
    /// Last raw response body, if one was received.
    pub response: Option<String>,
}

impl TransportFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            request: None,
            response: None,
        }
    }

    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

impl std::fmt::Display for TransportFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
