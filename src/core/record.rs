use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use rust_decimal::Decimal;

use super::error::{ValidationError, VerifactuError};
use super::identity::{Generator, LegalEntity, Recipient};
use super::types::*;

const MAX_NUMBER_CHARS: usize = 60;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Date format used on the wire and in the hash input (`dd-mm-yyyy`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// ISO-8601 with a numeric UTC offset, never "Z".
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Format a date as `dd-mm-yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a generation timestamp as ISO-8601 with numeric offset.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Reference to the immediately preceding record in the issuer's chain, as
/// accepted by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousRecord {
    number: String,
    date: NaiveDate,
    hash: String,
}

impl PreviousRecord {
    /// The hash is the value the authority accepted for the previous record and
    /// must not be empty.
    pub fn new(
        number: impl Into<String>,
        date: NaiveDate,
        hash: impl Into<String>,
    ) -> Result<Self, VerifactuError> {
        let number = number.into().trim().to_string();
        let hash = hash.into().trim().to_string();
        if hash.is_empty() {
            return Err(VerifactuError::invalid(
                "previous.hash",
                "previous record hash must not be empty",
            ));
        }
        if number.is_empty() {
            return Err(VerifactuError::invalid(
                "previous.number",
                "previous record number must not be empty",
            ));
        }
        Ok(Self { number, date, hash })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Position of a record in the issuer's hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChainLink {
    /// First record of the chain: empty prior hash, `PrimerRegistro=S`.
    #[default]
    First,
    /// Chained to a previously accepted record.
    Previous(PreviousRecord),
}

impl ChainLink {
    pub fn is_first(&self) -> bool {
        matches!(self, Self::First)
    }

    /// Hash fed into the next record's hash input.
    pub fn prior_hash(&self) -> &str {
        match self {
            Self::First => "",
            Self::Previous(prev) => prev.hash(),
        }
    }

    pub fn previous(&self) -> Option<&PreviousRecord> {
        match self {
            Self::First => None,
            Self::Previous(prev) => Some(prev),
        }
    }
}

/// Fields shared by submissions and cancellations.
///
/// The hash is computed at most once. After [`InvoiceRecord::seal`] every
/// setter on the owning record returns [`VerifactuError::Sealed`]; the hashed
/// fields are frozen from that point on.
#[derive(Debug, Clone)]
pub struct RecordHeader {
    issuer: LegalEntity,
    number: String,
    issue_date: NaiveDate,
    generated_at: DateTime<FixedOffset>,
    external_reference: Option<String>,
    chain: ChainLink,
    hash: OnceLock<String>,
}

impl RecordHeader {
    fn new(issuer: LegalEntity, number: String, issue_date: NaiveDate) -> Self {
        Self {
            issuer,
            number: number.trim().to_string(),
            issue_date,
            generated_at: Local::now().fixed_offset(),
            external_reference: None,
            chain: ChainLink::First,
            hash: OnceLock::new(),
        }
    }

    pub fn issuer(&self) -> &LegalEntity {
        &self.issuer
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn generated_at(&self) -> &DateTime<FixedOffset> {
        &self.generated_at
    }

    /// Generation timestamp as rendered in `FechaHoraHusoGenRegistro`.
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.generated_at)
    }

    pub fn external_reference(&self) -> Option<&str> {
        self.external_reference.as_deref()
    }

    pub fn chain(&self) -> &ChainLink {
        &self.chain
    }

    pub fn is_first(&self) -> bool {
        self.chain.is_first()
    }

    /// The sealed hash, if the record has been sealed.
    pub fn sealed_hash(&self) -> Option<&str> {
        self.hash.get().map(String::as_str)
    }

    fn ensure_unsealed(&self, field: &str) -> Result<(), VerifactuError> {
        if self.hash.get().is_some() {
            return Err(VerifactuError::Sealed(format!(
                "cannot change {field} of record {} after its hash was computed",
                self.number
            )));
        }
        Ok(())
    }

    pub(crate) fn seal_with(&self, compute: impl FnOnce() -> String) -> &str {
        self.hash.get_or_init(compute)
    }

    fn validate(&self, errors: &mut Vec<ValidationError>) {
        if self.number.is_empty() {
            errors.push(ValidationError::with_rule(
                "number",
                "invoice number must not be empty",
                "NumSerieFactura",
            ));
        }
        if self.number.chars().count() > MAX_NUMBER_CHARS {
            errors.push(ValidationError::with_rule(
                "number",
                format!("invoice number cannot exceed {MAX_NUMBER_CHARS} characters"),
                "NumSerieFactura",
            ));
        }
        if self.issuer.tax_id().is_empty() {
            errors.push(ValidationError::with_rule(
                "issuer.id",
                "issuer tax id must not be empty",
                "IDEmisorFactura",
            ));
        }
    }
}

/// Reference to the invoice corrected by a rectification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rectification {
    /// Number of the rectified invoice.
    pub number: String,
    /// Issue date of the rectified invoice.
    pub date: NaiveDate,
    /// Whether the rectified invoice was simplified.
    pub simplified: bool,
    /// Substitution or differences.
    pub correction_type: CorrectionType,
    /// Amounts of the replaced invoice, required for substitutions.
    pub rectified_amounts: Option<RectifiedAmounts>,
}

/// ImporteRectificacion: base and tax of the invoice being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectifiedAmounts {
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
}

impl Rectification {
    pub fn new(number: impl Into<String>, date: NaiveDate, simplified: bool) -> Self {
        Self {
            number: number.into().trim().to_string(),
            date,
            simplified,
            correction_type: CorrectionType::Difference,
            rectified_amounts: None,
        }
    }

    pub fn correction_type(mut self, correction_type: CorrectionType) -> Self {
        self.correction_type = correction_type;
        self
    }

    /// Rectify by substitution, carrying the replaced invoice's base and tax.
    pub fn substituting(mut self, taxable_base: Decimal, tax_amount: Decimal) -> Self {
        self.correction_type = CorrectionType::Substitution;
        self.rectified_amounts = Some(RectifiedAmounts {
            taxable_base,
            tax_amount,
        });
        self
    }
}

/// Monetary figures of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    /// TipoImpositivo (percentage).
    pub tax_rate: Decimal,
    /// BaseImponibleOimporteNoSujeto.
    pub taxable_base: Decimal,
    /// CuotaRepercutida / CuotaTotal.
    pub tax_amount: Decimal,
    /// ImporteTotal.
    pub total_amount: Decimal,
}

impl Amounts {
    pub fn new(tax_rate: Decimal, taxable_base: Decimal, tax_amount: Decimal, total_amount: Decimal) -> Self {
        Self {
            tax_rate,
            taxable_base,
            tax_amount,
            total_amount,
        }
    }
}

/// Invoice registration record (RegistroAlta).
#[derive(Debug, Clone)]
pub struct InvoiceSubmission {
    header: RecordHeader,
    invoice_type: InvoiceType,
    description: String,
    amounts: Amounts,
    recipient: Option<Recipient>,
    tax_type: TaxType,
    tax_regime: TaxRegime,
    qualification: Option<OperationQualification>,
    exempt_operation: Option<ExemptOperation>,
    rectification: Option<Rectification>,
    correction: bool,
}

impl InvoiceSubmission {
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amounts(&self) -> &Amounts {
        &self.amounts
    }

    /// The recipient, or a typed error when none was set.
    pub fn recipient(&self) -> Result<&Recipient, VerifactuError> {
        self.recipient.as_ref().ok_or_else(|| {
            VerifactuError::Validation(vec![ValidationError::with_rule(
                "recipient",
                "recipient must be set",
                "Destinatarios",
            )])
        })
    }

    pub fn has_recipient(&self) -> bool {
        self.recipient.is_some()
    }

    pub fn tax_type(&self) -> TaxType {
        self.tax_type
    }

    pub fn tax_regime(&self) -> TaxRegime {
        self.tax_regime
    }

    pub fn exempt_operation(&self) -> Option<ExemptOperation> {
        self.exempt_operation
    }

    /// The qualification as set by the caller.
    pub fn operation_qualification(&self) -> Option<OperationQualification> {
        self.qualification
    }

    /// Qualification to render: simplified invoices default to `S1`.
    pub fn effective_qualification(&self) -> Option<OperationQualification> {
        match self.qualification {
            Some(q) => Some(q),
            None if self.invoice_type.is_simplified() => Some(OperationQualification::SubjectDirect),
            None => None,
        }
    }

    /// Whether rate and tax amount are left out of the breakdown: not-subject
    /// qualifications and exempt operations.
    pub fn is_vat_exempt_operation(&self) -> bool {
        self.exempt_operation.is_some()
            || self
                .effective_qualification()
                .is_some_and(|q| q.is_vat_exempt())
    }

    pub fn rectification(&self) -> Option<&Rectification> {
        self.rectification.as_ref()
    }

    /// Subsanación: this record corrects a previously rejected or erroneous one.
    pub fn is_correction(&self) -> bool {
        self.correction
    }

    pub fn set_recipient(&mut self, recipient: Recipient) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("recipient")?;
        self.recipient = Some(recipient);
        Ok(())
    }

    pub fn set_previous(&mut self, previous: PreviousRecord) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("chain link")?;
        self.header.chain = ChainLink::Previous(previous);
        Ok(())
    }

    pub fn set_operation_qualification(
        &mut self,
        qualification: OperationQualification,
    ) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("operation qualification")?;
        self.qualification = Some(qualification);
        Ok(())
    }

    pub fn set_exempt_operation(&mut self, exempt: ExemptOperation) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("exempt operation")?;
        self.exempt_operation = Some(exempt);
        Ok(())
    }

    pub fn set_rectification(&mut self, rectification: Rectification) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("rectification")?;
        self.rectification = Some(rectification);
        Ok(())
    }

    pub fn set_correction(&mut self, correction: bool) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("correction flag")?;
        self.correction = correction;
        Ok(())
    }

    /// Check render preconditions. Returns every failure found.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.header.validate(&mut errors);

        if !self.invoice_type.omits_recipient() {
            match &self.recipient {
                None => errors.push(ValidationError::with_rule(
                    "recipient",
                    format!(
                        "recipient must be set for invoice type {}",
                        self.invoice_type.code()
                    ),
                    "Destinatarios",
                )),
                Some(recipient) => {
                    if let Some(err) = recipient.check() {
                        errors.push(err);
                    }
                }
            }
        }

        if self.effective_qualification().is_none() && self.exempt_operation.is_none() {
            errors.push(ValidationError::with_rule(
                "operation_qualification",
                "operation qualification or exempt operation must be set",
                "CalificacionOperacion",
            ));
        }

        if self.qualification.is_some() && self.exempt_operation.is_some() {
            errors.push(ValidationError::with_rule(
                "exempt_operation",
                "operation qualification and exempt operation are mutually exclusive",
                "OperacionExenta",
            ));
        }

        if self.invoice_type.is_rectification() && self.rectification.is_none() {
            errors.push(ValidationError::with_rule(
                "rectification",
                format!(
                    "rectified invoice data required for invoice type {}",
                    self.invoice_type.code()
                ),
                "FacturasRectificadas",
            ));
        }

        if self.description.is_empty() {
            errors.push(ValidationError::with_rule(
                "description",
                "operation description must not be empty",
                "DescripcionOperacion",
            ));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            errors.push(ValidationError::with_rule(
                "description",
                format!("operation description cannot exceed {MAX_DESCRIPTION_CHARS} characters"),
                "DescripcionOperacion",
            ));
        }

        if let Some(rect) = &self.rectification {
            if rect.correction_type == CorrectionType::Substitution
                && rect.rectified_amounts.is_none()
            {
                errors.push(ValidationError::with_rule(
                    "rectification.amounts",
                    "rectification by substitution requires the replaced invoice amounts",
                    "ImporteRectificacion",
                ));
            }
        }

        errors
    }
}

/// Builder for [`InvoiceSubmission`].
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use verifactu::core::*;
///
/// let invoice = SubmissionBuilder::new(
///     LegalEntity::new("Issuer SL", "89890001K"),
///     "12345678/G33",
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     InvoiceType::Standard,
/// )
/// .description("Consulting")
/// .amounts(Amounts::new(dec!(21), dec!(100), dec!(21), dec!(121)))
/// .recipient(Recipient::domestic("Buyer SA", "12345678L").unwrap())
/// .qualification(OperationQualification::SubjectDirect)
/// .build()
/// .unwrap();
///
/// assert!(invoice.validate().is_empty());
/// ```
pub struct SubmissionBuilder {
    issuer: LegalEntity,
    number: String,
    issue_date: NaiveDate,
    invoice_type: InvoiceType,
    description: String,
    amounts: Amounts,
    recipient: Option<Recipient>,
    tax_type: TaxType,
    tax_regime: TaxRegime,
    qualification: Option<OperationQualification>,
    exempt_operation: Option<ExemptOperation>,
    rectification: Option<Rectification>,
    correction: bool,
    external_reference: Option<String>,
    generated_at: Option<DateTime<FixedOffset>>,
    previous: Option<PreviousRecord>,
}

impl SubmissionBuilder {
    pub fn new(
        issuer: LegalEntity,
        number: impl Into<String>,
        issue_date: NaiveDate,
        invoice_type: InvoiceType,
    ) -> Self {
        Self {
            issuer,
            number: number.into(),
            issue_date,
            invoice_type,
            description: String::new(),
            amounts: Amounts::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            recipient: None,
            tax_type: TaxType::default(),
            tax_regime: TaxRegime::default(),
            qualification: None,
            exempt_operation: None,
            rectification: None,
            correction: false,
            external_reference: None,
            generated_at: None,
            previous: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn amounts(mut self, amounts: Amounts) -> Self {
        self.amounts = amounts;
        self
    }

    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn tax_type(mut self, tax_type: TaxType) -> Self {
        self.tax_type = tax_type;
        self
    }

    pub fn tax_regime(mut self, regime: TaxRegime) -> Self {
        self.tax_regime = regime;
        self
    }

    pub fn qualification(mut self, qualification: OperationQualification) -> Self {
        self.qualification = Some(qualification);
        self
    }

    pub fn exempt(mut self, exempt: ExemptOperation) -> Self {
        self.exempt_operation = Some(exempt);
        self
    }

    pub fn rectifies(mut self, rectification: Rectification) -> Self {
        self.rectification = Some(rectification);
        self
    }

    pub fn correction(mut self) -> Self {
        self.correction = true;
        self
    }

    pub fn external_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// Generation timestamp. Defaults to the local time at build.
    pub fn generated_at(mut self, ts: DateTime<FixedOffset>) -> Self {
        self.generated_at = Some(ts);
        self
    }

    pub fn previous(mut self, previous: PreviousRecord) -> Self {
        self.previous = Some(previous);
        self
    }

    /// Assemble the record. Field checks run in [`InvoiceSubmission::validate`]
    /// so that every violation is reported together at render time.
    pub fn build(self) -> Result<InvoiceSubmission, VerifactuError> {
        let mut header = RecordHeader::new(self.issuer, self.number, self.issue_date);
        if let Some(ts) = self.generated_at {
            header.generated_at = ts;
        }
        header.external_reference = self.external_reference;
        if let Some(prev) = self.previous {
            header.chain = ChainLink::Previous(prev);
        }

        Ok(InvoiceSubmission {
            header,
            invoice_type: self.invoice_type,
            description: self.description.trim().to_string(),
            amounts: self.amounts,
            recipient: self.recipient,
            tax_type: self.tax_type,
            tax_regime: self.tax_regime,
            qualification: self.qualification,
            exempt_operation: self.exempt_operation,
            rectification: self.rectification,
            correction: self.correction,
        })
    }
}

/// Builder for [`InvoiceCancellation`].
#[derive(Debug, Clone)]
pub struct CancellationBuilder {
    issuer: LegalEntity,
    number: String,
    issue_date: NaiveDate,
    generated_at: Option<DateTime<FixedOffset>>,
    external_reference: Option<String>,
    previous: Option<PreviousRecord>,
    generator: Option<Generator>,
}

impl CancellationBuilder {
    /// Cancellation of invoice `number` issued on `issue_date`.
    pub fn new(issuer: LegalEntity, number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            issuer,
            number: number.into(),
            issue_date,
            generated_at: None,
            external_reference: None,
            previous: None,
            generator: None,
        }
    }

    /// Generation timestamp. Defaults to the local time at build.
    pub fn generated_at(mut self, ts: DateTime<FixedOffset>) -> Self {
        self.generated_at = Some(ts);
        self
    }

    pub fn external_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// The issuer's last accepted record. Leave unset for a record that opens
    /// the chain.
    pub fn previous(mut self, previous: PreviousRecord) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> InvoiceCancellation {
        let mut cancellation =
            InvoiceCancellation::new(self.issuer, self.number, self.issue_date, self.previous);
        if let Some(ts) = self.generated_at {
            cancellation.header.generated_at = ts;
        }
        cancellation.header.external_reference = self.external_reference;
        cancellation.generator = self.generator;
        cancellation
    }
}

/// Invoice cancellation record (RegistroAnulacion).
#[derive(Debug, Clone)]
pub struct InvoiceCancellation {
    header: RecordHeader,
    generator: Option<Generator>,
}

impl InvoiceCancellation {
    /// Cancellation of invoice `number` issued on `issue_date`.
    ///
    /// `previous` is the issuer's last accepted record; `None` for a record that
    /// opens the chain.
    pub fn new(
        issuer: LegalEntity,
        number: impl Into<String>,
        issue_date: NaiveDate,
        previous: Option<PreviousRecord>,
    ) -> Self {
        let mut header = RecordHeader::new(issuer, number.into(), issue_date);
        if let Some(prev) = previous {
            header.chain = ChainLink::Previous(prev);
        }
        Self {
            header,
            generator: None,
        }
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn set_generated_at(&mut self, ts: DateTime<FixedOffset>) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("generation timestamp")?;
        self.header.generated_at = ts;
        Ok(())
    }

    pub fn set_external_reference(
        &mut self,
        reference: impl Into<String>,
    ) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("external reference")?;
        self.header.external_reference = Some(reference.into());
        Ok(())
    }

    /// Hash this cancellation chains to (empty for the first record).
    pub fn prior_hash(&self) -> &str {
        self.header.chain.prior_hash()
    }

    /// The generator, or a typed error when none was set.
    pub fn generator(&self) -> Result<&Generator, VerifactuError> {
        self.generator
            .as_ref()
            .ok_or_else(|| VerifactuError::invalid("generator", "generator is not set"))
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn set_generator(&mut self, generator: Generator) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("generator")?;
        self.generator = Some(generator);
        Ok(())
    }

    pub fn set_previous(&mut self, previous: PreviousRecord) -> Result<(), VerifactuError> {
        self.header.ensure_unsealed("chain link")?;
        self.header.chain = ChainLink::Previous(previous);
        Ok(())
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.header.validate(&mut errors);
        if let Some(generator) = &self.generator {
            if generator.entity.tax_id().is_empty() {
                errors.push(ValidationError::with_rule(
                    "generator.id",
                    "generator tax id must not be empty",
                    "Generador",
                ));
            }
        }
        errors
    }
}

/// A record to register: either an invoice or an invoice cancellation.
#[derive(Debug, Clone)]
pub enum InvoiceRecord {
    Submission(InvoiceSubmission),
    Cancellation(InvoiceCancellation),
}

impl InvoiceRecord {
    pub fn header(&self) -> &RecordHeader {
        match self {
            Self::Submission(s) => &s.header,
            Self::Cancellation(c) => &c.header,
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        match self {
            Self::Submission(s) => s.validate(),
            Self::Cancellation(c) => c.validate(),
        }
    }

    /// Compute the chain hash from the record's own timestamp and freeze it.
    /// Later calls return the stored value.
    pub fn seal(&self) -> &str {
        let header = self.header();
        header.seal_with(|| super::hash::compute_hash(self, None))
    }

    pub fn is_sealed(&self) -> bool {
        self.header().sealed_hash().is_some()
    }
}

impl From<InvoiceSubmission> for InvoiceRecord {
    fn from(s: InvoiceSubmission) -> Self {
        Self::Submission(s)
    }
}

impl From<InvoiceCancellation> for InvoiceRecord {
    fn from(c: InvoiceCancellation) -> Self {
        Self::Cancellation(c)
    }
}
