use serde::{Deserialize, Serialize};

/// Protocol token for "yes".
pub const YES: &str = "S";
/// Protocol token for "no".
pub const NO: &str = "N";

/// Render a boolean as the protocol's fixed Yes/No token.
pub fn yes_no(value: bool) -> &'static str {
    if value { YES } else { NO }
}

/// IDType: kind of identification document in the country of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IdType {
    /// 02: VAT identification number (NIF-IVA).
    #[default]
    TaxId,
    /// 03: Passport.
    Passport,
    /// 04: Official identity document issued by the country of residence.
    NationalId,
    /// 05: Residence certificate.
    ResidenceCertificate,
    /// 06: Other supporting document.
    Other,
    /// 07: Not registered.
    Unregistered,
}

impl IdType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TaxId => "02",
            Self::Passport => "03",
            Self::NationalId => "04",
            Self::ResidenceCertificate => "05",
            Self::Other => "06",
            Self::Unregistered => "07",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "02" => Some(Self::TaxId),
            "03" => Some(Self::Passport),
            "04" => Some(Self::NationalId),
            "05" => Some(Self::ResidenceCertificate),
            "06" => Some(Self::Other),
            "07" => Some(Self::Unregistered),
            _ => None,
        }
    }
}

/// TipoFactura: invoice type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceType {
    /// F1: Standard invoice (art. 6, 7.2 and 7.3 RD 1619/2012).
    Standard,
    /// F2: Simplified invoice, or invoice without recipient identification.
    Simplified,
    /// F3: Invoice issued in replacement of declared simplified invoices.
    Replacement,
    /// R1: Rectification (error founded in law, art. 80 One, Two and Six LIVA).
    RectificationLaw,
    /// R2: Rectification (art. 80.3).
    RectificationInsolvency,
    /// R3: Rectification (art. 80.4).
    RectificationBadDebt,
    /// R4: Rectification (other cases).
    RectificationOther,
    /// R5: Rectification of simplified invoices.
    RectificationSimplified,
}

impl InvoiceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Standard => "F1",
            Self::Simplified => "F2",
            Self::Replacement => "F3",
            Self::RectificationLaw => "R1",
            Self::RectificationInsolvency => "R2",
            Self::RectificationBadDebt => "R3",
            Self::RectificationOther => "R4",
            Self::RectificationSimplified => "R5",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F1" => Some(Self::Standard),
            "F2" => Some(Self::Simplified),
            "F3" => Some(Self::Replacement),
            "R1" => Some(Self::RectificationLaw),
            "R2" => Some(Self::RectificationInsolvency),
            "R3" => Some(Self::RectificationBadDebt),
            "R4" => Some(Self::RectificationOther),
            "R5" => Some(Self::RectificationSimplified),
            _ => None,
        }
    }

    /// F2 only. Simplified rectifications are [`Self::RectificationSimplified`].
    pub fn is_simplified(&self) -> bool {
        matches!(self, Self::Simplified)
    }

    /// Whether the recipient block is omitted and the no-identification flag set.
    pub fn omits_recipient(&self) -> bool {
        matches!(self, Self::Simplified | Self::RectificationSimplified)
    }

    /// R1..R5.
    pub fn is_rectification(&self) -> bool {
        matches!(
            self,
            Self::RectificationLaw
                | Self::RectificationInsolvency
                | Self::RectificationBadDebt
                | Self::RectificationOther
                | Self::RectificationSimplified
        )
    }
}

/// TipoRectificativa: how a rectification corrects the original invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CorrectionType {
    /// S: By substitution. Carries the replaced amounts, see
    /// `Rectification::substituting`.
    Substitution,
    /// I: By differences.
    #[default]
    Difference,
}

impl CorrectionType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Substitution => "S",
            Self::Difference => "I",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Substitution),
            "I" => Some(Self::Difference),
            _ => None,
        }
    }
}

/// Impuesto: tax the breakdown refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxType {
    /// 01: Value added tax (IVA).
    #[default]
    Vat,
    /// 02: Ceuta and Melilla production, services and import tax (IPSI).
    Ipsi,
    /// 03: Canary Islands general indirect tax (IGIC).
    Igic,
    /// 05: Other.
    Other,
}

impl TaxType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vat => "01",
            Self::Ipsi => "02",
            Self::Igic => "03",
            Self::Other => "05",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Vat),
            "02" => Some(Self::Ipsi),
            "03" => Some(Self::Igic),
            "05" => Some(Self::Other),
            _ => None,
        }
    }
}

/// ClaveRegimen: VAT regime key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxRegime {
    /// 01: General regime.
    #[default]
    General,
    /// 02: Export.
    Export,
    /// 03: Used goods, art, antiques and collectibles.
    UsedGoods,
    /// 04: Investment gold.
    InvestmentGold,
    /// 05: Travel agencies.
    TravelAgencies,
    /// 06: VAT group of entities (advanced level).
    EntityGroup,
    /// 07: Cash accounting.
    CashAccounting,
    /// 08: Operations subject to IPSI / IGIC.
    IpsiIgic,
    /// 09: Travel agencies acting as intermediaries.
    TravelIntermediary,
    /// 10: Third-party collections of professional fees or rights.
    ThirdPartyCollection,
    /// 11: Business premises rental.
    PremisesRental,
    /// 14: VAT pending accrual on public-administration work certifications.
    PublicWorksPending,
    /// 15: VAT pending accrual on successive-tract operations.
    SuccessiveTractPending,
    /// 17: OSS and IOSS regimes (chapter XI title IX).
    OneStopShop,
    /// 18: Equivalence surcharge.
    EquivalenceSurcharge,
    /// 19: Agriculture, livestock and fishing (REAGYP).
    Agriculture,
    /// 20: Simplified regime.
    Simplified,
}

impl TaxRegime {
    pub fn code(&self) -> &'static str {
        match self {
            Self::General => "01",
            Self::Export => "02",
            Self::UsedGoods => "03",
            Self::InvestmentGold => "04",
            Self::TravelAgencies => "05",
            Self::EntityGroup => "06",
            Self::CashAccounting => "07",
            Self::IpsiIgic => "08",
            Self::TravelIntermediary => "09",
            Self::ThirdPartyCollection => "10",
            Self::PremisesRental => "11",
            Self::PublicWorksPending => "14",
            Self::SuccessiveTractPending => "15",
            Self::OneStopShop => "17",
            Self::EquivalenceSurcharge => "18",
            Self::Agriculture => "19",
            Self::Simplified => "20",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::General),
            "02" => Some(Self::Export),
            "03" => Some(Self::UsedGoods),
            "04" => Some(Self::InvestmentGold),
            "05" => Some(Self::TravelAgencies),
            "06" => Some(Self::EntityGroup),
            "07" => Some(Self::CashAccounting),
            "08" => Some(Self::IpsiIgic),
            "09" => Some(Self::TravelIntermediary),
            "10" => Some(Self::ThirdPartyCollection),
            "11" => Some(Self::PremisesRental),
            "14" => Some(Self::PublicWorksPending),
            "15" => Some(Self::SuccessiveTractPending),
            "17" => Some(Self::OneStopShop),
            "18" => Some(Self::EquivalenceSurcharge),
            "19" => Some(Self::Agriculture),
            "20" => Some(Self::Simplified),
            _ => None,
        }
    }
}

/// CalificacionOperacion: operation qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationQualification {
    /// S1: Subject and not exempt, no reverse charge.
    SubjectDirect,
    /// S2: Subject and not exempt, reverse charge.
    SubjectReverseCharge,
    /// N1: Not subject (art. 7, 14, others).
    NotSubjectArticle,
    /// N2: Not subject by localization rules.
    NotSubjectLocalization,
}

impl OperationQualification {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SubjectDirect => "S1",
            Self::SubjectReverseCharge => "S2",
            Self::NotSubjectArticle => "N1",
            Self::NotSubjectLocalization => "N2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S1" => Some(Self::SubjectDirect),
            "S2" => Some(Self::SubjectReverseCharge),
            "N1" => Some(Self::NotSubjectArticle),
            "N2" => Some(Self::NotSubjectLocalization),
            _ => None,
        }
    }

    /// Not-subject qualifications carry no tax rate or tax amount in the breakdown.
    pub fn is_vat_exempt(&self) -> bool {
        matches!(
            self,
            Self::NotSubjectArticle | Self::NotSubjectLocalization
        )
    }

    /// Reverse-charge / intracommunity operation.
    pub fn is_reverse_charge(&self) -> bool {
        matches!(self, Self::SubjectReverseCharge)
    }
}

/// OperacionExenta: exemption cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExemptOperation {
    /// E1: Exempt by article 20.
    Article20,
    /// E2: Exempt by article 21.
    Article21,
    /// E3: Exempt by article 22.
    Article22,
    /// E4: Exempt by articles 23 and 24.
    Articles23And24,
    /// E5: Exempt by article 25.
    Article25,
    /// E6: Exempt for other reasons.
    Other,
}

impl ExemptOperation {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Article20 => "E1",
            Self::Article21 => "E2",
            Self::Article22 => "E3",
            Self::Articles23And24 => "E4",
            Self::Article25 => "E5",
            Self::Other => "E6",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "E1" => Some(Self::Article20),
            "E2" => Some(Self::Article21),
            "E3" => Some(Self::Article22),
            "E4" => Some(Self::Articles23And24),
            "E5" => Some(Self::Article25),
            "E6" => Some(Self::Other),
            _ => None,
        }
    }
}

/// GeneradoPor: who materially generated a cancellation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorType {
    /// E: The issuer of the cancelled invoice.
    Issuer,
    /// D: The recipient.
    Recipient,
    /// T: A third party.
    ThirdParty,
}

impl GeneratorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Issuer => "E",
            Self::Recipient => "D",
            Self::ThirdParty => "T",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "E" => Some(Self::Issuer),
            "D" => Some(Self::Recipient),
            "T" => Some(Self::ThirdParty),
            _ => None,
        }
    }
}
