use serde::{Deserialize, Deserializer, Serialize};

use super::countries::{is_domestic, is_eu_member, normalize_country, DOMESTIC_COUNTRY};
use super::error::{ValidationError, VerifactuError};
use super::types::{yes_no, GeneratorType, IdType, OperationQualification};

fn de_country<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_country(&raw))
}

/// A natural or legal person identified towards the tax authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    name: String,
    id: String,
    #[serde(deserialize_with = "de_country")]
    country_code: String,
    #[serde(default)]
    id_type: IdType,
}

impl LegalEntity {
    /// Domestic entity identified by its Spanish tax id (NIF).
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            id: id.into().trim().to_string(),
            country_code: DOMESTIC_COUNTRY.to_string(),
            id_type: IdType::TaxId,
        }
    }

    /// Entity registered in another country.
    pub fn foreign(
        name: impl Into<String>,
        id: impl Into<String>,
        country_code: &str,
        id_type: IdType,
    ) -> Self {
        Self::new(name, id).country(country_code).id_type(id_type)
    }

    pub fn country(mut self, code: &str) -> Self {
        self.country_code = normalize_country(code);
        self
    }

    pub fn id_type(mut self, id_type: IdType) -> Self {
        self.id_type = id_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_id(&self) -> &str {
        &self.id
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn identification_type(&self) -> IdType {
        self.id_type
    }

    pub fn is_domestic(&self) -> bool {
        is_domestic(&self.country_code)
    }
}

/// Invoice recipient. EU recipients must carry a tax id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    entity: LegalEntity,
}

impl Recipient {
    /// Construct a recipient, rejecting EU recipients without a tax id.
    ///
    /// ```
    /// use verifactu::core::*;
    ///
    /// assert!(Recipient::new("Kunde AG", "", "DE", IdType::TaxId).is_err());
    /// assert!(Recipient::new("Acme Inc.", "", "US", IdType::Other).is_ok());
    /// ```
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        country_code: &str,
        id_type: IdType,
    ) -> Result<Self, VerifactuError> {
        let entity = LegalEntity::foreign(name, id, country_code, id_type);
        if let Some(err) = Self::check_entity(&entity) {
            return Err(VerifactuError::Recipient(err.message));
        }
        Ok(Self { entity })
    }

    /// Domestic recipient identified by NIF.
    pub fn domestic(name: impl Into<String>, nif: impl Into<String>) -> Result<Self, VerifactuError> {
        Self::new(name, nif, DOMESTIC_COUNTRY, IdType::TaxId)
    }

    fn check_entity(entity: &LegalEntity) -> Option<ValidationError> {
        if entity.tax_id().is_empty() && is_eu_member(entity.country_code()) {
            Some(ValidationError::with_rule(
                "recipient.id",
                format!("VAT ID required for the country {}", entity.country_code()),
                "IDDestinatario",
            ))
        } else {
            None
        }
    }

    /// Render-time re-check of the construction invariant.
    pub(crate) fn check(&self) -> Option<ValidationError> {
        Self::check_entity(&self.entity)
    }

    pub fn entity(&self) -> &LegalEntity {
        &self.entity
    }

    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn tax_id(&self) -> &str {
        self.entity.tax_id()
    }

    pub fn country_code(&self) -> &str {
        self.entity.country_code()
    }

    pub fn identification_type(&self) -> IdType {
        self.entity.identification_type()
    }

    pub fn is_domestic(&self) -> bool {
        self.entity.is_domestic()
    }

    /// Id to place in `IDOtro/ID`.
    ///
    /// Reverse-charge operations with an EU recipient use the VAT id with its
    /// country prefix; every other case uses the bare id.
    pub fn effective_id(&self, qualification: Option<OperationQualification>) -> String {
        let reverse_charge = qualification.is_some_and(|q| q.is_reverse_charge());
        let id = self.tax_id();
        let country = self.country_code();
        if reverse_charge && is_eu_member(country) && !id.starts_with(country) {
            format!("{country}{id}")
        } else {
            id.to_string()
        }
    }
}

/// Who produced a cancellation record, with their identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub kind: GeneratorType,
    pub entity: LegalEntity,
}

impl Generator {
    pub fn new(kind: GeneratorType, entity: LegalEntity) -> Self {
        Self { kind, entity }
    }
}

/// Identity of the invoicing software and its vendor (SistemaInformatico).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInfo {
    /// Vendor of the invoicing software.
    pub provider: LegalEntity,
    /// NombreSistemaInformatico.
    pub system_name: String,
    /// IdSistemaInformatico (two characters).
    pub system_id: String,
    /// Version.
    pub version: String,
    /// NumeroInstalacion.
    pub installation_number: u32,
    /// TipoUsoPosibleSoloVerifactu.
    pub verifactu_only: bool,
    /// TipoUsoPosibleMultiOT.
    pub multiple_taxpayers: bool,
    /// Whether the installation serves a single taxpayer. Rendered inverted
    /// as IndicadorMultiplesOT.
    pub single_taxpayer_mode: bool,
}

impl SoftwareInfo {
    pub fn new(
        provider: LegalEntity,
        system_name: impl Into<String>,
        system_id: impl Into<String>,
        version: impl Into<String>,
        installation_number: u32,
    ) -> Self {
        Self {
            provider,
            system_name: system_name.into().trim().to_string(),
            system_id: system_id.into().trim().to_string(),
            version: version.into().trim().to_string(),
            installation_number,
            verifactu_only: true,
            multiple_taxpayers: true,
            single_taxpayer_mode: false,
        }
    }

    pub fn flags(mut self, verifactu_only: bool, multiple_taxpayers: bool, single_taxpayer_mode: bool) -> Self {
        self.verifactu_only = verifactu_only;
        self.multiple_taxpayers = multiple_taxpayers;
        self.single_taxpayer_mode = single_taxpayer_mode;
        self
    }

    pub fn verifactu_only_token(&self) -> &'static str {
        yes_no(self.verifactu_only)
    }

    pub fn multiple_taxpayers_token(&self) -> &'static str {
        yes_no(self.multiple_taxpayers)
    }

    /// IndicadorMultiplesOT: single-taxpayer mode renders "N", otherwise "S".
    pub fn multiple_taxpayers_indicator(&self) -> &'static str {
        yes_no(!self.single_taxpayer_mode)
    }
}

impl Default for SoftwareInfo {
    fn default() -> Self {
        Self::new(
            LegalEntity::new("Software Provider Ltd", "12312367X"),
            "Invoicing Software",
            "01",
            "0.1.0",
            1,
        )
    }
}
