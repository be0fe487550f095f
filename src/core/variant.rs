use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::text::{NAME_MAX_LEN, SHORT_NAME_MAX_LEN};
use super::types::ChargeBearer;

/// `xmlns:xsi` written on every document.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// ISO 20022 pain.001.001.03 namespace.
pub const NS_PAIN_001_001_03: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";
/// ISO 20022 pain.001.001.09 namespace.
pub const NS_PAIN_001_001_09: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09";
/// SIX Interbank Clearing Swiss Payment Standards namespace.
pub const NS_PAIN_001_001_03_CH_02: &str =
    "http://www.six-interbank-clearing.com/de/pain.001.001.03.ch.02.xsd";

/// Published pain.001 profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pain001Variant {
    /// SEPA credit transfer, pain.001.001.03.
    Sepa03,
    /// SEPA credit transfer, pain.001.001.09 (2019 rulebook, UETR, structured addresses).
    Sepa09,
    /// Austrian Stuzza profile pain.001.001.03.austrian.004.
    Austrian03,
    /// German DK profile pain.001.001.03.de.
    German03,
    /// Swiss Payment Standards pain.001.001.03.ch.02.
    Swiss03Ch02,
    /// Swedish bank usage of pain.001.001.03.
    Swedish03,
}

impl Pain001Variant {
    pub const ALL: [Self; 6] = [
        Self::Sepa03,
        Self::Sepa09,
        Self::Austrian03,
        Self::German03,
        Self::Swiss03Ch02,
        Self::Swedish03,
    ];

    /// Version string as used in bank documentation.
    pub fn version(&self) -> &'static str {
        match self {
            Self::Sepa03 => "pain.001.001.03",
            Self::Sepa09 => "pain.001.001.09",
            Self::Austrian03 => "pain.001.001.03.austrian.004",
            Self::German03 => "pain.001.001.03.de",
            Self::Swiss03Ch02 => "pain.001.001.03.ch.02",
            Self::Swedish03 => "pain.001.001.03.se",
        }
    }

    /// Parse from a version string.
    pub fn from_version(version: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.version().eq_ignore_ascii_case(version.trim()))
    }

    /// SEPA credit-transfer profiles: EUR only, IBAN accounts, SEPA cap.
    pub fn is_sepa(&self) -> bool {
        self.strategy().sepa
    }

    /// The strategy record driving document generation for this variant.
    pub fn strategy(&self) -> VariantStrategy {
        let sepa = VariantStrategy {
            variant: *self,
            namespace_uri: NS_PAIN_001_001_03,
            bic_tag_name: "BIC",
            strict_bic: false,
            agent_lei: false,
            service_level_code: Some("SEPA"),
            service_level_currency: None,
            charge_bearer_default: ChargeBearer::ServiceLevel,
            requires_uetr: false,
            execution_date_layout: ExecutionDateLayout::Plain,
            initiating_party_profile: PartyProfile::INITIATING,
            debtor_profile: PartyProfile::DEBTOR,
            omit_cdtr_agent_when_no_bic: true,
            address_layout: AddressLayout::Legacy,
            address_country_only: false,
            amount_cap: Some(dec!(999999999.99)),
            currency_whitelist: Some(&["EUR"]),
            sepa: true,
            name_max_len: NAME_MAX_LEN,
            qrr_allowed: false,
            other_account_first_token: false,
            requires_org_id: false,
        };

        match self {
            Self::Sepa03 => sepa,
            Self::Sepa09 => VariantStrategy {
                namespace_uri: NS_PAIN_001_001_09,
                bic_tag_name: "BICFI",
                strict_bic: true,
                agent_lei: true,
                requires_uetr: true,
                execution_date_layout: ExecutionDateLayout::Wrapped,
                initiating_party_profile: PartyProfile {
                    lei: true,
                    ..PartyProfile::INITIATING
                },
                debtor_profile: PartyProfile {
                    lei: true,
                    ..PartyProfile::DEBTOR
                },
                address_layout: AddressLayout::Structured,
                ..sepa
            },
            Self::Austrian03 => VariantStrategy {
                initiating_party_profile: PartyProfile {
                    issuer: false,
                    ..PartyProfile::INITIATING
                },
                name_max_len: SHORT_NAME_MAX_LEN,
                ..sepa
            },
            Self::German03 => VariantStrategy {
                omit_cdtr_agent_when_no_bic: false,
                ..sepa
            },
            Self::Swiss03Ch02 => VariantStrategy {
                namespace_uri: NS_PAIN_001_001_03_CH_02,
                service_level_currency: Some("EUR"),
                charge_bearer_default: ChargeBearer::Shared,
                debtor_profile: PartyProfile {
                    identification: false,
                    ..PartyProfile::DEBTOR
                },
                amount_cap: Some(dec!(9999999999.99)),
                currency_whitelist: Some(&["CHF", "EUR"]),
                sepa: false,
                qrr_allowed: true,
                other_account_first_token: true,
                ..sepa
            },
            Self::Swedish03 => VariantStrategy {
                service_level_code: Some("NURG"),
                charge_bearer_default: ChargeBearer::Shared,
                initiating_party_profile: PartyProfile {
                    name: false,
                    issuer: false,
                    scheme_code: Some("BANK"),
                    ..PartyProfile::INITIATING
                },
                debtor_profile: PartyProfile {
                    scheme_code: Some("CUST"),
                    ..PartyProfile::DEBTOR
                },
                address_country_only: true,
                amount_cap: None,
                currency_whitelist: None,
                sepa: false,
                requires_org_id: true,
                ..sepa
            },
        }
    }
}

impl std::fmt::Display for Pain001Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.version())
    }
}

/// `ReqdExctnDt` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionDateLayout {
    /// `<ReqdExctnDt>2024-03-20</ReqdExctnDt>`
    Plain,
    /// `<ReqdExctnDt><Dt>2024-03-20</Dt></ReqdExctnDt>`
    Wrapped,
}

/// `PstlAdr` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressLayout {
    /// `Ctry` followed by up to two `AdrLine`.
    Legacy,
    /// `StrtNm`, `PstCd`, `TwnNm`, `Ctry`.
    Structured,
}

/// Which parts of a party identification a variant writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyProfile {
    /// `Nm`.
    pub name: bool,
    /// `PstlAdr`.
    pub address: bool,
    /// `Id/OrgId`.
    pub identification: bool,
    /// `Id/OrgId/LEI`.
    pub lei: bool,
    /// `Id/OrgId/Othr/Issr`.
    pub issuer: bool,
    /// Imposed `Id/OrgId/Othr/SchmeNm/Cd`.
    pub scheme_code: Option<&'static str>,
}

impl PartyProfile {
    /// Default `InitgPty` profile.
    pub const INITIATING: Self = Self {
        name: true,
        address: false,
        identification: true,
        lei: false,
        issuer: true,
        scheme_code: None,
    };

    /// Default `Dbtr` profile.
    pub const DEBTOR: Self = Self {
        name: true,
        address: true,
        identification: true,
        lei: false,
        issuer: true,
        scheme_code: None,
    };

    /// `Cdtr` profile, shared by every variant.
    pub const CREDITOR: Self = Self {
        name: true,
        address: true,
        identification: false,
        lei: false,
        issuer: false,
        scheme_code: None,
    };
}

/// One record per variant; the document builder reads every per-variant
/// decision from here.
#[derive(Debug, Clone, Copy)]
pub struct VariantStrategy {
    pub variant: Pain001Variant,
    /// `xmlns` of `<Document>`.
    pub namespace_uri: &'static str,
    /// `BIC` or `BICFI`.
    pub bic_tag_name: &'static str,
    /// Use the pain.001.001.09 BIC pattern.
    pub strict_bic: bool,
    /// Agents carry `FinInstnId/LEI` after the BIC.
    pub agent_lei: bool,
    /// `PmtTpInf/SvcLvl/Cd`.
    pub service_level_code: Option<&'static str>,
    /// Restrict the service level to one currency.
    pub service_level_currency: Option<&'static str>,
    /// `ChrgBr` when the batch does not set one.
    pub charge_bearer_default: ChargeBearer,
    /// Every `PmtId` needs a `UETR`.
    pub requires_uetr: bool,
    pub execution_date_layout: ExecutionDateLayout,
    pub initiating_party_profile: PartyProfile,
    pub debtor_profile: PartyProfile,
    /// Omit `CdtrAgt` when no creditor BIC is known, instead of writing
    /// `NOTPROVIDED`.
    pub omit_cdtr_agent_when_no_bic: bool,
    pub address_layout: AddressLayout,
    /// A legacy address may consist of the country alone.
    pub address_country_only: bool,
    /// Upper bound for a single amount.
    pub amount_cap: Option<Decimal>,
    /// Accepted currencies; `None` accepts any known ISO 4217 code.
    pub currency_whitelist: Option<&'static [&'static str]>,
    /// SEPA credit-transfer profile.
    pub sepa: bool,
    /// Cap for `Nm`.
    pub name_max_len: usize,
    /// Can emit `CdtrRefInf` with proprietary type `QRR`.
    pub qrr_allowed: bool,
    /// Non-IBAN accounts are written as their first space-separated token.
    pub other_account_first_token: bool,
    /// Initiating party must carry organisation id and issuer.
    pub requires_org_id: bool,
}

impl VariantStrategy {
    /// Service level for a payment-information block in `currency`.
    pub fn service_level_for(&self, currency: &str) -> Option<&'static str> {
        match self.service_level_currency {
            Some(only) if only != currency => None,
            _ => self.service_level_code,
        }
    }

    /// Whether `currency` may be used with this variant.
    pub fn accepts_currency(&self, currency: &str) -> bool {
        match self.currency_whitelist {
            Some(list) => list.contains(&currency),
            None => super::currencies::is_known_currency_code(currency),
        }
    }

    /// Creditor accounts must be IBANs.
    pub fn requires_creditor_iban(&self) -> bool {
        self.sepa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_roundtrip() {
        for v in Pain001Variant::ALL {
            assert_eq!(Pain001Variant::from_version(v.version()), Some(v));
        }
        assert_eq!(
            Pain001Variant::from_version(" PAIN.001.001.09 "),
            Some(Pain001Variant::Sepa09)
        );
        assert_eq!(Pain001Variant::from_version("pain.008.001.02"), None);
    }

    #[test]
    fn bic_tag_per_variant() {
        assert_eq!(Pain001Variant::Sepa09.strategy().bic_tag_name, "BICFI");
        for v in Pain001Variant::ALL.into_iter().filter(|v| *v != Pain001Variant::Sepa09) {
            assert_eq!(v.strategy().bic_tag_name, "BIC", "{v}");
        }
    }

    #[test]
    fn namespaces() {
        assert_eq!(Pain001Variant::Sepa03.strategy().namespace_uri, NS_PAIN_001_001_03);
        assert_eq!(Pain001Variant::Sepa09.strategy().namespace_uri, NS_PAIN_001_001_09);
        assert_eq!(
            Pain001Variant::Swiss03Ch02.strategy().namespace_uri,
            "http://www.six-interbank-clearing.com/de/pain.001.001.03.ch.02.xsd"
        );
        assert_eq!(Pain001Variant::Swedish03.strategy().namespace_uri, NS_PAIN_001_001_03);
    }

    #[test]
    fn swiss_service_level_only_for_eur() {
        let s = Pain001Variant::Swiss03Ch02.strategy();
        assert_eq!(s.service_level_for("EUR"), Some("SEPA"));
        assert_eq!(s.service_level_for("CHF"), None);
        assert_eq!(Pain001Variant::Swedish03.strategy().service_level_for("SEK"), Some("NURG"));
    }

    #[test]
    fn charge_bearer_defaults() {
        assert_eq!(
            Pain001Variant::Sepa03.strategy().charge_bearer_default,
            ChargeBearer::ServiceLevel
        );
        assert_eq!(
            Pain001Variant::Swiss03Ch02.strategy().charge_bearer_default,
            ChargeBearer::Shared
        );
    }

    #[test]
    fn currency_whitelists() {
        assert!(Pain001Variant::Sepa03.strategy().accepts_currency("EUR"));
        assert!(!Pain001Variant::Sepa03.strategy().accepts_currency("CHF"));
        assert!(Pain001Variant::Swiss03Ch02.strategy().accepts_currency("CHF"));
        assert!(Pain001Variant::Swedish03.strategy().accepts_currency("SEK"));
        assert!(!Pain001Variant::Swedish03.strategy().accepts_currency("XYZ"));
    }

    #[test]
    fn sepa_family() {
        let sepa: Vec<_> = Pain001Variant::ALL
            .into_iter()
            .filter(Pain001Variant::is_sepa)
            .collect();
        assert_eq!(
            sepa,
            vec![
                Pain001Variant::Sepa03,
                Pain001Variant::Sepa09,
                Pain001Variant::Austrian03,
                Pain001Variant::German03
            ]
        );
    }
}
