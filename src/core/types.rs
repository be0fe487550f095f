use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::variant::Pain001Variant;

/// A normalized batch of credit transfers to be turned into one pain.001 document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentBatch {
    /// Message profile to generate.
    pub variant: Pain001Variant,
    /// GrpHdr/InitgPty: the company issuing the file.
    pub initiating_party: InitiatingParty,
    /// Dbtr / DbtrAcct / DbtrAgt: the ordering account.
    pub debtor: PartyAccount,
    /// ChrgBr: explicit value, or the variant default when unset.
    pub charge_bearer: Option<ChargeBearer>,
    /// BtchBookg: request a single booking per payment-information block.
    pub batch_booking: bool,
    /// Per-request flags (salary payroll, BIC suppression).
    #[serde(default)]
    pub options: GenerationOptions,
    /// Ordered payments; never empty.
    pub payments: Vec<Payment>,
}

/// Flags that change the shape of the generated document for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Payroll run: `InstrPrty=HIGH`, `CtgyPurp/Cd=SALA` and the `/A/ ` marker.
    #[serde(default)]
    pub salary_payment: bool,
    /// Never write creditor BICs, even when known.
    #[serde(default)]
    pub skip_creditor_bic: bool,
}

/// GrpHdr/InitgPty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatingParty {
    /// Nm.
    pub name: String,
    /// Id/OrgId/Othr.
    pub organization_id: Option<OrgId>,
    /// Id/OrgId/LEI (pain.001.001.09 only).
    pub lei: Option<String>,
    /// PstlAdr.
    pub address: Option<PostalAddress>,
    /// Companies must have a resolvable address country.
    pub is_company: bool,
}

/// Organisation identification under `Id/OrgId/Othr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgId {
    /// Othr/Id (≤35).
    pub id: String,
    /// Othr/Issr (≤35).
    pub issuer: Option<String>,
    /// Othr/SchmeNm/Cd, unless the variant imposes its own.
    pub scheme_code: Option<String>,
}

/// A party together with the account it pays from or into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyAccount {
    /// Nm.
    pub name: String,
    /// Account number: IBAN or another scheme.
    pub account: AccountIdentifier,
    /// BIC of the account-servicing institution.
    pub bic: Option<String>,
    /// LEI of the account-servicing institution (pain.001.001.09 agents).
    pub lei: Option<String>,
    /// PstlAdr.
    pub address: Option<PostalAddress>,
    /// Companies must have a resolvable address country.
    pub is_company: bool,
}

/// Account identification: `Id/IBAN` or `Id/Othr/Id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountIdentifier {
    /// International Bank Account Number, stored as entered.
    Iban(String),
    /// Any other account number (e.g. Swiss postal accounts, Swedish bankgiro).
    Other(String),
}

impl AccountIdentifier {
    /// The raw identifier as entered.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Iban(s) | Self::Other(s) => s,
        }
    }

    /// The IBAN, if this is one.
    pub fn iban(&self) -> Option<&str> {
        match self {
            Self::Iban(s) => Some(s),
            Self::Other(_) => None,
        }
    }
}

/// A single credit transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Opaque stable key; used to derive the EndToEndId fallback.
    pub id: String,
    /// PmtId/InstrId source (≤35 after sanitization).
    pub name: Option<String>,
    /// Requested execution date; raised to today at build time.
    pub requested_date: NaiveDate,
    /// Amt/InstdAmt.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Cdtr / CdtrAcct / CdtrAgt.
    pub creditor: PartyAccount,
    /// Free text or a structured creditor reference.
    pub remittance_memo: Option<String>,
    /// PmtId/EndToEndId source; derived when absent.
    pub end_to_end_reference: Option<String>,
    /// PmtId/UETR (required by pain.001.001.09).
    pub uetr: Option<String>,
    /// Invoice classification for profiles with extra subtrees.
    #[serde(default)]
    pub invoice_type: InvoiceType,
}

impl Payment {
    /// The date the payment is actually requested for: never in the past.
    pub fn effective_date(&self, today: NaiveDate) -> NaiveDate {
        self.requested_date.max(today)
    }
}

/// Invoice classification. None of the supported profiles emits a subtree for
/// it; it is carried so callers can pass their data unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    #[default]
    Regular,
    Sez,
    DeemedExport,
    Overseas,
}

/// Postal address as known by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// Street + house number.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
}

/// ChrgBr codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeBearer {
    /// CRED: all charges borne by the creditor.
    Creditor,
    /// DEBT: all charges borne by the debtor.
    Debtor,
    /// SLEV: following the service level (SEPA).
    ServiceLevel,
    /// SHAR: shared.
    Shared,
}

impl ChargeBearer {
    /// ISO 20022 ChargeBearerType1Code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Creditor => "CRED",
            Self::Debtor => "DEBT",
            Self::ServiceLevel => "SLEV",
            Self::Shared => "SHAR",
        }
    }

    /// Parse from the ISO code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CRED" => Some(Self::Creditor),
            "DEBT" => Some(Self::Debtor),
            "SLEV" => Some(Self::ServiceLevel),
            "SHAR" => Some(Self::Shared),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_bearer_codes_roundtrip() {
        for cb in [
            ChargeBearer::Creditor,
            ChargeBearer::Debtor,
            ChargeBearer::ServiceLevel,
            ChargeBearer::Shared,
        ] {
            assert_eq!(ChargeBearer::from_code(cb.code()), Some(cb));
        }
        assert_eq!(ChargeBearer::from_code("XXXX"), None);
    }

    #[test]
    fn account_identifier_accessors() {
        let iban = AccountIdentifier::Iban("BE68539007547034".into());
        assert_eq!(iban.iban(), Some("BE68539007547034"));
        let other = AccountIdentifier::Other("123-456-789 01".into());
        assert_eq!(other.iban(), None);
        assert_eq!(other.as_str(), "123-456-789 01");
    }
}
