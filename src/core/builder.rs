use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::Pain001Error;
use super::types::*;
use super::validation;
use super::variant::Pain001Variant;

/// Builder for constructing a validated payment batch.
///
/// ```
/// use pain001::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
/// let batch = PaymentBatchBuilder::new(Pain001Variant::Sepa03)
///     .initiating_party(InitiatingPartyBuilder::new("ACME SA").build())
///     .debtor(PartyAccountBuilder::iban("ACME SA", "BE68539007547034").build())
///     .add_payment(
///         PaymentBuilder::new("p1", date, dec!(250.00), "EUR")
///             .creditor(PartyAccountBuilder::iban("Supplier", "FR7630006000011234567890189").build())
///             .build()
///             .unwrap(),
///     )
///     .build();
/// assert!(batch.is_ok());
/// ```
pub struct PaymentBatchBuilder {
    variant: Pain001Variant,
    initiating_party: Option<InitiatingParty>,
    debtor: Option<PartyAccount>,
    charge_bearer: Option<ChargeBearer>,
    batch_booking: bool,
    options: GenerationOptions,
    payments: Vec<Payment>,
}

impl PaymentBatchBuilder {
    pub fn new(variant: Pain001Variant) -> Self {
        Self {
            variant,
            initiating_party: None,
            debtor: None,
            charge_bearer: None,
            batch_booking: true,
            options: GenerationOptions::default(),
            payments: Vec::new(),
        }
    }

    pub fn initiating_party(mut self, party: InitiatingParty) -> Self {
        self.initiating_party = Some(party);
        self
    }

    pub fn debtor(mut self, debtor: PartyAccount) -> Self {
        self.debtor = Some(debtor);
        self
    }

    pub fn charge_bearer(mut self, charge_bearer: ChargeBearer) -> Self {
        self.charge_bearer = Some(charge_bearer);
        self
    }

    pub fn batch_booking(mut self, batch_booking: bool) -> Self {
        self.batch_booking = batch_booking;
        self
    }

    pub fn salary_payment(mut self, salary: bool) -> Self {
        self.options.salary_payment = salary;
        self
    }

    pub fn skip_creditor_bic(mut self, skip: bool) -> Self {
        self.options.skip_creditor_bic = skip;
        self
    }

    pub fn add_payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn payments(mut self, payments: impl IntoIterator<Item = Payment>) -> Self {
        self.payments.extend(payments);
        self
    }

    /// Build the batch and run the variant's pre-flight validation.
    /// Returns all findings (not just the first).
    pub fn build(self) -> Result<PaymentBatch, Pain001Error> {
        let batch = self.build_unchecked()?;
        validation::ensure_valid(&batch)?;
        Ok(batch)
    }

    /// Build without validation, for importing external data.
    /// Generation still validates before writing anything.
    pub fn build_unchecked(self) -> Result<PaymentBatch, Pain001Error> {
        let initiating_party = self
            .initiating_party
            .ok_or_else(|| Pain001Error::Builder("initiating party is required".into()))?;
        let debtor = self
            .debtor
            .ok_or_else(|| Pain001Error::Builder("debtor is required".into()))?;

        if self.payments.is_empty() {
            return Err(Pain001Error::Builder(
                "at least one payment is required".into(),
            ));
        }

        Ok(PaymentBatch {
            variant: self.variant,
            initiating_party,
            debtor,
            charge_bearer: self.charge_bearer,
            batch_booking: self.batch_booking,
            options: self.options,
            payments: self.payments,
        })
    }
}

/// Builder for Payment.
pub struct PaymentBuilder {
    id: String,
    name: Option<String>,
    requested_date: NaiveDate,
    amount: Decimal,
    currency: String,
    creditor: Option<PartyAccount>,
    remittance_memo: Option<String>,
    end_to_end_reference: Option<String>,
    uetr: Option<String>,
    invoice_type: InvoiceType,
}

impl PaymentBuilder {
    pub fn new(
        id: impl Into<String>,
        requested_date: NaiveDate,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            requested_date,
            amount,
            currency: currency.into(),
            creditor: None,
            remittance_memo: None,
            end_to_end_reference: None,
            uetr: None,
            invoice_type: InvoiceType::Regular,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn creditor(mut self, creditor: PartyAccount) -> Self {
        self.creditor = Some(creditor);
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.remittance_memo = Some(memo.into());
        self
    }

    pub fn end_to_end_reference(mut self, reference: impl Into<String>) -> Self {
        self.end_to_end_reference = Some(reference.into());
        self
    }

    pub fn uetr(mut self, uetr: impl Into<String>) -> Self {
        self.uetr = Some(uetr.into());
        self
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn build(self) -> Result<Payment, Pain001Error> {
        let creditor = self.creditor.ok_or_else(|| {
            Pain001Error::Builder(format!("payment {}: creditor is required", self.id))
        })?;

        Ok(Payment {
            id: self.id,
            name: self.name,
            requested_date: self.requested_date,
            amount: self.amount,
            currency: self.currency.trim().to_ascii_uppercase(),
            creditor,
            remittance_memo: self.remittance_memo,
            end_to_end_reference: self.end_to_end_reference,
            uetr: self.uetr,
            invoice_type: self.invoice_type,
        })
    }
}

/// Builder for PartyAccount (debtor or creditor).
pub struct PartyAccountBuilder {
    name: String,
    account: AccountIdentifier,
    bic: Option<String>,
    lei: Option<String>,
    address: Option<PostalAddress>,
    is_company: bool,
}

impl PartyAccountBuilder {
    /// Party holding an IBAN account.
    pub fn iban(name: impl Into<String>, iban: impl Into<String>) -> Self {
        Self::with_account(name, AccountIdentifier::Iban(iban.into()))
    }

    /// Party holding a non-IBAN account.
    pub fn other(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self::with_account(name, AccountIdentifier::Other(account.into()))
    }

    fn with_account(name: impl Into<String>, account: AccountIdentifier) -> Self {
        Self {
            name: name.into(),
            account,
            bic: None,
            lei: None,
            address: None,
            is_company: false,
        }
    }

    pub fn bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = Some(bic.into());
        self
    }

    pub fn lei(mut self, lei: impl Into<String>) -> Self {
        self.lei = Some(lei.into());
        self
    }

    pub fn address(mut self, address: PostalAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn company(mut self, is_company: bool) -> Self {
        self.is_company = is_company;
        self
    }

    pub fn build(self) -> PartyAccount {
        PartyAccount {
            name: self.name,
            account: self.account,
            bic: self.bic,
            lei: self.lei,
            address: self.address,
            is_company: self.is_company,
        }
    }
}

/// Builder for InitiatingParty.
pub struct InitiatingPartyBuilder {
    name: String,
    organization_id: Option<OrgId>,
    lei: Option<String>,
    address: Option<PostalAddress>,
    is_company: bool,
}

impl InitiatingPartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization_id: None,
            lei: None,
            address: None,
            is_company: false,
        }
    }

    /// Organisation identification without issuer or scheme.
    pub fn organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(OrgId {
            id: id.into(),
            issuer: None,
            scheme_code: None,
        });
        self
    }

    /// Issuer of the organisation identification. Ignored until an id is set.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        if let Some(org) = self.organization_id.as_mut() {
            org.issuer = Some(issuer.into());
        }
        self
    }

    /// Scheme code of the organisation identification. Ignored until an id is set.
    pub fn scheme_code(mut self, code: impl Into<String>) -> Self {
        if let Some(org) = self.organization_id.as_mut() {
            org.scheme_code = Some(code.into());
        }
        self
    }

    pub fn lei(mut self, lei: impl Into<String>) -> Self {
        self.lei = Some(lei.into());
        self
    }

    pub fn address(mut self, address: PostalAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn company(mut self, is_company: bool) -> Self {
        self.is_company = is_company;
        self
    }

    pub fn build(self) -> InitiatingParty {
        InitiatingParty {
            name: self.name,
            organization_id: self.organization_id,
            lei: self.lei,
            address: self.address,
            is_company: self.is_company,
        }
    }
}

/// Builder for PostalAddress.
pub struct PostalAddressBuilder {
    country: String,
    street: Option<String>,
    city: Option<String>,
    zip: Option<String>,
}

impl PostalAddressBuilder {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            street: None,
            city: None,
            zip: None,
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn build(self) -> PostalAddress {
        PostalAddress {
            country: self.country.trim().to_ascii_uppercase(),
            street: self.street,
            city: self.city,
            zip: self.zip,
        }
    }
}
