//! Partition payments into `PmtInf` blocks.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::core::Payment;
use crate::core::amount::sum_amounts;
use crate::core::identifiers::normalize_iban;
use crate::core::text::{END_TO_END_MAX_LEN, rightmost};

/// Payments sharing execution date and currency.
#[derive(Debug, Clone)]
pub struct PaymentGroup<'a> {
    pub execution_date: NaiveDate,
    pub currency: String,
    /// In input order.
    pub payments: Vec<&'a Payment>,
}

impl PaymentGroup<'_> {
    /// Sum of the rounded transaction amounts.
    pub fn control_sum(&self) -> Decimal {
        sum_amounts(self.payments.iter().map(|p| p.amount))
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

/// Group by `(max(requested_date, today), currency)`, keys ascending.
pub fn group_payments(payments: &[Payment], today: NaiveDate) -> Vec<PaymentGroup<'_>> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<&Payment>> = BTreeMap::new();
    for payment in payments {
        groups
            .entry((payment.effective_date(today), payment.currency.as_str()))
            .or_default()
            .push(payment);
    }
    groups
        .into_iter()
        .map(|((execution_date, currency), payments)| PaymentGroup {
            execution_date,
            currency: currency.to_string(),
            payments,
        })
        .collect()
}

/// `PmtInfId`: the rightmost 30 characters of message id, debtor account
/// hash and group index, without leading slashes.
pub fn payment_info_id(message_id: &str, debtor_iban: &str, index: usize) -> String {
    let digest = Sha256::digest(normalize_iban(debtor_iban).as_bytes());
    let hash: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    rightmost(&format!("{message_id}{hash}{index}"), END_TO_END_MAX_LEN).to_string()
}
