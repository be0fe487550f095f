//! Assembly of `Document/CstmrCdtTrfInitn`.
//!
//! Every per-variant decision is read from [`VariantStrategy`]; the builder
//! itself has no knowledge of individual profiles.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::amount::{format_amount, format_sum};
use crate::core::identifiers::{ReferenceKind, compact, lei_valid, normalize_iban};
use crate::core::text::{END_TO_END_MAX_LEN, ID_MAX_LEN, rightmost, sanitize};
use crate::core::{
    AccountIdentifier, ExecutionDateLayout, MAX_TRANSACTIONS, Pain001Error, Payment, PaymentBatch,
    ValidationError, VariantStrategy, XSI_NAMESPACE,
};

use super::grouping::{PaymentGroup, group_payments, payment_info_id};
use super::party;
use super::remittance::{self, RemittanceInput};
use super::tree::Element;

/// Placeholder for unknown agents and end-to-end ids.
pub const NOT_PROVIDED: &str = "NOTPROVIDED";

const OTHER_ACCOUNT_MAX_LEN: usize = 34;

/// A structured reference that was written as free text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationWarning {
    /// Identifier of the affected payment.
    pub payment: String,
    pub kind: ReferenceKind,
    pub message: String,
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[payment {}] {}", self.payment, self.message)
    }
}

/// Tree and warnings of one build.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    pub root: Element,
    pub warnings: Vec<GenerationWarning>,
}

/// Build the full document tree for an already validated batch.
pub fn build_document(
    batch: &PaymentBatch,
    message_id: &str,
    created: NaiveDateTime,
    today: NaiveDate,
) -> Result<BuiltDocument, Pain001Error> {
    let strategy = batch.variant.strategy();
    let mut builder = DocumentBuilder {
        batch,
        strategy,
        message_id,
        warnings: Vec::new(),
    };
    let initiation = builder.customer_credit_transfer(created, today)?;
    let root = Element::new("Document")
        .attr("xmlns", strategy.namespace_uri)
        .attr("xmlns:xsi", XSI_NAMESPACE)
        .child(initiation);
    Ok(BuiltDocument {
        root,
        warnings: builder.warnings,
    })
}

struct DocumentBuilder<'a> {
    batch: &'a PaymentBatch,
    strategy: VariantStrategy,
    message_id: &'a str,
    warnings: Vec<GenerationWarning>,
}

impl DocumentBuilder<'_> {
    fn customer_credit_transfer(
        &mut self,
        created: NaiveDateTime,
        today: NaiveDate,
    ) -> Result<Element, Pain001Error> {
        let batch = self.batch;
        let payments = &batch.payments;
        if payments.len() as u64 > MAX_TRANSACTIONS {
            return Err(Pain001Error::Internal(format!(
                "{} transactions exceed NbOfTxs",
                payments.len()
            )));
        }

        let group_header = Element::new("GrpHdr")
            .child(Element::text("MsgId", self.message_id))
            .child(Element::text(
                "CreDtTm",
                created.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ))
            .child(Element::text("NbOfTxs", payments.len().to_string()))
            .child(Element::text(
                "CtrlSum",
                format_sum(payments.iter().map(|p| p.amount)),
            ))
            .child(party::initiating_party(batch, &self.strategy));

        let mut initiation = Element::new("CstmrCdtTrfInitn").child(group_header);
        for (index, group) in group_payments(payments, today).iter().enumerate() {
            initiation.push(self.payment_information(index, group)?);
        }
        Ok(initiation)
    }

    fn payment_information(
        &mut self,
        index: usize,
        group: &PaymentGroup<'_>,
    ) -> Result<Element, Pain001Error> {
        if group.is_empty() {
            return Err(Pain001Error::Internal(format!(
                "payment group {index} has no payments"
            )));
        }
        let debtor_iban = self.batch.debtor.account.iban().ok_or_else(|| {
            Pain001Error::Internal("debtor account is not an IBAN after validation".into())
        })?;

        let mut pmt_inf = Element::new("PmtInf")
            .child(Element::text(
                "PmtInfId",
                payment_info_id(self.message_id, debtor_iban, index),
            ))
            .child(Element::text("PmtMtd", "TRF"))
            .child(Element::text("BtchBookg", self.batch.batch_booking.to_string()))
            .child(Element::text("NbOfTxs", group.len().to_string()))
            .child(Element::text("CtrlSum", format_amount(group.control_sum())))
            .child_opt(self.payment_type_information(&group.currency))
            .child(self.execution_date(group.execution_date))
            .child(party::debtor(self.batch, &self.strategy))
            .child(
                Element::new("DbtrAcct")
                    .child(Element::wrap(
                        "Id",
                        Element::text("IBAN", normalize_iban(debtor_iban)),
                    ))
                    .child(Element::text("Ccy", &group.currency)),
            )
            .child(
                self.agent(
                    "DbtrAgt",
                    self.batch.debtor.bic.as_deref(),
                    self.batch.debtor.lei.as_deref(),
                )
                .unwrap_or_else(|| not_provided_agent("DbtrAgt")),
            )
            .child(Element::text(
                "ChrgBr",
                self.batch
                    .charge_bearer
                    .unwrap_or(self.strategy.charge_bearer_default)
                    .code(),
            ));

        for payment in &group.payments {
            let transaction = self.credit_transfer_transaction(payment)?;
            pmt_inf.push(transaction);
        }
        Ok(pmt_inf)
    }

    fn payment_type_information(&self, currency: &str) -> Option<Element> {
        let salary = self.batch.options.salary_payment;
        let service_level = self.strategy.service_level_for(currency);
        if !salary && service_level.is_none() {
            return None;
        }
        Some(
            Element::new("PmtTpInf")
                .child_opt(salary.then(|| Element::text("InstrPrty", "HIGH")))
                .child_opt(
                    service_level.map(|cd| Element::wrap("SvcLvl", Element::text("Cd", cd))),
                )
                .child_opt(
                    salary.then(|| Element::wrap("CtgyPurp", Element::text("Cd", "SALA"))),
                ),
        )
    }

    fn execution_date(&self, date: NaiveDate) -> Element {
        let text = date.format("%Y-%m-%d").to_string();
        match self.strategy.execution_date_layout {
            ExecutionDateLayout::Plain => Element::text("ReqdExctnDt", text),
            ExecutionDateLayout::Wrapped => {
                Element::wrap("ReqdExctnDt", Element::text("Dt", text))
            }
        }
    }

    /// `<tag>/FinInstnId` with the BIC and, where the variant writes one, the
    /// LEI. `None` when neither is known.
    fn agent(&self, tag: &'static str, bic: Option<&str>, lei: Option<&str>) -> Option<Element> {
        let bic = bic
            .map(compact)
            .filter(|b| !b.is_empty())
            .map(|bic| Element::text(self.strategy.bic_tag_name, bic));
        let lei = lei
            .filter(|lei| self.strategy.agent_lei && lei_valid(lei))
            .map(|lei| Element::text("LEI", compact(lei)));
        if bic.is_none() && lei.is_none() {
            return None;
        }
        Some(Element::wrap(
            tag,
            Element::new("FinInstnId").child_opt(bic).child_opt(lei),
        ))
    }

    fn credit_transfer_transaction(&mut self, payment: &Payment) -> Result<Element, Pain001Error> {
        let creditor = &payment.creditor;

        let instruction_id = payment
            .name
            .as_deref()
            .map(|name| sanitize(name, ID_MAX_LEN))
            .filter(|name| !name.is_empty());
        let payment_id = Element::new("PmtId")
            .child_opt(instruction_id.map(|id| Element::text("InstrId", id)))
            .child(Element::text("EndToEndId", end_to_end_id(payment, self.message_id)))
            .child_opt(self.uetr(payment)?.map(|uetr| Element::text("UETR", uetr)));

        let amount = Element::wrap(
            "Amt",
            Element::text("InstdAmt", format_amount(payment.amount)).attr("Ccy", &payment.currency),
        );

        let (creditor_bic, creditor_lei) = if self.batch.options.skip_creditor_bic {
            (None, None)
        } else {
            (creditor.bic.as_deref(), creditor.lei.as_deref())
        };
        let creditor_agent = match self.agent("CdtrAgt", creditor_bic, creditor_lei) {
            Some(agent) => Some(agent),
            None if self.strategy.omit_cdtr_agent_when_no_bic => None,
            None => Some(not_provided_agent("CdtrAgt")),
        };

        let remittance = match payment.remittance_memo.as_deref() {
            Some(memo) if !memo.trim().is_empty() => self.remittance(payment, memo),
            _ => None,
        };

        Ok(Element::new("CdtTrfTxInf")
            .child(payment_id)
            .child(amount)
            .child_opt(creditor_agent)
            .child(party::creditor(creditor, &self.strategy))
            .child(Element::wrap("CdtrAcct", self.creditor_account_id(&creditor.account)))
            .child_opt(remittance))
    }

    /// `RmtInf` for a non-empty memo; degraded references are logged and
    /// recorded as warnings.
    fn remittance(&mut self, payment: &Payment, memo: &str) -> Option<Element> {
        let creditor = &payment.creditor;
        let (remittance, degradation) = remittance::classify(
            &RemittanceInput {
                memo,
                creditor_country: creditor.address.as_ref().map(|a| a.country.as_str()),
                creditor_iban: creditor.account.iban(),
                salary_payment: self.batch.options.salary_payment,
            },
            &self.strategy,
        );
        if let Some(degradation) = degradation {
            tracing::warn!(
                payment = %payment.id,
                kind = ?degradation.kind,
                variant = %self.strategy.variant,
                "structured reference written as unstructured text: {}",
                degradation.reason
            );
            self.warnings.push(GenerationWarning {
                payment: payment.id.clone(),
                kind: degradation.kind,
                message: degradation.reason,
            });
        }
        remittance.map(|r| r.to_element())
    }

    fn uetr(&self, payment: &Payment) -> Result<Option<String>, Pain001Error> {
        if !self.strategy.requires_uetr {
            return Ok(None);
        }
        let missing = || Pain001Error::Validation {
            variant: self.strategy.variant,
            issues: vec![
                ValidationError::invalid("uetr", "UETR is missing or not a UUID")
                    .for_payment(payment.id.as_str()),
            ],
        };
        let raw = payment.uetr.as_deref().ok_or_else(missing)?;
        let uuid = Uuid::parse_str(raw.trim()).map_err(|_| missing())?;
        Ok(Some(uuid.hyphenated().to_string()))
    }

    fn creditor_account_id(&self, account: &AccountIdentifier) -> Element {
        match account {
            AccountIdentifier::Iban(iban) => {
                Element::wrap("Id", Element::text("IBAN", normalize_iban(iban)))
            }
            AccountIdentifier::Other(number) => {
                let id = if self.strategy.other_account_first_token {
                    number.split_whitespace().next().unwrap_or_default().to_string()
                } else {
                    compact(number)
                };
                Element::wrap(
                    "Id",
                    Element::wrap(
                        "Othr",
                        Element::text("Id", sanitize(&id, OTHER_ACCOUNT_MAX_LEN)),
                    ),
                )
            }
        }
    }
}

fn not_provided_agent(tag: &'static str) -> Element {
    Element::wrap(
        tag,
        Element::wrap(
            "FinInstnId",
            Element::wrap("Othr", Element::text("Id", NOT_PROVIDED)),
        ),
    )
}

/// Rightmost 30 characters of the sanitized reference, or of message id and
/// payment id.
fn end_to_end_id(payment: &Payment, message_id: &str) -> String {
    let source = payment
        .end_to_end_reference
        .as_deref()
        .map(|r| sanitize(r, usize::MAX))
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| sanitize(&format!("{message_id}{}", payment.id), usize::MAX));
    let id = rightmost(&source, END_TO_END_MAX_LEN);
    if id.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        id.to_string()
    }
}
