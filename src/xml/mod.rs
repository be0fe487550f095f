//! pain.001 XML generation and reading.
//!
//! # Example
//!
//! ```no_run
//! use pain001::core::*;
//! use pain001::xml;
//!
//! let batch: PaymentBatch = todo!(); // build via PaymentBatchBuilder
//! let today = chrono::Local::now().date_naive();
//! let document = xml::generate_document(&batch, &SystemClock, today).unwrap();
//! std::fs::write(&document.file_name, &document.xml).unwrap();
//! ```

mod address;
mod document;
mod grouping;
mod party;
mod reader;
mod remittance;
mod serialize;
mod tree;
mod writer;

pub use document::{BuiltDocument, GenerationWarning, NOT_PROVIDED, build_document};
pub use grouping::{PaymentGroup, group_payments, payment_info_id};
pub use reader::{DocumentSummary, PaymentInfoSummary, TransactionSummary, read_summary};
pub use serialize::serialize;
pub use tree::{Element, Node};

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::amount::format_sum;
use crate::core::identifiers::normalize_iban;
use crate::core::text::{ID_MAX_LEN, sanitize};
use crate::core::{Clock, Pain001Error, Pain001Variant, PaymentBatch, ensure_valid};

/// Steps of one generation attempt. Any step may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Received,
    Validating,
    Building,
    Serializing,
    Done,
    Failed,
}

/// A generated document with everything a caller needs to persist it.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// UTF-8 XML bytes.
    pub xml: Vec<u8>,
    pub message_id: String,
    /// Suggested artifact name, see [`artifact_file_name`].
    pub file_name: String,
    /// Structured references that had to be written as free text.
    pub warnings: Vec<GenerationWarning>,
    pub phase: GenerationPhase,
}

/// Generate the pain.001 document for `batch` and return its bytes.
///
/// The batch is validated first; nothing is built when it fails.
pub fn generate(
    batch: &PaymentBatch,
    clock: &dyn Clock,
    today: NaiveDate,
) -> Result<Vec<u8>, Pain001Error> {
    generate_document(batch, clock, today).map(|doc| doc.xml)
}

/// Like [`generate`], also returning the message id, file name and warnings.
pub fn generate_document(
    batch: &PaymentBatch,
    clock: &dyn Clock,
    today: NaiveDate,
) -> Result<GeneratedDocument, Pain001Error> {
    let mut phase = GenerationPhase::Received;
    let result = run(batch, clock, today, &mut phase);
    if let Err(e) = &result {
        tracing::debug!(
            from = ?phase,
            to = ?GenerationPhase::Failed,
            variant = %batch.variant,
            error = %e,
            "pain.001 generation failed"
        );
    }
    result
}

fn run(
    batch: &PaymentBatch,
    clock: &dyn Clock,
    today: NaiveDate,
    phase: &mut GenerationPhase,
) -> Result<GeneratedDocument, Pain001Error> {
    let message_id = sanitize(&clock.message_id(), ID_MAX_LEN);
    let created = clock.now();

    advance(phase, GenerationPhase::Validating, batch, &message_id);
    if message_id.is_empty() {
        return Err(Pain001Error::Builder(
            "clock returned an empty message identifier".into(),
        ));
    }
    ensure_valid(batch)?;

    advance(phase, GenerationPhase::Building, batch, &message_id);
    let built = build_document(batch, &message_id, created, today)?;

    advance(phase, GenerationPhase::Serializing, batch, &message_id);
    let xml = serialize(&built.root)?;

    advance(phase, GenerationPhase::Done, batch, &message_id);
    tracing::info!(
        variant = %batch.variant,
        msg_id = %message_id,
        transactions = batch.payments.len(),
        control_sum = %format_sum(batch.payments.iter().map(|p| p.amount)),
        warnings = built.warnings.len(),
        "pain.001 document generated"
    );

    Ok(GeneratedDocument {
        xml,
        file_name: artifact_file_name(
            batch.variant,
            &normalize_iban(batch.debtor.account.as_str()),
            created,
        ),
        message_id,
        warnings: built.warnings,
        phase: *phase,
    })
}

fn advance(
    phase: &mut GenerationPhase,
    next: GenerationPhase,
    batch: &PaymentBatch,
    message_id: &str,
) {
    tracing::debug!(
        from = ?*phase,
        to = ?next,
        variant = %batch.variant,
        payments = batch.payments.len(),
        msg_id = %message_id,
        "pain.001 generation phase"
    );
    *phase = next;
}

/// `SCT-{code}-{yyyyMMddHHmmss}.xml` for SEPA profiles, `PAIN-...` otherwise.
///
/// ```
/// use pain001::Pain001Variant;
/// use pain001::xml::artifact_file_name;
///
/// let created = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
///     .unwrap()
///     .and_hms_opt(9, 5, 0)
///     .unwrap();
/// assert_eq!(
///     artifact_file_name(Pain001Variant::Sepa03, "BNK1", created),
///     "SCT-BNK1-20240315090500.xml"
/// );
/// ```
pub fn artifact_file_name(
    variant: Pain001Variant,
    debtor_account_code: &str,
    created: NaiveDateTime,
) -> String {
    let prefix = if variant.is_sepa() { "SCT-" } else { "PAIN-" };
    format!(
        "{prefix}{}-{}.xml",
        debtor_account_code.trim(),
        created.format("%Y%m%d%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn clock(id: &str) -> FixedClock {
        FixedClock::new(id, today().and_hms_opt(10, 0, 0).unwrap())
    }

    fn batch() -> PaymentBatch {
        PaymentBatchBuilder::new(Pain001Variant::Sepa03)
            .initiating_party(InitiatingPartyBuilder::new("ACME").build())
            .debtor(PartyAccountBuilder::iban("ACME", "BE68539007547034").build())
            .add_payment(
                PaymentBuilder::new("p1", today(), dec!(5), "EUR")
                    .creditor(
                        PartyAccountBuilder::iban("X", "FR7630006000011234567890189").build(),
                    )
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn generated_document_metadata() {
        let doc = generate_document(&batch(), &clock("1710500000"), today()).unwrap();
        assert_eq!(doc.phase, GenerationPhase::Done);
        assert_eq!(doc.message_id, "1710500000");
        assert_eq!(doc.file_name, "SCT-BE68539007547034-20240315100000.xml");
        assert!(doc.warnings.is_empty());
        assert!(doc.xml.ends_with(b"</Document>\n"));
    }

    #[test]
    fn message_id_is_sanitized() {
        let long = format!("#{}", "a".repeat(50));
        let doc = generate_document(&batch(), &clock(&long), today()).unwrap();
        assert_eq!(doc.message_id, "a".repeat(35));
    }

    #[test]
    fn empty_message_id_fails() {
        let err = generate(&batch(), &clock("@@"), today()).unwrap_err();
        assert!(matches!(err, Pain001Error::Builder(_)));
    }

    #[test]
    fn file_name_prefix() {
        let created = today().and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(
            artifact_file_name(Pain001Variant::Swiss03Ch02, "CH01", created),
            "PAIN-CH01-20240315235959.xml"
        );
    }
}
