//! Summary reader for pain.001 documents.
//!
//! Extracts the header totals and the identifying fields of every payment
//! information block and transaction, for cross-checking a file before it is
//! handed to a bank.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;

use crate::core::Pain001Error;

/// Header and block-level view of a pain.001 document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    /// `xmlns` of `<Document>`.
    pub namespace: Option<String>,
    pub message_id: String,
    pub created_at: Option<String>,
    pub number_of_transactions: Option<u64>,
    pub control_sum: Option<Decimal>,
    pub payment_infos: Vec<PaymentInfoSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentInfoSummary {
    pub id: Option<String>,
    pub number_of_transactions: Option<u64>,
    pub control_sum: Option<Decimal>,
    pub service_level: Option<String>,
    pub execution_date: Option<String>,
    pub debtor_iban: Option<String>,
    /// `DbtrAcct/Ccy`.
    pub currency: Option<String>,
    pub charge_bearer: Option<String>,
    pub transactions: Vec<TransactionSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    pub instruction_id: Option<String>,
    pub end_to_end_id: Option<String>,
    pub uetr: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub creditor_bic: Option<String>,
    pub creditor_name: Option<String>,
    pub creditor_iban: Option<String>,
    pub creditor_other_id: Option<String>,
    pub unstructured: Option<String>,
    pub structured_reference: Option<String>,
}

impl DocumentSummary {
    /// All transactions across blocks, in document order.
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionSummary> {
        self.payment_infos.iter().flat_map(|p| p.transactions.iter())
    }
}

/// Parse the summary of a pain.001 document.
pub fn read_summary(xml: &str) -> Result<DocumentSummary, Pain001Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut summary = DocumentSummary::default();
    let mut path: Vec<String> = Vec::new();
    let mut seen_message_id = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                on_start(&mut summary, &path, &name, e);
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e);
                on_start(&mut summary, &path, &name, e);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| Pain001Error::Xml(format!("XML parse error: {err}")))?;
                if !text.is_empty() {
                    let steps: Vec<&str> = path.iter().map(String::as_str).collect();
                    if matches!(steps.as_slice(), [_, _, "GrpHdr", "MsgId"]) {
                        seen_message_id = true;
                    }
                    on_text(&mut summary, &steps, &text)?;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Pain001Error::Xml(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(Pain001Error::Xml("unexpected end of document".into()));
    }
    if !seen_message_id {
        return Err(Pain001Error::Xml(
            "not a pain.001 document: GrpHdr/MsgId is missing".into(),
        ));
    }
    Ok(summary)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn on_start(summary: &mut DocumentSummary, path: &[String], name: &str, e: &BytesStart<'_>) {
    let depth = path.len();
    match (depth, name) {
        (0, "Document") => summary.namespace = attribute(e, "xmlns"),
        (2, "PmtInf") => summary.payment_infos.push(PaymentInfoSummary::default()),
        (3, "CdtTrfTxInf") => {
            if let Some(block) = summary.payment_infos.last_mut() {
                block.transactions.push(TransactionSummary::default());
            }
        }
        (5, "InstdAmt") => {
            if let Some(tx) = current_transaction(summary) {
                tx.currency = attribute(e, "Ccy");
            }
        }
        _ => {}
    }
}

fn current_transaction(summary: &mut DocumentSummary) -> Option<&mut TransactionSummary> {
    summary
        .payment_infos
        .last_mut()
        .and_then(|b| b.transactions.last_mut())
}

fn on_text(summary: &mut DocumentSummary, path: &[&str], text: &str) -> Result<(), Pain001Error> {
    let value = Some(text.to_string());
    match path {
        [_, _, "GrpHdr", "MsgId"] => summary.message_id = text.to_string(),
        [_, _, "GrpHdr", "CreDtTm"] => summary.created_at = value,
        [_, _, "GrpHdr", "NbOfTxs"] => summary.number_of_transactions = Some(count(text)?),
        [_, _, "GrpHdr", "CtrlSum"] => summary.control_sum = Some(amount(text)?),
        [_, _, "PmtInf", "CdtTrfTxInf", rest @ ..] => {
            let Some(tx) = current_transaction(summary) else {
                return Ok(());
            };
            match rest {
                ["PmtId", "InstrId"] => tx.instruction_id = value,
                ["PmtId", "EndToEndId"] => tx.end_to_end_id = value,
                ["PmtId", "UETR"] => tx.uetr = value,
                ["Amt", "InstdAmt"] => tx.amount = Some(amount(text)?),
                ["CdtrAgt", "FinInstnId", "BIC" | "BICFI"] => tx.creditor_bic = value,
                ["Cdtr", "Nm"] => tx.creditor_name = value,
                ["CdtrAcct", "Id", "IBAN"] => tx.creditor_iban = value,
                ["CdtrAcct", "Id", "Othr", "Id"] => tx.creditor_other_id = value,
                ["RmtInf", "Ustrd"] => tx.unstructured = value,
                ["RmtInf", "Strd", "CdtrRefInf", "Ref"] => tx.structured_reference = value,
                _ => {}
            }
        }
        [_, _, "PmtInf", rest @ ..] => {
            let Some(block) = summary.payment_infos.last_mut() else {
                return Ok(());
            };
            match rest {
                ["PmtInfId"] => block.id = value,
                ["NbOfTxs"] => block.number_of_transactions = Some(count(text)?),
                ["CtrlSum"] => block.control_sum = Some(amount(text)?),
                ["PmtTpInf", "SvcLvl", "Cd"] => block.service_level = value,
                ["ReqdExctnDt"] | ["ReqdExctnDt", "Dt"] => block.execution_date = value,
                ["DbtrAcct", "Id", "IBAN"] => block.debtor_iban = value,
                ["DbtrAcct", "Ccy"] => block.currency = value,
                ["ChrgBr"] => block.charge_bearer = value,
                _ => {}
            }
        }
        _ => {}
    }
    Ok(())
}

fn amount(text: &str) -> Result<Decimal, Pain001Error> {
    Decimal::from_str(text.trim())
        .map_err(|e| Pain001Error::Xml(format!("invalid amount '{text}': {e}")))
}

fn count(text: &str) -> Result<u64, Pain001Error> {
    text.trim()
        .parse()
        .map_err(|e| Pain001Error::Xml(format!("invalid transaction count '{text}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.09" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <CstmrCdtTrfInitn>
    <GrpHdr>
      <MsgId>M1</MsgId>
      <CreDtTm>2024-03-15T10:00:00</CreDtTm>
      <NbOfTxs>1</NbOfTxs>
      <CtrlSum>12.50</CtrlSum>
      <InitgPty><Nm>ACME</Nm></InitgPty>
    </GrpHdr>
    <PmtInf>
      <PmtInfId>P1</PmtInfId>
      <PmtMtd>TRF</PmtMtd>
      <NbOfTxs>1</NbOfTxs>
      <CtrlSum>12.50</CtrlSum>
      <ReqdExctnDt><Dt>2024-03-20</Dt></ReqdExctnDt>
      <DbtrAcct><Id><IBAN>BE68539007547034</IBAN></Id><Ccy>EUR</Ccy></DbtrAcct>
      <ChrgBr>SLEV</ChrgBr>
      <CdtTrfTxInf>
        <PmtId><EndToEndId>E1</EndToEndId><UETR>0f0e3b4e-7a8c-4d3b-9f7e-2b3c4d5e6f70</UETR></PmtId>
        <Amt><InstdAmt Ccy="EUR">12.50</InstdAmt></Amt>
        <Cdtr><Nm>Fournisseur</Nm></Cdtr>
        <CdtrAcct><Id><IBAN>FR7630006000011234567890189</IBAN></Id></CdtrAcct>
        <RmtInf><Ustrd>Facture 7 &amp; 8</Ustrd></RmtInf>
      </CdtTrfTxInf>
    </PmtInf>
  </CstmrCdtTrfInitn>
</Document>
"#;

    #[test]
    fn reads_sample() {
        let s = read_summary(SAMPLE).unwrap();
        assert_eq!(
            s.namespace.as_deref(),
            Some("urn:iso:std:iso:20022:tech:xsd:pain.001.001.09")
        );
        assert_eq!(s.message_id, "M1");
        assert_eq!(s.number_of_transactions, Some(1));
        assert_eq!(s.control_sum, Some(dec!(12.50)));
        let block = &s.payment_infos[0];
        assert_eq!(block.execution_date.as_deref(), Some("2024-03-20"));
        assert_eq!(block.currency.as_deref(), Some("EUR"));
        assert_eq!(block.charge_bearer.as_deref(), Some("SLEV"));
        let tx = &block.transactions[0];
        assert_eq!(tx.amount, Some(dec!(12.50)));
        assert_eq!(tx.currency.as_deref(), Some("EUR"));
        assert_eq!(tx.creditor_name.as_deref(), Some("Fournisseur"));
        assert_eq!(tx.unstructured.as_deref(), Some("Facture 7 & 8"));
        assert_eq!(s.transactions().count(), 1);
    }

    #[test]
    fn rejects_other_documents() {
        assert!(read_summary("<Invoice><ID>1</ID></Invoice>").is_err());
        assert!(read_summary("").is_err());
        assert!(read_summary("<Document><CstmrCdtTrfInitn>").is_err());
    }

    #[test]
    fn rejects_bad_amount() {
        let broken = SAMPLE.replace("<CtrlSum>12.50</CtrlSum>\n      <InitgPty>", "<CtrlSum>abc</CtrlSum>\n      <InitgPty>");
        assert!(matches!(read_summary(&broken), Err(Pain001Error::Xml(_))));
    }
}
