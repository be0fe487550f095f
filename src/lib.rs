//! # pain001
//!
//! Generator of ISO 20022 "Customer Credit Transfer Initiation" (pain.001) XML
//! documents from a normalized payment batch.
//!
//! Six published profiles are supported: SEPA pain.001.001.03 and .09, the German
//! and Austrian pain.001.001.03 addenda, Swiss pain.001.001.03.ch.02 and the
//! Swedish pain.001.001.03 usage. Generation is a pure function of the batch, an
//! injected [`Clock`] and the date treated as "today".
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pain001::*;
//! use rust_decimal_macros::dec;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let batch = PaymentBatchBuilder::new(Pain001Variant::Sepa03)
//!     .initiating_party(InitiatingPartyBuilder::new("ACME SA").build())
//!     .debtor(PartyAccountBuilder::iban("ACME SA", "BE68 5390 0754 7034").build())
//!     .add_payment(
//!         PaymentBuilder::new("p1", today, dec!(100), "EUR")
//!             .creditor(
//!                 PartyAccountBuilder::iban("Fournisseur SARL", "FR7630006000011234567890189")
//!                     .bic("AGRIFRPP")
//!                     .build(),
//!             )
//!             .memo("Invoice 123")
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let clock = FixedClock::new("1710500000", today.and_hms_opt(10, 0, 0).unwrap());
//! let xml = pain001::xml::generate(&batch, &clock, today).unwrap();
//! assert!(String::from_utf8(xml).unwrap().contains("<CtrlSum>100.00</CtrlSum>"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Batch types, sanitizer, identifier checks, variant table, batch validation |
//! | `xml` (default) | Document building, serialization and the summary reader |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
