use thiserror::Error;

use super::variant::Pain001Variant;

/// Errors that can occur while building or generating a pain.001 document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Pain001Error {
    /// The batch is missing configuration the variant needs (debtor IBAN,
    /// organization id, party country). At least one issue is of kind
    /// [`IssueKind::Configuration`].
    #[error("configuration error ({variant}): {}", join_issues(.issues))]
    Configuration {
        variant: Pain001Variant,
        issues: Vec<ValidationError>,
    },

    /// One or more payments violate the variant's preconditions.
    #[error("validation failed ({variant}): {}", join_issues(.issues))]
    Validation {
        variant: Pain001Variant,
        issues: Vec<ValidationError>,
    },

    /// Builder encountered invalid or missing input.
    #[error("builder error: {0}")]
    Builder(String),

    /// An internal invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),

    /// XML writing or reading error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl Pain001Error {
    /// The individual findings behind a configuration or validation error.
    pub fn issues(&self) -> &[ValidationError] {
        match self {
            Self::Configuration { issues, .. } | Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[ValidationError]) -> String {
    issues
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whether an issue points at setup (user should fix configuration) or at
/// the payment data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Configuration,
    Validation,
}

/// A single finding with field path, message and the offending payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: IssueKind,
    /// Dot-separated path to the invalid field (e.g. "creditor.account").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Identifier of the payment the issue belongs to, if any.
    pub payment: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(payment) = &self.payment {
            write!(f, "[payment {}] {}: {}", payment, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// A data issue that is not tied to a payment.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Validation,
            field: field.into(),
            message: message.into(),
            payment: None,
        }
    }

    /// A setup issue the caller should redirect to configuration.
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Configuration,
            field: field.into(),
            message: message.into(),
            payment: None,
        }
    }

    /// Attach the identifier of the offending payment.
    pub fn for_payment(mut self, payment: impl Into<String>) -> Self {
        self.payment = Some(payment.into());
        self
    }
}
