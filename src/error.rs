// ⚠️ Error taxonomy
// Schema gaps and empty exports are absorbed locally; everything here is
// surfaced to the caller as a tagged value, never a panic.

use thiserror::Error;

use crate::taxonomy::{ReportKind, ReportSubtype, ReportType};

/// Unknown or inconsistent taxonomy names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("unknown report type: {0:?}")]
    UnknownType(String),

    #[error("unknown report subtype: {0:?}")]
    UnknownSubtype(String),

    #[error("subtype {subtype} is not defined for report type {report_type}")]
    InvalidPair {
        report_type: ReportType,
        subtype: ReportSubtype,
    },

    #[error("unknown report status: {0:?}")]
    UnknownStatus(String),
}

/// A date value that none of the accepted encodings could read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateNormalizationError {
    #[error("date is missing")]
    Missing,

    #[error("date triple {0:?} is out of range")]
    OutOfRange(Vec<i64>),

    #[error("date triple must hold three integers, got {0}")]
    MalformedTriple(String),

    #[error("unrecognized date: {0:?}")]
    Unparseable(String),
}

/// One problem found while validating a draft or a raw record.
///
/// Validation collects every problem rather than stopping at the first, so
/// forms can flag all offending inputs at once.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{kind}: required field `{field}` is missing")]
    MissingRequiredField { kind: ReportKind, field: String },

    #[error("{kind}: field `{field}` is not part of this report's schema")]
    UnknownField { kind: ReportKind, field: String },

    #[error("{kind}: field `{field}` expects {expected}, got {found}")]
    InvalidFieldValue {
        kind: ReportKind,
        field: String,
        expected: String,
        found: String,
    },

    #[error("field `{field}`: {source}")]
    InvalidDate {
        field: String,
        #[source]
        source: DateNormalizationError,
    },

    #[error("{kind} does not use a workflow status")]
    UnexpectedStatus { kind: ReportKind },
}

impl ValidationError {
    /// Name of the offending field, for inline form errors
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { field, .. }
            | ValidationError::UnknownField { field, .. }
            | ValidationError::InvalidFieldValue { field, .. }
            | ValidationError::InvalidDate { field, .. } => field,
            ValidationError::UnexpectedStatus { .. } => "status",
        }
    }
}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// Failure to turn a raw wire record into a typed Record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error("record {id} is invalid: {}", join(.errors))]
    Invalid {
        id: String,
        errors: Vec<ValidationError>,
    },

    #[error("record has no id")]
    MissingId,
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::OemSheet;

    #[test]
    fn test_missing_field_message_names_field() {
        let err = ValidationError::MissingRequiredField {
            kind: ReportKind::Oem(OemSheet::Orders),
            field: "poNumber".to_string(),
        };
        assert_eq!(err.field(), "poNumber");
        assert_eq!(err.to_string(), "oem/orders: required field `poNumber` is missing");
    }

    #[test]
    fn test_record_error_lists_all_problems() {
        let err = RecordError::Invalid {
            id: "r1".to_string(),
            errors: vec![
                ValidationError::InvalidDate {
                    field: "date".to_string(),
                    source: DateNormalizationError::Missing,
                },
                ValidationError::UnexpectedStatus { kind: ReportKind::Oem(OemSheet::Orders) },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("date is missing"));
        assert!(message.contains("workflow status"));
    }
}
