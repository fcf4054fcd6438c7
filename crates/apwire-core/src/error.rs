//! # Error Types — Validation Failure Taxonomy
//!
//! Defines the error types produced by payload validation. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure names the offending field (and element index where one
//!   exists), so callers can report the exact wire location.
//! - Validation is single-pass and short-circuiting: a failed validation
//!   carries exactly one error, never a partial document alongside it.
//! - All variants are terminal. Nothing here is retryable, and the engine
//!   performs no logging or recovery; disposition belongs to the caller.

use thiserror::Error;

/// A payload was rejected during validation or normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload has no usable `type` discriminator. Raised both when the
    /// field is absent and when the input is not a JSON object at all.
    #[error("payload carries no type discriminator")]
    MissingType,

    /// A reference field element is neither an identifier string nor an
    /// embedded object.
    #[error("malformed reference in field {field:?} at index {index}")]
    MalformedReference {
        /// Wire name of the field being normalized.
        field: String,
        /// Zero-based position of the offending element. Zero for
        /// non-array field values.
        index: usize,
    },

    /// A field value does not fit any shape the vocabulary admits for it.
    #[error("unrecognized shape for field {field:?}: {reason}")]
    UnrecognizedFieldShape {
        /// Wire name of the offending field.
        field: String,
        /// What was found, and what the field admits.
        reason: String,
    },

    /// A field the resolved schema requires is absent.
    #[error("type {kind:?} requires field {field:?}")]
    RequiredFieldMissing {
        /// The type discriminator whose schema was applied.
        kind: String,
        /// Wire name of the missing field.
        field: String,
    },

    /// A cross-field rule of the resolved schema was violated.
    #[error("type {kind:?} violates {rule}: {detail}")]
    InvariantViolation {
        /// The type discriminator whose schema was applied.
        kind: String,
        /// Stable name of the violated rule.
        rule: String,
        /// Human-readable description of the violation.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let err = ValidationError::MalformedReference {
            field: "to".to_string(),
            index: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("\"to\""), "message should name the field: {msg}");
        assert!(msg.contains('2'), "message should carry the index: {msg}");
    }

    #[test]
    fn test_display_names_rule() {
        let err = ValidationError::InvariantViolation {
            kind: "Question".to_string(),
            rule: "exclusive-answer-sets".to_string(),
            detail: "both oneOf and anyOf are set".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exclusive-answer-sets"));
        assert!(msg.contains("Question"));
    }

    #[test]
    fn test_missing_type_display() {
        assert_eq!(
            ValidationError::MissingType.to_string(),
            "payload carries no type discriminator"
        );
    }
}
