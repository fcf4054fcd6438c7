//! # Derived Documents — Follow-Up Constructors
//!
//! Constructors for the documents a federated exchange produces from an
//! existing one: wrapping fresh content in a `Create`, tombstoning
//! deleted content, undoing a delivered activity, and an actor
//! performing an arbitrary activity.
//!
//! Every constructor assembles a new wire payload and pushes it through
//! the validation pipeline, so derived documents obey the same schema
//! rules as inbound traffic — including the `object-forbidden` invariant
//! when an intransitive activity type is asked to carry an object.

use serde_json::{json, Map, Value};
use thiserror::Error;

use apwire_core::{CoreType, ScalarValue, Timestamp, TypeName, TypedReference, ValidationError};

use crate::document::{Document, SerializeMode};
use crate::validate;

/// The audience fields copied from a source document onto the activity
/// that wraps or references it.
const ADDRESSING_FIELDS: [&str; 5] = ["to", "bto", "cc", "bcc", "audience"];

/// Failures specific to deriving one document from another.
///
/// Payload-level failures surface as the wrapped [`ValidationError`],
/// since every derived document passes through the validation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// The operation is not defined for the named family.
    #[error("`{operation}` is not defined for `{kind}` documents")]
    WrongFamily {
        /// The derivation that was attempted.
        operation: &'static str,
        /// The offending type discriminator.
        kind: String,
    },

    /// The operation needs an identifier the source document lacks.
    #[error("`{operation}` requires the source document to carry an identifier")]
    MissingIdentifier {
        /// The derivation that was attempted.
        operation: &'static str,
    },

    /// Wrapping a document with no fields would produce a `Create` with
    /// nothing in it.
    #[error("refusing to derive from a document with no fields")]
    EmptyDocument,

    /// The derived payload failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Document {
    /// Wrap this document as the `object` of a new `Create` activity.
    ///
    /// Copies the source's `to`/`bto`/`cc`/`bcc`/`audience` addressing
    /// onto the activity and stamps `published` with the current time.
    /// Links and activities cannot be wrapped, and neither can a
    /// document with no fields.
    ///
    /// # Errors
    ///
    /// [`DeriveError::WrongFamily`] for Link- and Activity-family
    /// sources, [`DeriveError::EmptyDocument`] for an empty one.
    pub fn to_create(&self) -> Result<Document, DeriveError> {
        self.require_object_family("to_create")?;
        if self.is_empty() {
            return Err(DeriveError::EmptyDocument);
        }

        let mut payload = Map::new();
        payload.insert("type".to_string(), json!("Create"));
        for field in ADDRESSING_FIELDS {
            self.copy_reference_field(field, &mut payload);
        }
        payload.insert("published".to_string(), json!(Timestamp::now().to_rfc3339()));
        payload.insert("object".to_string(), self.to_value(SerializeMode::Verbose));
        Ok(validate::dispatch(&Value::Object(payload))?)
    }

    /// Produce the `Tombstone` that replaces this document once deleted.
    ///
    /// Carries the source `id` and `published` forward, with `updated`
    /// and `deleted` stamped from the same current instant.
    ///
    /// # Errors
    ///
    /// [`DeriveError::WrongFamily`] for Link- and Activity-family
    /// sources, [`DeriveError::MissingIdentifier`] when the source has
    /// no `id` to tombstone.
    pub fn to_tombstone(&self) -> Result<Document, DeriveError> {
        self.require_object_family("to_tombstone")?;
        let id = self.id().ok_or(DeriveError::MissingIdentifier {
            operation: "to_tombstone",
        })?;

        let stamp = json!(Timestamp::now().to_rfc3339());
        let mut payload = Map::new();
        payload.insert("type".to_string(), json!("Tombstone"));
        payload.insert("id".to_string(), json!(id));
        if let Some(ScalarValue::Time(published)) = self.scalar("published") {
            payload.insert("published".to_string(), json!(published.to_rfc3339()));
        }
        payload.insert("updated".to_string(), stamp.clone());
        payload.insert("deleted".to_string(), stamp);
        Ok(validate::dispatch(&Value::Object(payload))?)
    }

    /// Produce the `Undo` that retracts this activity.
    ///
    /// The source activity becomes the `object`, and its `actor` and
    /// addressing are copied so the retraction reaches the same
    /// audience.
    ///
    /// # Errors
    ///
    /// [`DeriveError::WrongFamily`] unless the source is an
    /// Activity-family document.
    pub fn to_undo(&self) -> Result<Document, DeriveError> {
        if self.core() != CoreType::Activity {
            return Err(DeriveError::WrongFamily {
                operation: "to_undo",
                kind: self.kind().to_string(),
            });
        }

        let mut payload = Map::new();
        payload.insert("type".to_string(), json!("Undo"));
        self.copy_reference_field("actor", &mut payload);
        for field in ADDRESSING_FIELDS {
            self.copy_reference_field(field, &mut payload);
        }
        payload.insert("published".to_string(), json!(Timestamp::now().to_rfc3339()));
        payload.insert("object".to_string(), self.to_value(SerializeMode::Verbose));
        Ok(validate::dispatch(&Value::Object(payload))?)
    }

    /// Produce an activity of the given type performed by this actor.
    ///
    /// The actor's identifier becomes the `actor`, `published` is
    /// stamped now, and the optional document embeds as the `object`.
    /// Passing an object to an intransitive activity type fails through
    /// the pipeline's `object-forbidden` invariant.
    ///
    /// # Errors
    ///
    /// [`DeriveError::WrongFamily`] unless the source is an
    /// Actor-family document and `kind` an Activity-family type;
    /// [`DeriveError::MissingIdentifier`] when the actor has no `id`.
    pub fn act(&self, kind: TypeName, object: Option<&Document>) -> Result<Document, DeriveError> {
        if self.core() != CoreType::Actor {
            return Err(DeriveError::WrongFamily {
                operation: "act",
                kind: self.kind().to_string(),
            });
        }
        if kind.core_type() != CoreType::Activity {
            return Err(DeriveError::WrongFamily {
                operation: "act",
                kind: kind.as_str().to_string(),
            });
        }
        let id = self.id().ok_or(DeriveError::MissingIdentifier { operation: "act" })?;

        let mut payload = Map::new();
        payload.insert("type".to_string(), json!(kind.as_str()));
        payload.insert("actor".to_string(), json!(id));
        payload.insert("published".to_string(), json!(Timestamp::now().to_rfc3339()));
        if let Some(object) = object {
            payload.insert("object".to_string(), object.to_value(SerializeMode::Verbose));
        }
        Ok(validate::dispatch(&Value::Object(payload))?)
    }

    fn require_object_family(&self, operation: &'static str) -> Result<(), DeriveError> {
        match self.core() {
            CoreType::Link | CoreType::Activity => Err(DeriveError::WrongFamily {
                operation,
                kind: self.kind().to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Copy a reference field onto a derived payload in compact form,
    /// skipping fields that are absent or empty.
    fn copy_reference_field(&self, field: &str, payload: &mut Map<String, Value>) {
        if let Some(refs) = self.references(field) {
            if !refs.is_empty() {
                let rendered = refs.iter().map(TypedReference::to_compact_value).collect();
                payload.insert(field.to_string(), Value::Array(rendered));
            }
        }
    }
}
