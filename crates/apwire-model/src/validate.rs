//! # Validation Pipeline — Dispatch Entry Points
//!
//! Turns untrusted wire payloads into canonical [`Document`]s. Two entry
//! shapes exist: raw JSON ([`dispatch`], [`dispatch_str`]) and a
//! pre-parsed generic [`Envelope`] ([`dispatch_envelope`]) for callers
//! that already extracted the discriminator while routing.
//!
//! ## Pipeline
//!
//! 1. Extract the `type` discriminator. Absent, null, empty, or
//!    non-string discriminators fail with `MissingType`, as does any
//!    input that is not a JSON object.
//! 2. Resolve the discriminator through the registry. Resolution is
//!    total; unrecognized tags validate under the generic object rules.
//! 3. Check the descriptor's required fields against the raw payload.
//! 4. Normalize every payload field in wire order: recognized fields
//!    through the reference normalizer or scalar coercion (null meaning
//!    unset), unrecognized fields kept verbatim, nulls included.
//! 5. Run the descriptor's cross-field invariants over the raw payload
//!    and the normalized fields.
//! 6. Assemble the document, preserving the wire `@context` or injecting
//!    the default.
//!
//! Validation is single-pass and short-circuiting: the first failure is
//! the result, and no partial document exists alongside an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use apwire_core::{ValidationError, ACTIVITY_STREAMS_CONTEXT};
use apwire_schema::{normalize_field, registry};

use crate::document::Document;

// ─── Entry Points ────────────────────────────────────────────────────

/// Validate a raw JSON payload into a canonical document.
///
/// # Errors
///
/// Returns the first [`ValidationError`] the payload provokes.
pub fn dispatch(payload: &Value) -> Result<Document, ValidationError> {
    let raw = payload.as_object().ok_or(ValidationError::MissingType)?;
    let kind = match raw.get("type") {
        Some(Value::String(t)) if !t.is_empty() => t.clone(),
        _ => return Err(ValidationError::MissingType),
    };
    validate_payload(kind, raw)
}

/// Parse JSON text and dispatch it.
///
/// Text that does not parse as JSON carries no discriminator, so it
/// fails with `MissingType` like any other non-object input.
pub fn dispatch_str(payload: &str) -> Result<Document, ValidationError> {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => dispatch(&value),
        Err(_) => Err(ValidationError::MissingType),
    }
}

/// A generic pre-parsed envelope: the discriminator an outer layer
/// already extracted while routing, plus the remaining payload fields.
///
/// Deserializes from the same wire object raw dispatch takes, so a
/// server can parse once, route on `kind`, and hand the envelope to
/// [`dispatch_envelope`] without re-parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The type discriminator.
    #[serde(rename = "type")]
    pub kind: String,
    /// Every other field, verbatim, in wire order.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Validate a pre-parsed envelope into a canonical document.
///
/// Skips discriminator extraction and runs the rest of the pipeline:
/// resolution, required fields, normalization, invariants, assembly.
///
/// # Errors
///
/// Returns `MissingType` for an empty discriminator, otherwise the first
/// [`ValidationError`] the payload provokes.
pub fn dispatch_envelope(envelope: &Envelope) -> Result<Document, ValidationError> {
    if envelope.kind.is_empty() {
        return Err(ValidationError::MissingType);
    }
    validate_payload(envelope.kind.clone(), &envelope.payload)
}

// ─── Pipeline Core ───────────────────────────────────────────────────

fn validate_payload(kind: String, raw: &Map<String, Value>) -> Result<Document, ValidationError> {
    let descriptor = registry::global().resolve(&kind);

    for rule in descriptor.required_fields() {
        match raw.get(rule.name) {
            None | Some(Value::Null) => {
                return Err(ValidationError::RequiredFieldMissing {
                    kind: kind.clone(),
                    field: rule.name.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    let mut fields = HashMap::new();
    let mut extra = Map::new();
    for (key, value) in raw {
        if key == "type" || key == "@context" {
            continue;
        }
        match descriptor.field(key) {
            // A null recognized field is unset. Null is pass-through like
            // any other value on unrecognized fields.
            Some(_) if value.is_null() => {}
            Some(rule) => {
                fields.insert(key.clone(), normalize_field(rule, value)?);
            }
            None => {
                extra.insert(key.clone(), value.clone());
            }
        }
    }

    for invariant in &descriptor.invariants {
        invariant.check(&kind, raw, &fields)?;
    }

    let context = match raw.get("@context") {
        None | Some(Value::Null) => Value::String(ACTIVITY_STREAMS_CONTEXT.to_string()),
        Some(context) => context.clone(),
    };

    Ok(Document::from_parts(kind, context, fields, extra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apwire_core::ScalarValue;
    use serde_json::json;

    // ---- discriminator extraction ----

    #[test]
    fn test_dispatch_resolves_the_discriminator() {
        let doc = dispatch(&json!({"type": "Note", "name": "hi"})).unwrap();
        assert_eq!(doc.kind(), "Note");
        assert_eq!(doc.descriptor().name, "object");
    }

    #[test]
    fn test_missing_type_variants() {
        let cases = [
            json!({}),
            json!({"name": "no type"}),
            json!({"type": null}),
            json!({"type": ""}),
            json!({"type": 42}),
            json!({"type": ["Note"]}),
            json!("a bare string"),
            json!([{"type": "Note"}]),
            json!(42),
            Value::Null,
        ];
        for payload in cases {
            assert_eq!(
                dispatch(&payload).unwrap_err(),
                ValidationError::MissingType,
                "{payload}"
            );
        }
    }

    #[test]
    fn test_dispatch_str() {
        let doc = dispatch_str(r#"{"type": "Note", "name": "hi"}"#).unwrap();
        assert_eq!(doc.kind(), "Note");

        assert_eq!(
            dispatch_str("this is not json").unwrap_err(),
            ValidationError::MissingType
        );
        assert_eq!(dispatch_str("[1, 2]").unwrap_err(), ValidationError::MissingType);
    }

    #[test]
    fn test_unknown_type_validates_as_object() {
        let doc = dispatch(&json!({
            "type": "ChatMessage",
            "name": "hello",
            "litepub:capability": "yes",
        }))
        .unwrap();
        assert_eq!(doc.kind(), "ChatMessage");
        assert_eq!(doc.descriptor().name, "object");
        assert_eq!(
            doc.scalar("name"),
            Some(&ScalarValue::Text("hello".to_string()))
        );
        assert_eq!(doc.extra()["litepub:capability"], json!("yes"));
    }

    // ---- required fields ----

    #[test]
    fn test_link_requires_href() {
        for payload in [
            json!({"type": "Link"}),
            json!({"type": "Link", "href": null}),
            json!({"type": "Mention", "name": "@a"}),
        ] {
            let err = dispatch(&payload).unwrap_err();
            assert!(
                matches!(
                    err,
                    ValidationError::RequiredFieldMissing { ref field, .. } if field == "href"
                ),
                "{payload}: {err}"
            );
        }
        let err = dispatch(&json!({"type": "Mention"})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::RequiredFieldMissing { ref kind, .. } if kind == "Mention"
        ));
    }

    #[test]
    fn test_required_check_runs_before_normalization() {
        // rel is malformed, but the missing href is reported first.
        let err = dispatch(&json!({"type": "Link", "rel": 42})).unwrap_err();
        assert!(matches!(err, ValidationError::RequiredFieldMissing { .. }));
    }

    // ---- single-pass normalization ----

    #[test]
    fn test_first_error_in_wire_order_wins() {
        let err = dispatch(&json!({
            "type": "Note",
            "published": "not a date",
            "to": 42,
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnrecognizedFieldShape { ref field, .. } if field == "published"
        ));

        let err = dispatch(&json!({
            "type": "Note",
            "to": 42,
            "published": "not a date",
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedReference {
                field: "to".to_string(),
                index: 0,
            }
        );
    }

    #[test]
    fn test_null_fields_are_unset() {
        let doc = dispatch(&json!({"type": "Note", "name": null, "to": null})).unwrap();
        assert!(doc.field("name").is_none());
        assert!(doc.field("to").is_none());
    }

    #[test]
    fn test_null_extension_fields_pass_through() {
        use crate::document::SerializeMode;

        // Null is unset only for recognized fields; an unrecognized field
        // carries over verbatim, null value included.
        let doc = dispatch(&json!({"type": "Note", "name": null, "ext:flag": null})).unwrap();
        assert!(doc.field("name").is_none());
        assert_eq!(doc.extra()["ext:flag"], Value::Null);

        let emitted = doc.to_value(SerializeMode::Verbose);
        assert_eq!(emitted["ext:flag"], Value::Null);
        assert_eq!(dispatch(&emitted).unwrap(), doc);
    }

    #[test]
    fn test_malformed_element_is_reported_with_index() {
        let err = dispatch(&json!({
            "type": "Note",
            "to": ["https://example.org/u/a", null],
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedReference {
                field: "to".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn test_id_must_be_a_string() {
        let err = dispatch(&json!({"type": "Note", "id": 42})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnrecognizedFieldShape { ref field, .. } if field == "id"
        ));
    }

    // ---- invariants ----

    #[test]
    fn test_intransitive_activity_rejects_object() {
        let err = dispatch(&json!({
            "type": "Arrive",
            "actor": "https://example.org/u/a",
            "object": "https://example.org/n/1",
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvariantViolation { ref rule, .. } if rule == "object-forbidden"
        ));

        // Without an object, the same payload passes.
        let doc = dispatch(&json!({
            "type": "Arrive",
            "actor": "https://example.org/u/a",
            "location": {"type": "Place", "name": "Work"},
        }))
        .unwrap();
        assert_eq!(doc.references("actor").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_question_answer_sets_are_exclusive() {
        let err = dispatch(&json!({
            "type": "Question",
            "name": "Pick one",
            "oneOf": [{"type": "Note", "name": "A"}],
            "anyOf": [{"type": "Note", "name": "B"}],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvariantViolation { ref rule, .. } if rule == "exclusive-answer-sets"
        ));

        let doc = dispatch(&json!({
            "type": "Question",
            "name": "Pick one",
            "oneOf": [{"type": "Note", "name": "A"}, {"type": "Note", "name": "B"}],
            "closed": false,
            "votersCount": 0,
        }))
        .unwrap();
        assert_eq!(doc.references("oneOf").map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_ordered_collection_rejects_items() {
        let err = dispatch(&json!({
            "type": "OrderedCollection",
            "items": ["https://example.org/n/1"],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvariantViolation { ref rule, .. } if rule == "ordered-items-only"
        ));

        let doc = dispatch(&json!({
            "type": "OrderedCollection",
            "totalItems": 2,
            "orderedItems": ["https://example.org/n/1", "https://example.org/n/2"],
        }))
        .unwrap();
        assert_eq!(doc.references("orderedItems").map(<[_]>::len), Some(2));
        assert_eq!(doc.scalar("totalItems"), Some(&ScalarValue::UnsignedInt(2)));
    }

    #[test]
    fn test_icon_aspect_is_enforced() {
        let err = dispatch(&json!({
            "type": "Note",
            "icon": {"type": "Image", "id": "https://x.test/i.png", "width": 16, "height": 32},
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvariantViolation { ref rule, .. } if rule == "icon-aspect"
        ));

        let doc = dispatch(&json!({
            "type": "Note",
            "icon": {"type": "Image", "id": "https://x.test/i.png", "width": 16, "height": 16},
        }))
        .unwrap();
        assert_eq!(doc.references("icon").map(<[_]>::len), Some(1));
    }

    // ---- context ----

    #[test]
    fn test_default_context_injected_when_absent() {
        let doc = dispatch(&json!({"type": "Note"})).unwrap();
        assert_eq!(doc.context(), &json!(ACTIVITY_STREAMS_CONTEXT));
    }

    #[test]
    fn test_wire_context_preserved_verbatim() {
        let doc = dispatch(&json!({
            "@context": [
                "https://www.w3.org/ns/activitystreams",
                {"toot": "http://joinmastodon.org/ns#"},
            ],
            "type": "Note",
        }))
        .unwrap();
        assert_eq!(
            doc.context(),
            &json!([
                "https://www.w3.org/ns/activitystreams",
                {"toot": "http://joinmastodon.org/ns#"},
            ])
        );
    }

    // ---- actors and collections ----

    #[test]
    fn test_actor_collections_normalize() {
        let doc = dispatch(&json!({
            "type": "Person",
            "id": "https://example.org/u/a",
            "preferredUsername": "a",
            "inbox": "https://example.org/u/a/inbox",
            "outbox": "https://example.org/u/a/outbox",
            "followers": "https://example.org/u/a/followers",
            "endpoints": {"sharedInbox": "https://example.org/inbox"},
        }))
        .unwrap();
        let inbox = &doc.references("inbox").unwrap()[0];
        assert_eq!(inbox.kind(), "OrderedCollection");
        assert_eq!(inbox.id(), Some("https://example.org/u/a/inbox"));
        let followers = &doc.references("followers").unwrap()[0];
        assert_eq!(followers.kind(), "Collection");
    }

    #[test]
    fn test_question_voters_count_must_be_non_negative() {
        let err = dispatch(&json!({
            "type": "Question",
            "votersCount": -1,
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnrecognizedFieldShape { ref field, .. } if field == "votersCount"
        ));
    }

    // ---- envelopes ----

    #[test]
    fn test_envelope_deserializes_from_wire_shape() {
        let envelope: Envelope = serde_json::from_value(json!({
            "type": "Note",
            "name": "hi",
            "to": ["https://example.org/u/a"],
        }))
        .unwrap();
        assert_eq!(envelope.kind, "Note");
        assert_eq!(envelope.payload["name"], json!("hi"));
        assert!(!envelope.payload.contains_key("type"));
    }

    #[test]
    fn test_envelope_dispatch_matches_raw_dispatch() {
        let payload = json!({
            "type": "Like",
            "actor": "https://example.org/u/a",
            "object": "https://example.org/n/1",
            "to": ["https://example.org/u/b"],
        });
        let raw = dispatch(&payload).unwrap();
        let envelope: Envelope = serde_json::from_value(payload).unwrap();
        let enveloped = dispatch_envelope(&envelope).unwrap();
        assert_eq!(raw, enveloped);
    }

    #[test]
    fn test_envelope_rejects_empty_discriminator() {
        let envelope = Envelope {
            kind: String::new(),
            payload: Map::new(),
        };
        assert_eq!(
            dispatch_envelope(&envelope).unwrap_err(),
            ValidationError::MissingType
        );
    }

    #[test]
    fn test_envelope_with_extension_type() {
        let envelope = Envelope {
            kind: "ChatMessage".to_string(),
            payload: serde_json::from_value(json!({"name": "hello"})).unwrap(),
        };
        let doc = dispatch_envelope(&envelope).unwrap();
        assert_eq!(doc.kind(), "ChatMessage");
        assert_eq!(doc.descriptor().name, "object");
    }
}
