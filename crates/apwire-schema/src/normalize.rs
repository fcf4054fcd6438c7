//! # Reference Normalization — Wire Shapes to Canonical Values
//!
//! Rewrites the heterogeneous wire shapes of recognized fields into the
//! canonical model: reference fields become ordered [`TypedReference`]
//! sequences, non-reference fields become [`ScalarValue`]s.
//!
//! ## Normalization Invariants
//!
//! - Element order and duplicates are preserved exactly. Normalization
//!   never sorts, dedupes, or drops elements.
//! - Single-pass and short-circuiting: the first offending value aborts
//!   with one error naming its wire location (`tag[2].published` style
//!   paths for values inside embedded elements).
//! - Embedded objects normalize recursively under the descriptor their
//!   own tag resolves to, so a nested activity's `actor` follows the same
//!   rules as a top-level one. An element's canonical payload is fully
//!   normalized, and document serialization is a plain tree walk.
//! - Null is unset for fields and dropped from embedded payloads. A null
//!   element inside an array is malformed, not unset: dropping it would
//!   renumber the sequence.
//!
//! ## Type Tag Resolution
//!
//! An element's tag comes from its own `type` when that is a string. An
//! element carrying `href` is always Link-family: a Link-family tag is
//! kept, anything else becomes `Link`. Untyped elements take the field's
//! default tag, upgraded under collection targets by the page evidence
//! keys `startIndex`, `partOf`, `next`, `prev`, and `orderedItems`.

use serde_json::{Map, Value};

use apwire_core::{
    is_language_tag, CoreType, FieldValue, LanguageMap, ScalarValue, Timestamp, TypeName,
    TypedReference, ValidationError, ACTIVITY_STREAMS_CONTEXT,
};

use crate::descriptor::{Cardinality, FieldRule, FieldShape, RefTarget, ScalarKind};
use crate::registry;

/// Maximum depth of embedded reference elements. Bounds recursion on
/// adversarial payloads; federation traffic nests a handful of levels.
pub const MAX_EMBED_DEPTH: usize = 64;

/// Endpoint keys recognized on an actor's `endpoints` object, in
/// canonical order.
const ENDPOINT_KEYS: [&str; 6] = [
    "proxyUrl",
    "oauthAuthorizationEndpoint",
    "oauthTokenEndpoint",
    "provideClientKey",
    "signClientKey",
    "sharedInbox",
];

/// A short JSON shape name for error messages.
fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn bad_shape(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::UnrecognizedFieldShape {
        field: field.to_string(),
        reason: reason.into(),
    }
}

// ─── Field Normalization ─────────────────────────────────────────────

/// Normalize one recognized field value under its rule.
///
/// The caller skips absent and null fields; a null reaching this point is
/// rejected as an unrecognized shape.
pub fn normalize_field(rule: &FieldRule, value: &Value) -> Result<FieldValue, ValidationError> {
    match rule.shape {
        FieldShape::References {
            target,
            cardinality,
        } => normalize_references(rule.name, target, cardinality, value)
            .map(FieldValue::References),
        FieldShape::Scalar(kind) => coerce_scalar(rule.name, kind, value).map(FieldValue::Scalar),
    }
}

/// Normalize a reference field value into its canonical element sequence.
///
/// Accepts the three wire shapes: a bare identifier string, a single
/// embedded object, and an array mixing both. Arrays are rejected on
/// single-cardinality fields, and a bare value on a many-cardinality
/// field promotes to a sequence of one.
pub fn normalize_references(
    field: &str,
    target: RefTarget,
    cardinality: Cardinality,
    value: &Value,
) -> Result<Vec<TypedReference>, ValidationError> {
    references_at_depth(field, target, cardinality, value, 1)
}

fn references_at_depth(
    field: &str,
    target: RefTarget,
    cardinality: Cardinality,
    value: &Value,
    depth: usize,
) -> Result<Vec<TypedReference>, ValidationError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(id) => Ok(vec![TypedReference::identifier(target.default_tag(), id)]),
        Value::Object(map) => Ok(vec![embedded_element(field, 0, target, map, depth)?]),
        Value::Array(items) => {
            if cardinality == Cardinality::One {
                return Err(bad_shape(field, "expected a single reference, got an array"));
            }
            let mut refs = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                refs.push(array_element(field, index, target, item, depth)?);
            }
            Ok(refs)
        }
        // A scalar that is neither string nor object is malformed the same
        // way an array element would be; index 0 marks the bare value.
        _ => Err(ValidationError::MalformedReference {
            field: field.to_string(),
            index: 0,
        }),
    }
}

fn array_element(
    field: &str,
    index: usize,
    target: RefTarget,
    item: &Value,
    depth: usize,
) -> Result<TypedReference, ValidationError> {
    match item {
        Value::String(id) => Ok(TypedReference::identifier(target.default_tag(), id)),
        Value::Object(map) => embedded_element(field, index, target, map, depth),
        _ => Err(ValidationError::MalformedReference {
            field: field.to_string(),
            index,
        }),
    }
}

// ─── Embedded Elements ───────────────────────────────────────────────

/// Normalize one embedded object into a typed reference.
///
/// Resolves the element's tag, extracts the identifier under the tag's
/// identifier key, and rewrites the remaining payload: recognized fields
/// of the tag's descriptor normalize recursively, unknown keys are kept
/// verbatim, nulls are dropped. A payload `@context` equal to the default
/// is redundant and dropped; any other context is kept.
fn embedded_element(
    field: &str,
    index: usize,
    target: RefTarget,
    map: &Map<String, Value>,
    depth: usize,
) -> Result<TypedReference, ValidationError> {
    if depth > MAX_EMBED_DEPTH {
        return Err(bad_shape(
            field,
            format!("reference embedding exceeds {MAX_EMBED_DEPTH} levels"),
        ));
    }

    let kind = element_kind(field, index, target, map)?;
    let identifier_key = TypedReference::identifier_key_for(&kind);
    let identifier = match map.get(identifier_key) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => {
            return Err(ValidationError::MalformedReference {
                field: field.to_string(),
                index,
            })
        }
    };

    let descriptor = registry::global().resolve(&kind);
    let element_path = format!("{field}[{index}]");
    let mut props = Map::new();
    for (key, value) in map {
        if key == "type" || key == identifier_key || value.is_null() {
            continue;
        }
        if key == "@context" {
            if value.as_str() != Some(ACTIVITY_STREAMS_CONTEXT) {
                props.insert(key.clone(), value.clone());
            }
            continue;
        }
        match descriptor.field(key) {
            Some(rule) => {
                let path = format!("{element_path}.{key}");
                let canonical = match rule.shape {
                    FieldShape::References {
                        target,
                        cardinality,
                    } => {
                        let refs =
                            references_at_depth(&path, target, cardinality, value, depth + 1)?;
                        render_verbose(&refs, cardinality)
                    }
                    FieldShape::Scalar(kind) => coerce_scalar(&path, kind, value)?.to_value(),
                };
                props.insert(key.clone(), canonical);
            }
            None => {
                props.insert(key.clone(), value.clone());
            }
        }
    }

    // Visual reference fields only accept image payloads.
    if target == RefTarget::ImageOrLink {
        if let Some(media) = props.get("mediaType").and_then(Value::as_str) {
            if !media.starts_with("image/") {
                return Err(bad_shape(
                    &format!("{element_path}.mediaType"),
                    format!("expected an image/* media type, got {media:?}"),
                ));
            }
        }
    }

    Ok(TypedReference::new(kind, identifier, props))
}

/// Resolve the type tag of one embedded element.
///
/// Page evidence for untyped elements under collection targets: the page
/// keys `partOf`, `next`, `prev`, and `startIndex` mark a page, and
/// `startIndex` or `orderedItems` marks it ordered. A page target counts
/// as page evidence, and an ordered target as ordering evidence, so an
/// inbox page infers `OrderedCollectionPage` from `partOf` alone.
fn element_kind(
    field: &str,
    index: usize,
    target: RefTarget,
    map: &Map<String, Value>,
) -> Result<String, ValidationError> {
    let declared = match map.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(t)) => Some(t.as_str()),
        Some(_) => {
            return Err(ValidationError::MalformedReference {
                field: field.to_string(),
                index,
            })
        }
    };

    // An href makes the element Link-family no matter what it declares.
    if map.get("href").is_some_and(|v| !v.is_null()) {
        return Ok(match declared.and_then(TypeName::from_wire) {
            Some(t) if t.core_type() == CoreType::Link => t.as_str().to_string(),
            _ => "Link".to_string(),
        });
    }

    if let Some(declared) = declared {
        return Ok(declared.to_string());
    }

    match target {
        RefTarget::Collection | RefTarget::OrderedCollection | RefTarget::PageOrLink => {
            let has = |key: &str| map.get(key).is_some_and(|v| !v.is_null());
            let paged = target == RefTarget::PageOrLink
                || has("partOf")
                || has("next")
                || has("prev")
                || has("startIndex");
            let ordered = target == RefTarget::OrderedCollection
                || has("startIndex")
                || has("orderedItems");
            Ok(match (paged, ordered) {
                (true, true) => "OrderedCollectionPage",
                (true, false) => "CollectionPage",
                (false, true) => "OrderedCollection",
                (false, false) => target.default_tag(),
            }
            .to_string())
        }
        _ => Ok(target.default_tag().to_string()),
    }
}

/// Render a normalized sequence in its canonical verbose shape: a single
/// element for single-cardinality fields, an array otherwise.
fn render_verbose(refs: &[TypedReference], cardinality: Cardinality) -> Value {
    match cardinality {
        Cardinality::One => refs
            .first()
            .map_or(Value::Null, TypedReference::to_verbose_value),
        Cardinality::Many => {
            Value::Array(refs.iter().map(TypedReference::to_verbose_value).collect())
        }
    }
}

// ─── Scalar Coercion ─────────────────────────────────────────────────

/// Coerce one non-reference field value into its canonical scalar.
///
/// Coercion is strict about JSON shape (a datetime must be a string, a
/// count must be a non-negative integer) and lenient about textual
/// variation a canonical form exists for (timestamps in any offset).
pub fn coerce_scalar(
    field: &str,
    kind: ScalarKind,
    value: &Value,
) -> Result<ScalarValue, ValidationError> {
    match kind {
        ScalarKind::Text => match value {
            Value::String(s) => Ok(ScalarValue::Text(s.clone())),
            other => Err(bad_shape(
                field,
                format!("expected a string, got {}", shape_of(other)),
            )),
        },
        ScalarKind::NonNegativeInt => match value {
            Value::Number(n) => n.as_u64().map(ScalarValue::UnsignedInt).ok_or_else(|| {
                bad_shape(field, format!("expected a non-negative integer, got {n}"))
            }),
            other => Err(bad_shape(
                field,
                format!("expected a non-negative integer, got {}", shape_of(other)),
            )),
        },
        ScalarKind::Float => match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Ok(ScalarValue::Float(f)),
                None => Err(bad_shape(field, format!("number {n} does not fit a float"))),
            },
            other => Err(bad_shape(
                field,
                format!("expected a number, got {}", shape_of(other)),
            )),
        },
        ScalarKind::DateTime => match value {
            Value::String(s) => Timestamp::parse(s)
                .map(ScalarValue::Time)
                .map_err(|e| bad_shape(field, e.to_string())),
            other => Err(bad_shape(
                field,
                format!("expected an RFC 3339 string, got {}", shape_of(other)),
            )),
        },
        ScalarKind::LanguageMap => match value {
            Value::Object(map) => LanguageMap::from_map(map)
                .map(ScalarValue::LanguageMap)
                .map_err(|e| bad_shape(field, e.to_string())),
            other => Err(bad_shape(
                field,
                format!("expected a language map object, got {}", shape_of(other)),
            )),
        },
        ScalarKind::MimeType => match value {
            Value::String(s) if is_mime_type(s) => Ok(ScalarValue::Text(s.clone())),
            Value::String(s) => Err(bad_shape(
                field,
                format!("{s:?} is not a type/subtype media type"),
            )),
            other => Err(bad_shape(
                field,
                format!("expected a media type string, got {}", shape_of(other)),
            )),
        },
        ScalarKind::LanguageTag => match value {
            Value::String(s) if is_language_tag(s) => Ok(ScalarValue::Text(s.clone())),
            Value::String(s) => Err(bad_shape(field, format!("{s:?} is not a language tag"))),
            other => Err(bad_shape(
                field,
                format!("expected a language tag string, got {}", shape_of(other)),
            )),
        },
        ScalarKind::RelTokens => rel_tokens(field, value),
        ScalarKind::Endpoints => endpoints(field, value),
        ScalarKind::Opaque => Ok(ScalarValue::Opaque(value.clone())),
    }
}

/// Link relation tokens: a single token or a list of tokens. Tokens must
/// be non-empty and free of spaces and commas.
fn rel_tokens(field: &str, value: &Value) -> Result<ScalarValue, ValidationError> {
    let check = |token: &str| -> Result<(), ValidationError> {
        if token.is_empty() || token.contains([' ', ',']) {
            return Err(bad_shape(
                field,
                format!("{token:?} is not a link relation token"),
            ));
        }
        Ok(())
    };
    match value {
        Value::String(s) => {
            check(s)?;
            Ok(ScalarValue::TextList(vec![s.clone()]))
        }
        Value::Array(items) => {
            let mut tokens = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => {
                        check(s)?;
                        tokens.push(s.to_string());
                    }
                    None => {
                        return Err(bad_shape(
                            field,
                            format!("expected relation token strings, got {}", shape_of(item)),
                        ))
                    }
                }
            }
            Ok(ScalarValue::TextList(tokens))
        }
        other => Err(bad_shape(
            field,
            format!("expected a relation token or list, got {}", shape_of(other)),
        )),
    }
}

/// An actor's `endpoints`: a URL string, or an object whose recognized
/// keys carry strings. Recognized keys are kept in canonical order and
/// unknown keys are dropped.
fn endpoints(field: &str, value: &Value) -> Result<ScalarValue, ValidationError> {
    match value {
        Value::String(s) => Ok(ScalarValue::Text(s.clone())),
        Value::Object(map) => {
            let mut filtered = Map::new();
            for key in ENDPOINT_KEYS {
                match map.get(key) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(s)) => {
                        filtered.insert(key.to_string(), Value::String(s.clone()));
                    }
                    Some(other) => {
                        return Err(bad_shape(
                            &format!("{field}.{key}"),
                            format!("expected an endpoint URL string, got {}", shape_of(other)),
                        ))
                    }
                }
            }
            Ok(ScalarValue::Opaque(Value::Object(filtered)))
        }
        other => Err(bad_shape(
            field,
            format!("expected an endpoints object or URL, got {}", shape_of(other)),
        )),
    }
}

/// Whether a string has the structural shape of a media type: one `/`
/// separating a non-empty type and subtype of RFC 6838 restricted-name
/// characters. A shape check, not a registry lookup.
pub fn is_mime_type(s: &str) -> bool {
    match s.split_once('/') {
        Some((main, sub)) => is_mime_token(main) && is_mime_token(sub),
        None => false,
    }
}

fn is_mime_token(token: &str) -> bool {
    let mut bytes = token.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    token.len() <= 127 && bytes.all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,12}(/[a-z0-9]{1,8}){0,3}".prop_map(|path| format!("https://example.org/{path}"))
    }

    /// One wire element: a bare identifier or a small embedded note.
    fn element_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            identifier_strategy().prop_map(Value::String),
            (identifier_strategy(), "[a-zA-Z ]{0,16}").prop_map(|(id, name)| json!({
                "type": "Note",
                "id": id,
                "name": name,
            })),
        ]
    }

    proptest! {
        /// Normalization preserves element count and order.
        #[test]
        fn order_and_count_preserved(ids in prop::collection::vec(identifier_strategy(), 0..8)) {
            let refs = normalize_references(
                "to",
                RefTarget::ObjectOrLink,
                Cardinality::Many,
                &json!(ids),
            )
            .unwrap();
            let out: Vec<&str> = refs.iter().filter_map(TypedReference::id).collect();
            prop_assert_eq!(out, ids.iter().map(String::as_str).collect::<Vec<_>>());
        }

        /// A bare value and a one-element array normalize identically.
        #[test]
        fn promotion_matches_singleton_array(id in identifier_strategy()) {
            let bare = normalize_references(
                "to", RefTarget::ObjectOrLink, Cardinality::Many, &json!(id),
            ).unwrap();
            let wrapped = normalize_references(
                "to", RefTarget::ObjectOrLink, Cardinality::Many, &json!([id]),
            ).unwrap();
            prop_assert_eq!(bare, wrapped);
        }

        /// Re-normalizing canonical verbose output is a fixed point.
        #[test]
        fn verbose_output_is_a_fixed_point(
            elements in prop::collection::vec(element_strategy(), 0..6),
        ) {
            let first = normalize_references(
                "tag", RefTarget::ObjectOrLink, Cardinality::Many, &json!(elements),
            ).unwrap();
            let emitted = Value::Array(
                first.iter().map(TypedReference::to_verbose_value).collect(),
            );
            let second = normalize_references(
                "tag", RefTarget::ObjectOrLink, Cardinality::Many, &emitted,
            ).unwrap();
            prop_assert_eq!(&first, &second);
            let re_emitted = Value::Array(
                second.iter().map(TypedReference::to_verbose_value).collect(),
            );
            prop_assert_eq!(emitted, re_emitted);
        }
    }
}
