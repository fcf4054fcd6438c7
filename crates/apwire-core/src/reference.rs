//! # Typed References — Canonical Reference Elements
//!
//! Defines `TypedReference`, the single canonical shape every polymorphic
//! reference field is rewritten into, plus `FieldValue` (the per-field
//! canonical value held by a validated document) and `LanguageMap`.
//!
//! ## Canonical Shape Invariant
//!
//! A reference field on the wire may be a bare identifier string, a single
//! embedded object, or a mixed array of both. After normalization it is
//! always an ordered sequence of `TypedReference` values. The inner fields
//! are private: a reference is built with its resolved type tag and an
//! already-normalized payload, and cannot be mutated into an unnormalized
//! state afterward.
//!
//! Link-family references identify themselves with `href` on the wire;
//! every other family uses `id`. Inline references (embedded objects with
//! no identifier) keep their full payload and never collapse in compact
//! output.
//!
//! ## Vocabulary Reference
//!
//! <https://www.w3.org/TR/activitystreams-core/#object>

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::temporal::Timestamp;
use crate::vocab::{CoreType, TypeName};

/// The JSON-LD context injected when a payload or reference lacks one.
pub const ACTIVITY_STREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

// ─── Typed Reference ─────────────────────────────────────────────────

/// One canonical reference element: a resolved type tag, an optional
/// identifier, and the normalized embedded payload.
///
/// Produced by the reference normalizer; the constructor is public so the
/// normalizer can live in a higher crate, but the fields are not.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedReference {
    /// Resolved type tag. Extension tags are kept verbatim.
    kind: String,
    /// Identifier extracted from `href` (Link family) or `id`.
    /// `None` marks an inline reference.
    id: Option<String>,
    /// Normalized embedded payload, minus the type and identifier keys.
    props: Map<String, Value>,
}

impl TypedReference {
    /// Construct a reference from a resolved type tag, an optional
    /// identifier, and an already-normalized payload.
    pub fn new(kind: impl Into<String>, id: Option<String>, props: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            id,
            props,
        }
    }

    /// Construct a bare identifier reference with an empty payload.
    ///
    /// This is the canonical form of a promoted identifier string.
    pub fn identifier(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
            props: Map::new(),
        }
    }

    /// The resolved type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The normalized embedded payload.
    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// Whether this is an inline reference (embedded object without an
    /// identifier). Inline references never collapse in compact output.
    pub fn is_inline(&self) -> bool {
        self.id.is_none()
    }

    /// The wire key a reference with the given tag carries its identifier
    /// under: `"href"` for Link-family tags, `"id"` otherwise.
    ///
    /// Extension tags are not Link-family, so they use `"id"`.
    pub fn identifier_key_for(kind: &str) -> &'static str {
        match TypeName::from_wire(kind) {
            Some(t) if t.core_type() == CoreType::Link => "href",
            _ => "id",
        }
    }

    /// The wire key this reference's identifier is carried under.
    pub fn identifier_key(&self) -> &'static str {
        Self::identifier_key_for(&self.kind)
    }

    /// Render the full typed shape: context, type tag, identifier, payload.
    ///
    /// A context carried in the payload wins over the default; the key
    /// always emits first, followed by `type` and the identifier key, then
    /// the payload in normalized order.
    pub fn to_verbose_value(&self) -> Value {
        let mut out = Map::new();
        let context = self
            .props
            .get("@context")
            .cloned()
            .unwrap_or_else(|| Value::String(ACTIVITY_STREAMS_CONTEXT.to_string()));
        out.insert("@context".to_string(), context);
        out.insert("type".to_string(), Value::String(self.kind.clone()));
        if let Some(id) = &self.id {
            out.insert(self.identifier_key().to_string(), Value::String(id.clone()));
        }
        for (k, v) in &self.props {
            if k != "@context" {
                out.insert(k.clone(), v.clone());
            }
        }
        Value::Object(out)
    }

    /// Render the shorthand shape: the bare identifier string, or the full
    /// typed shape for inline references.
    pub fn to_compact_value(&self) -> Value {
        match &self.id {
            Some(id) => Value::String(id.clone()),
            None => self.to_verbose_value(),
        }
    }
}

// References cross the wire only inside serialized documents, where the
// verbose shape is the lossless one.
impl Serialize for TypedReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_verbose_value().serialize(serializer)
    }
}

// ─── Field Values ────────────────────────────────────────────────────

/// The canonical value of one recognized field on a validated document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// An ordered sequence of typed references. Order and duplicates are
    /// preserved from the wire.
    References(Vec<TypedReference>),
    /// A canonicalized non-reference value.
    Scalar(ScalarValue),
}

impl FieldValue {
    /// The reference sequence, if this is a reference field.
    pub fn as_references(&self) -> Option<&[TypedReference]> {
        match self {
            FieldValue::References(refs) => Some(refs),
            FieldValue::Scalar(_) => None,
        }
    }

    /// The scalar, if this is a scalar field.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            FieldValue::References(_) => None,
            FieldValue::Scalar(s) => Some(s),
        }
    }
}

/// A canonicalized non-reference field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Plain text (`name`, `summary`, `content`, `duration`, …).
    Text(String),
    /// A non-negative integer (`height`, `totalItems`, `startIndex`, …).
    UnsignedInt(u64),
    /// A floating-point quantity (`latitude`, `radius`, …).
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A canonicalized datetime.
    Time(Timestamp),
    /// A language-tagged text map (`nameMap`, `contentMap`, `summaryMap`).
    LanguageMap(LanguageMap),
    /// A list of token strings (`rel`).
    TextList(Vec<String>),
    /// A value the vocabulary deliberately leaves open
    /// (`closed`, `endpoints`).
    Opaque(Value),
}

impl ScalarValue {
    /// Render the canonical JSON value. Identical in both serialization
    /// modes.
    pub fn to_value(&self) -> Value {
        match self {
            ScalarValue::Text(s) => Value::String(s.clone()),
            ScalarValue::UnsignedInt(n) => Value::from(*n),
            ScalarValue::Float(f) => {
                // Wire floats are finite; Number::from_f64 only fails on
                // NaN/infinity, which the normalizer refuses to store.
                serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            ScalarValue::Boolean(b) => Value::Bool(*b),
            ScalarValue::Time(ts) => Value::String(ts.to_rfc3339()),
            ScalarValue::LanguageMap(map) => map.to_value(),
            ScalarValue::TextList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ScalarValue::Opaque(v) => v.clone(),
        }
    }
}

// ─── Language Maps ───────────────────────────────────────────────────

/// A language map key or value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageMapError {
    /// A key does not have the shape of a language tag.
    #[error("key {0:?} is not a language tag")]
    NotALanguageTag(String),
    /// A value is not a JSON string.
    #[error("value for language {0:?} is not a string")]
    NonStringValue(String),
}

/// An ordered map of language tags to translated text.
///
/// Keys must satisfy [`is_language_tag`]; values must be strings. Entry
/// order is preserved from the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguageMap(Map<String, Value>);

impl LanguageMap {
    /// Validate a wire object as a language map.
    ///
    /// # Errors
    ///
    /// Rejects keys that are not language-tag shaped and values that are
    /// not strings.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, LanguageMapError> {
        for (key, value) in map {
            if !is_language_tag(key) {
                return Err(LanguageMapError::NotALanguageTag(key.clone()));
            }
            if !value.is_string() {
                return Err(LanguageMapError::NonStringValue(key.clone()));
            }
        }
        Ok(Self(map.clone()))
    }

    /// The text for an exact language tag, if present.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).and_then(Value::as_str)
    }

    /// Iterate entries in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON object in wire order.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Whether a string has the structural shape of a BCP 47 language tag:
/// a primary subtag of 2 to 8 ASCII letters, optionally followed by
/// `-`-separated alphanumeric subtags of 1 to 8 characters.
///
/// This is a shape check, not a registry lookup: `en`, `en-US`, and
/// `zh-Hant-TW` pass; `e`, `en--US`, and `en_US` do not.
pub fn is_language_tag(s: &str) -> bool {
    let mut subtags = s.split('-');
    let primary = match subtags.next() {
        Some(p) => p,
        None => return false,
    };
    if !(2..=8).contains(&primary.len()) || !primary.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }
    subtags.all(|t| (1..=8).contains(&t.len()) && t.bytes().all(|b| b.is_ascii_alphanumeric()))
}
