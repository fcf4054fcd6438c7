//! # Canonical Documents — The Validated Model
//!
//! A `Document` is the output of validation: the resolved type
//! discriminator, the preserved context, every recognized field in
//! canonical form, and the unrecognized fields verbatim. Documents are
//! immutable apart from the addressing scrub; the only way to build one
//! is through validation, so holding a `Document` means the payload
//! passed.
//!
//! ## Emission Contract
//!
//! Both serialization modes emit the same key order: `@context`, `type`,
//! then the recognized fields in descriptor declaration order, then
//! unrecognized fields in wire order. Scalars render identically in both
//! modes. Reference fields render fully expanded in verbose mode; compact
//! mode collapses each top-level reference to its identifier string, and
//! only at the top level — payloads embedded inside a reference stay
//! verbose. Inline references (no identifier) never collapse.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use apwire_core::{
    CoreType, FieldValue, ScalarValue, TypeName, TypedReference, ValidationError,
};
use apwire_schema::{registry, Cardinality, FieldShape, SchemaDescriptor};

use crate::validate;

// ─── Serialization Modes ─────────────────────────────────────────────

/// How reference fields render at the top level of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializeMode {
    /// Every reference renders as its full typed shape.
    #[default]
    Verbose,
    /// Top-level references collapse to bare identifier strings where an
    /// identifier exists.
    Compact,
}

// ─── Documents ───────────────────────────────────────────────────────

/// A validated, canonicalized payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The wire discriminator, verbatim. Extension tags are kept.
    kind: String,
    /// The `@context` value, verbatim, or the injected default.
    context: Value,
    /// Recognized fields in canonical form.
    fields: HashMap<String, FieldValue>,
    /// Unrecognized fields, verbatim, in wire order.
    extra: Map<String, Value>,
}

impl Document {
    pub(crate) fn from_parts(
        kind: String,
        context: Value,
        fields: HashMap<String, FieldValue>,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            kind,
            context,
            fields,
            extra,
        }
    }

    /// Validate a raw JSON payload into a document.
    ///
    /// Equivalent to [`validate::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] the payload provokes.
    pub fn from_value(payload: &Value) -> Result<Self, ValidationError> {
        validate::dispatch(payload)
    }

    /// The type discriminator.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The behavioral family of the discriminator. Extension tags fall in
    /// the Object family, matching how they validate.
    pub fn core(&self) -> CoreType {
        TypeName::from_wire(&self.kind).map_or(CoreType::Object, |t| t.core_type())
    }

    /// The descriptor this document validated under.
    pub fn descriptor(&self) -> &'static SchemaDescriptor {
        registry::global().resolve(&self.kind)
    }

    /// The `@context` value.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// The document's identifier: `href` for Link-family documents, `id`
    /// otherwise.
    pub fn id(&self) -> Option<&str> {
        match self.scalar(TypedReference::identifier_key_for(&self.kind)) {
            Some(ScalarValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// A recognized field's canonical value.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// A recognized reference field's element sequence.
    pub fn references(&self, name: &str) -> Option<&[TypedReference]> {
        self.fields.get(name).and_then(FieldValue::as_references)
    }

    /// A recognized scalar field's canonical value.
    pub fn scalar(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.get(name).and_then(FieldValue::as_scalar)
    }

    /// Unrecognized fields, verbatim, in wire order.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// True when the document carries nothing beyond its type and context.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extra.is_empty()
    }

    /// Display text for a field, honoring its language map.
    ///
    /// Tries `<field>Map` against each language tag in caller order, then
    /// falls back to the plain field.
    pub fn preferred_text(&self, field: &str, languages: &[&str]) -> Option<&str> {
        if let Some(ScalarValue::LanguageMap(map)) = self.scalar(&format!("{field}Map")) {
            for lang in languages {
                if let Some(text) = map.get(lang) {
                    return Some(text);
                }
            }
        }
        match self.scalar(field) {
            Some(ScalarValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Remove the document's own private addressing (`bto`, `bcc`) ahead
    /// of public serving. Idempotent. Addressing inside embedded payloads
    /// belongs to the referenced content and is untouched.
    pub fn strip_private_addressing(&mut self) {
        self.fields.remove("bto");
        self.fields.remove("bcc");
        self.extra.remove("bto");
        self.extra.remove("bcc");
    }

    /// Render the document as a JSON value in the given mode.
    pub fn to_value(&self, mode: SerializeMode) -> Value {
        let mut out = Map::new();
        out.insert("@context".to_string(), self.context.clone());
        out.insert("type".to_string(), Value::String(self.kind.clone()));
        for rule in &self.descriptor().fields {
            if let Some(value) = self.fields.get(rule.name) {
                out.insert(rule.name.to_string(), render_field(value, rule.shape, mode));
            }
        }
        for (key, value) in &self.extra {
            out.insert(key.clone(), value.clone());
        }
        Value::Object(out)
    }

    /// Render the document as pretty-printed JSON text in the given mode.
    pub fn to_json(&self, mode: SerializeMode) -> String {
        // Serializing an in-memory value tree does not fail: keys are
        // strings and numbers are finite.
        serde_json::to_string_pretty(&self.to_value(mode)).unwrap_or_default()
    }
}

// Wire representation is the verbose shape, matching `TypedReference`.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value(SerializeMode::Verbose).serialize(serializer)
    }
}

fn render_field(value: &FieldValue, shape: FieldShape, mode: SerializeMode) -> Value {
    match value {
        FieldValue::Scalar(scalar) => scalar.to_value(),
        FieldValue::References(refs) => {
            let element = |r: &TypedReference| match mode {
                SerializeMode::Verbose => r.to_verbose_value(),
                SerializeMode::Compact => r.to_compact_value(),
            };
            let cardinality = match shape {
                FieldShape::References { cardinality, .. } => cardinality,
                FieldShape::Scalar(_) => Cardinality::Many,
            };
            match cardinality {
                Cardinality::One => refs.first().map_or(Value::Null, element),
                Cardinality::Many => Value::Array(refs.iter().map(element).collect()),
            }
        }
    }
}
