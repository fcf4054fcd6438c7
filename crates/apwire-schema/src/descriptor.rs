//! # Schema Descriptors — Per-Type Validation Tables
//!
//! A `SchemaDescriptor` is the immutable rule set one type discriminator
//! validates under: its behavioral family, the fields it recognizes (with
//! their shapes and requiredness), and its cross-field invariants.
//!
//! Descriptor field order is load-bearing: serialization emits recognized
//! fields in descriptor declaration order, so the tables here define the
//! canonical key order of every output document. Base-family fields come
//! first, specialization fields after, mirroring the vocabulary's type
//! hierarchy.
//!
//! ## Vocabulary Reference
//!
//! <https://www.w3.org/TR/activitystreams-vocabulary/#properties>

use std::collections::HashMap;

use serde_json::{Map, Value};

use apwire_core::{CoreType, FieldValue, ValidationError};

// ─── Field Shapes ────────────────────────────────────────────────────

/// How many reference elements a field admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one element; arrays are rejected.
    One,
    /// An ordered sequence; scalars promote to a sequence of one.
    Many,
}

/// The reference policy of one field: which type tag a bare identifier
/// string promotes to, and which untyped embedded objects resolve to.
///
/// Embedded objects carrying `href` always resolve to the Link family
/// regardless of the target; the target governs everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    /// General object references (`to`, `tag`, `actor`, `items`, …).
    ObjectOrLink,
    /// Visual references with an `image/*` media-type guard
    /// (`icon`, `image`).
    ImageOrLink,
    /// Collection references with page-shape inference
    /// (`replies`, `following`, `partOf`, …).
    Collection,
    /// Strictly ordered collection references (`inbox`, `outbox`).
    OrderedCollection,
    /// Collection page references (`current`, `first`, `last`, `next`,
    /// `prev`).
    PageOrLink,
    /// Geographic references (`location`).
    Place,
    /// Single embedded objects (`object`, `source`, `describes`,
    /// `formerType`).
    PlainObject,
    /// Resource locators (`url`): bare strings promote to Link.
    Url,
}

impl RefTarget {
    /// The type tag a bare identifier string promotes to, and the tag of
    /// an untyped embedded object (before page-shape inference).
    pub fn default_tag(&self) -> &'static str {
        match self {
            RefTarget::ObjectOrLink | RefTarget::PlainObject => "Object",
            RefTarget::ImageOrLink => "Image",
            RefTarget::Collection => "Collection",
            RefTarget::OrderedCollection => "OrderedCollection",
            RefTarget::PageOrLink => "CollectionPage",
            RefTarget::Place => "Place",
            RefTarget::Url => "Link",
        }
    }
}

/// The coercion rule of one non-reference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A plain string.
    Text,
    /// An integer that must be zero or greater.
    NonNegativeInt,
    /// Any JSON number.
    Float,
    /// An RFC 3339 datetime, canonicalized to UTC.
    DateTime,
    /// A language-tag-to-string map.
    LanguageMap,
    /// A MIME type string (`type/subtype`).
    MimeType,
    /// A language tag string.
    LanguageTag,
    /// One token or a list of tokens, none containing spaces or commas.
    RelTokens,
    /// An endpoint URL string, or an endpoint object whose recognized
    /// keys carry strings.
    Endpoints,
    /// A value the vocabulary leaves open; kept verbatim.
    Opaque,
}

/// The shape of one recognized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A reference-bearing field, normalized to typed references.
    References {
        /// Promotion and recursion policy.
        target: RefTarget,
        /// Whether the field admits a sequence.
        cardinality: Cardinality,
    },
    /// A non-reference field, canonicalized by scalar coercion.
    Scalar(ScalarKind),
}

/// One recognized field: wire name, shape, requiredness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// The camelCase wire name.
    pub name: &'static str,
    /// Shape and coercion policy.
    pub shape: FieldShape,
    /// Whether validation fails when the field is absent.
    pub required: bool,
}

impl FieldRule {
    const fn refs(name: &'static str, target: RefTarget, cardinality: Cardinality) -> Self {
        Self {
            name,
            shape: FieldShape::References {
                target,
                cardinality,
            },
            required: false,
        }
    }

    const fn scalar(name: &'static str, kind: ScalarKind) -> Self {
        Self {
            name,
            shape: FieldShape::Scalar(kind),
            required: false,
        }
    }

    const fn required_scalar(name: &'static str, kind: ScalarKind) -> Self {
        Self {
            name,
            shape: FieldShape::Scalar(kind),
            required: true,
        }
    }
}

// ─── Invariants ──────────────────────────────────────────────────────

/// A cross-field rule evaluated after all fields normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// Intransitive activities must not carry `object`.
    ObjectForbidden,
    /// A Question may set `oneOf` or `anyOf`, not both.
    ExclusiveAnswerSets,
    /// Ordered collections carry `orderedItems`, never `items`.
    OrderedItemsOnly,
    /// Icon elements declaring dimensions must declare both, and equal.
    IconAspect,
}

impl Invariant {
    /// The stable rule name reported in violations.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Invariant::ObjectForbidden => "object-forbidden",
            Invariant::ExclusiveAnswerSets => "exclusive-answer-sets",
            Invariant::OrderedItemsOnly => "ordered-items-only",
            Invariant::IconAspect => "icon-aspect",
        }
    }

    /// Evaluate this invariant against the raw payload and the normalized
    /// field map.
    ///
    /// Raw-payload checks catch fields the descriptor deliberately does
    /// not declare (`object` on intransitive activities, `items` on
    /// ordered collections); a `null` value counts as unset there, the
    /// same as in normalization.
    pub fn check(
        &self,
        kind: &str,
        raw: &Map<String, Value>,
        fields: &HashMap<String, FieldValue>,
    ) -> Result<(), ValidationError> {
        let violation = |detail: String| ValidationError::InvariantViolation {
            kind: kind.to_string(),
            rule: self.rule_name().to_string(),
            detail,
        };

        match self {
            Invariant::ObjectForbidden => {
                if raw.get("object").is_some_and(|v| !v.is_null()) {
                    return Err(violation(
                        "intransitive activities do not take an object".to_string(),
                    ));
                }
            }
            Invariant::ExclusiveAnswerSets => {
                let set = |name: &str| {
                    fields
                        .get(name)
                        .and_then(FieldValue::as_references)
                        .is_some_and(|refs| !refs.is_empty())
                };
                if set("oneOf") && set("anyOf") {
                    return Err(violation("both oneOf and anyOf are set".to_string()));
                }
            }
            Invariant::OrderedItemsOnly => {
                if raw.get("items").is_some_and(|v| !v.is_null()) {
                    return Err(violation(
                        "ordered collections carry orderedItems, not items".to_string(),
                    ));
                }
            }
            Invariant::IconAspect => {
                let icons = fields
                    .get("icon")
                    .and_then(FieldValue::as_references)
                    .unwrap_or(&[]);
                for icon in icons {
                    let width = icon.props().get("width").and_then(Value::as_u64);
                    let height = icon.props().get("height").and_then(Value::as_u64);
                    match (width, height) {
                        (Some(w), Some(h)) if w != h => {
                            return Err(violation(format!(
                                "icon must be square, got {w}x{h}"
                            )));
                        }
                        (Some(_), None) | (None, Some(_)) => {
                            return Err(violation(
                                "icon must declare both width and height".to_string(),
                            ));
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }
}

// ─── Descriptors ─────────────────────────────────────────────────────

/// The immutable validation table of one type discriminator.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    /// Stable descriptor name, for diagnostics.
    pub name: &'static str,
    /// The behavioral family this descriptor validates for.
    pub core: CoreType,
    /// Recognized fields, in canonical emission order.
    pub fields: Vec<FieldRule>,
    /// Cross-field rules.
    pub invariants: Vec<Invariant>,
}

impl SchemaDescriptor {
    /// Look up a recognized field rule by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate the fields validation requires.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldRule> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// The shared field table of the Object family, in canonical order.
fn object_fields() -> Vec<FieldRule> {
    use Cardinality::{Many, One};
    use RefTarget as T;
    use ScalarKind as S;
    vec![
        FieldRule::scalar("id", S::Text),
        FieldRule::refs("attachment", T::ObjectOrLink, Many),
        FieldRule::refs("attributedTo", T::ObjectOrLink, Many),
        FieldRule::refs("audience", T::ObjectOrLink, Many),
        FieldRule::scalar("content", S::Text),
        FieldRule::scalar("contentMap", S::LanguageMap),
        FieldRule::scalar("name", S::Text),
        FieldRule::scalar("nameMap", S::LanguageMap),
        FieldRule::scalar("endTime", S::DateTime),
        FieldRule::refs("generator", T::ObjectOrLink, Many),
        FieldRule::refs("icon", T::ImageOrLink, Many),
        FieldRule::refs("image", T::ImageOrLink, Many),
        FieldRule::refs("inReplyTo", T::ObjectOrLink, Many),
        FieldRule::refs("location", T::Place, One),
        FieldRule::refs("preview", T::ObjectOrLink, Many),
        FieldRule::scalar("published", S::DateTime),
        FieldRule::refs("replies", T::Collection, One),
        FieldRule::scalar("startTime", S::DateTime),
        FieldRule::scalar("summary", S::Text),
        FieldRule::scalar("summaryMap", S::LanguageMap),
        FieldRule::refs("tag", T::ObjectOrLink, Many),
        FieldRule::scalar("updated", S::DateTime),
        FieldRule::refs("url", T::Url, Many),
        FieldRule::refs("to", T::ObjectOrLink, Many),
        FieldRule::refs("bto", T::ObjectOrLink, Many),
        FieldRule::refs("cc", T::ObjectOrLink, Many),
        FieldRule::refs("bcc", T::ObjectOrLink, Many),
        FieldRule::scalar("mediaType", S::MimeType),
        // TODO: validate the xsd:duration lexical form.
        FieldRule::scalar("duration", S::Text),
        FieldRule::refs("source", T::PlainObject, One),
    ]
}

/// The shared field table of the Activity family: object fields plus the
/// activity properties.
fn activity_fields() -> Vec<FieldRule> {
    use Cardinality::{Many, One};
    use RefTarget as T;
    let mut fields = object_fields();
    fields.extend([
        FieldRule::refs("actor", T::ObjectOrLink, Many),
        FieldRule::refs("object", T::PlainObject, One),
        FieldRule::refs("target", T::ObjectOrLink, Many),
        FieldRule::refs("result", T::ObjectOrLink, Many),
        FieldRule::refs("origin", T::ObjectOrLink, Many),
        FieldRule::refs("instrument", T::ObjectOrLink, Many),
    ]);
    fields
}

/// Activity fields minus `object`, which intransitive activities forbid.
fn intransitive_fields() -> Vec<FieldRule> {
    activity_fields()
        .into_iter()
        .filter(|f| f.name != "object")
        .collect()
}

/// The shared field table of the Collection family.
fn collection_fields() -> Vec<FieldRule> {
    use Cardinality::{Many, One};
    use RefTarget as T;
    use ScalarKind as S;
    let mut fields = object_fields();
    fields.extend([
        FieldRule::scalar("totalItems", S::NonNegativeInt),
        FieldRule::refs("current", T::PageOrLink, One),
        FieldRule::refs("first", T::PageOrLink, One),
        FieldRule::refs("last", T::PageOrLink, One),
        FieldRule::refs("items", T::ObjectOrLink, Many),
    ]);
    fields
}

impl SchemaDescriptor {
    /// The base Object descriptor, also the fallback for unrecognized
    /// discriminators.
    pub fn object() -> Self {
        Self {
            name: "object",
            core: CoreType::Object,
            fields: object_fields(),
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Place: object fields plus geographic properties.
    pub fn place() -> Self {
        use ScalarKind as S;
        let mut fields = object_fields();
        fields.extend([
            FieldRule::scalar("accuracy", S::Float),
            FieldRule::scalar("altitude", S::Float),
            FieldRule::scalar("longitude", S::Float),
            FieldRule::scalar("latitude", S::Float),
            FieldRule::scalar("radius", S::Float),
            FieldRule::scalar("units", S::Text),
        ]);
        Self {
            name: "place",
            core: CoreType::Object,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Profile: object fields plus `describes`.
    pub fn profile() -> Self {
        let mut fields = object_fields();
        fields.push(FieldRule::refs(
            "describes",
            RefTarget::PlainObject,
            Cardinality::One,
        ));
        Self {
            name: "profile",
            core: CoreType::Object,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Relationship: object fields plus the subject/object/relationship
    /// triple.
    pub fn relationship() -> Self {
        use Cardinality::Many;
        use RefTarget as T;
        let mut fields = object_fields();
        fields.extend([
            FieldRule::refs("subject", T::ObjectOrLink, Many),
            FieldRule::refs("object", T::ObjectOrLink, Many),
            FieldRule::refs("relationship", T::ObjectOrLink, Many),
        ]);
        Self {
            name: "relationship",
            core: CoreType::Object,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Tombstone: object fields plus `formerType` and `deleted`.
    pub fn tombstone() -> Self {
        let mut fields = object_fields();
        fields.extend([
            FieldRule::refs("formerType", RefTarget::PlainObject, Cardinality::One),
            FieldRule::scalar("deleted", ScalarKind::DateTime),
        ]);
        Self {
            name: "tombstone",
            core: CoreType::Object,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Link: the only descriptor with a required field (`href`).
    pub fn link() -> Self {
        use ScalarKind as S;
        Self {
            name: "link",
            core: CoreType::Link,
            fields: vec![
                FieldRule::required_scalar("href", S::Text),
                FieldRule::scalar("rel", S::RelTokens),
                FieldRule::scalar("mediaType", S::MimeType),
                FieldRule::scalar("name", S::Text),
                FieldRule::scalar("nameMap", S::LanguageMap),
                FieldRule::scalar("hreflang", S::LanguageTag),
                FieldRule::scalar("height", S::NonNegativeInt),
                FieldRule::scalar("width", S::NonNegativeInt),
                FieldRule::refs("preview", RefTarget::ObjectOrLink, Cardinality::Many),
            ],
            invariants: Vec::new(),
        }
    }

    /// Transitive activity descriptor.
    pub fn activity() -> Self {
        Self {
            name: "activity",
            core: CoreType::Activity,
            fields: activity_fields(),
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Intransitive activity descriptor: no `object`, by rule.
    pub fn intransitive_activity() -> Self {
        Self {
            name: "intransitive-activity",
            core: CoreType::Activity,
            fields: intransitive_fields(),
            invariants: vec![Invariant::IconAspect, Invariant::ObjectForbidden],
        }
    }

    /// Question: intransitive activity plus answer sets.
    pub fn question() -> Self {
        use Cardinality::Many;
        use RefTarget as T;
        use ScalarKind as S;
        let mut fields = intransitive_fields();
        fields.extend([
            FieldRule::refs("oneOf", T::ObjectOrLink, Many),
            FieldRule::refs("anyOf", T::ObjectOrLink, Many),
            FieldRule::scalar("closed", S::Opaque),
            FieldRule::scalar("votersCount", S::NonNegativeInt),
        ]);
        Self {
            name: "question",
            core: CoreType::Activity,
            fields,
            invariants: vec![
                Invariant::IconAspect,
                Invariant::ObjectForbidden,
                Invariant::ExclusiveAnswerSets,
            ],
        }
    }

    /// Actor: object fields plus the actor endpoints and collections.
    pub fn actor() -> Self {
        use Cardinality::{Many, One};
        use RefTarget as T;
        use ScalarKind as S;
        let mut fields = object_fields();
        fields.extend([
            FieldRule::scalar("preferredUsername", S::Text),
            FieldRule::refs("inbox", T::OrderedCollection, One),
            FieldRule::refs("outbox", T::OrderedCollection, One),
            FieldRule::refs("following", T::Collection, One),
            FieldRule::refs("followers", T::Collection, One),
            FieldRule::refs("liked", T::Collection, One),
            FieldRule::refs("streams", T::Collection, Many),
            FieldRule::scalar("endpoints", S::Endpoints),
        ]);
        Self {
            name: "actor",
            core: CoreType::Actor,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Unordered collection descriptor.
    pub fn collection() -> Self {
        Self {
            name: "collection",
            core: CoreType::Collection,
            fields: collection_fields(),
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Ordered collection: `orderedItems` replaces `items`.
    pub fn ordered_collection() -> Self {
        let mut fields: Vec<FieldRule> = collection_fields()
            .into_iter()
            .filter(|f| f.name != "items")
            .collect();
        fields.push(FieldRule::refs(
            "orderedItems",
            RefTarget::ObjectOrLink,
            Cardinality::Many,
        ));
        Self {
            name: "ordered-collection",
            core: CoreType::Collection,
            fields,
            invariants: vec![Invariant::IconAspect, Invariant::OrderedItemsOnly],
        }
    }

    /// Collection page: collection fields plus page links.
    pub fn collection_page() -> Self {
        use Cardinality::One;
        use RefTarget as T;
        let mut fields = collection_fields();
        fields.extend([
            FieldRule::refs("partOf", T::Collection, One),
            FieldRule::refs("next", T::PageOrLink, One),
            FieldRule::refs("prev", T::PageOrLink, One),
        ]);
        Self {
            name: "collection-page",
            core: CoreType::Collection,
            fields,
            invariants: vec![Invariant::IconAspect],
        }
    }

    /// Ordered collection page: page fields with `orderedItems` and
    /// `startIndex`.
    pub fn ordered_collection_page() -> Self {
        use Cardinality::{Many, One};
        use RefTarget as T;
        let mut fields: Vec<FieldRule> = collection_fields()
            .into_iter()
            .filter(|f| f.name != "items")
            .collect();
        fields.extend([
            FieldRule::refs("partOf", T::Collection, One),
            FieldRule::refs("next", T::PageOrLink, One),
            FieldRule::refs("prev", T::PageOrLink, One),
            FieldRule::scalar("startIndex", ScalarKind::NonNegativeInt),
            FieldRule::refs("orderedItems", T::ObjectOrLink, Many),
        ]);
        Self {
            name: "ordered-collection-page",
            core: CoreType::Collection,
            fields,
            invariants: vec![Invariant::IconAspect, Invariant::OrderedItemsOnly],
        }
    }
}
