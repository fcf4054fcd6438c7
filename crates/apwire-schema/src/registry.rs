//! # Type Registry — Discriminator Resolution
//!
//! Maps wire type discriminators to the [`SchemaDescriptor`] they validate
//! under. Every bundled vocabulary type routes to one of fourteen
//! descriptors; several types share a descriptor when the vocabulary gives
//! them identical validation rules (every actor type validates under the
//! actor descriptor, every plain object type under the object descriptor).
//!
//! ## Resolution Invariant
//!
//! Resolution is total. An unrecognized discriminator is not an error at
//! this layer: it resolves to the generic object descriptor, so extension
//! types validate under the base object rules and keep their extra fields
//! verbatim. Lookup is exact and case-sensitive; `note` does not resolve
//! to the `Note` rules.
//!
//! ## Thread Safety
//!
//! The bundled registry is immutable after construction and shared
//! process-wide through [`global`].

use std::collections::HashMap;
use std::sync::LazyLock;

use apwire_core::{CoreType, TypeName, TYPE_NAME_COUNT};

use crate::descriptor::SchemaDescriptor;

// Descriptor slots, in registration order.
const OBJECT: usize = 0;
const PLACE: usize = 1;
const PROFILE: usize = 2;
const RELATIONSHIP: usize = 3;
const TOMBSTONE: usize = 4;
const LINK: usize = 5;
const ACTIVITY: usize = 6;
const INTRANSITIVE: usize = 7;
const QUESTION: usize = 8;
const ACTOR: usize = 9;
const COLLECTION: usize = 10;
const ORDERED_COLLECTION: usize = 11;
const COLLECTION_PAGE: usize = 12;
const ORDERED_COLLECTION_PAGE: usize = 13;

/// The descriptor slot a vocabulary type validates under.
///
/// Specialized types route to their own descriptor; everything else
/// routes by behavioral family. `Question` must match before the
/// intransitive guard, since it is itself intransitive.
fn slot(kind: TypeName) -> usize {
    match kind {
        TypeName::Place => PLACE,
        TypeName::Profile => PROFILE,
        TypeName::Relationship => RELATIONSHIP,
        TypeName::Tombstone => TOMBSTONE,
        TypeName::Question => QUESTION,
        TypeName::Collection => COLLECTION,
        TypeName::OrderedCollection => ORDERED_COLLECTION,
        TypeName::CollectionPage => COLLECTION_PAGE,
        TypeName::OrderedCollectionPage => ORDERED_COLLECTION_PAGE,
        kind if kind.is_intransitive() => INTRANSITIVE,
        kind => match kind.core_type() {
            CoreType::Object => OBJECT,
            CoreType::Link => LINK,
            CoreType::Activity => ACTIVITY,
            CoreType::Actor => ACTOR,
            CoreType::Collection => COLLECTION,
        },
    }
}

/// An immutable table of schema descriptors indexed by wire discriminator.
#[derive(Debug)]
pub struct TypeRegistry {
    /// The fourteen descriptors, in slot order.
    descriptors: Vec<SchemaDescriptor>,
    /// Exact discriminator to descriptor slot.
    by_name: HashMap<&'static str, usize>,
    /// Slot unrecognized discriminators resolve to.
    fallback: usize,
}

impl TypeRegistry {
    /// Build the registry of bundled vocabulary descriptors.
    pub fn bundled() -> Self {
        let descriptors = vec![
            SchemaDescriptor::object(),
            SchemaDescriptor::place(),
            SchemaDescriptor::profile(),
            SchemaDescriptor::relationship(),
            SchemaDescriptor::tombstone(),
            SchemaDescriptor::link(),
            SchemaDescriptor::activity(),
            SchemaDescriptor::intransitive_activity(),
            SchemaDescriptor::question(),
            SchemaDescriptor::actor(),
            SchemaDescriptor::collection(),
            SchemaDescriptor::ordered_collection(),
            SchemaDescriptor::collection_page(),
            SchemaDescriptor::ordered_collection_page(),
        ];
        let mut by_name = HashMap::with_capacity(TYPE_NAME_COUNT);
        for &kind in TypeName::all() {
            by_name.insert(kind.as_str(), slot(kind));
        }
        Self {
            descriptors,
            by_name,
            fallback: OBJECT,
        }
    }

    /// Resolve a wire discriminator to its descriptor.
    ///
    /// Resolution is total: unrecognized discriminators resolve to the
    /// generic object descriptor.
    pub fn resolve(&self, discriminator: &str) -> &SchemaDescriptor {
        self.lookup(discriminator)
            .unwrap_or(&self.descriptors[self.fallback])
    }

    /// Look up the descriptor registered for an exact discriminator,
    /// without falling back.
    pub fn lookup(&self, discriminator: &str) -> Option<&SchemaDescriptor> {
        self.by_name
            .get(discriminator)
            .map(|&slot| &self.descriptors[slot])
    }

    /// The descriptor unrecognized discriminators resolve to.
    pub fn fallback(&self) -> &SchemaDescriptor {
        &self.descriptors[self.fallback]
    }

    /// Whether a discriminator names a bundled vocabulary type.
    pub fn recognizes(&self, discriminator: &str) -> bool {
        self.by_name.contains_key(discriminator)
    }

    /// Number of distinct descriptors.
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of registered discriminators.
    pub fn registered_count(&self) -> usize {
        self.by_name.len()
    }
}

static BUNDLED: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::bundled);

/// The process-wide bundled registry.
pub fn global() -> &'static TypeRegistry {
    &BUNDLED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vocabulary_type_is_registered() {
        let registry = TypeRegistry::bundled();
        for &kind in TypeName::all() {
            assert!(
                registry.lookup(kind.as_str()).is_some(),
                "{} is not registered",
                kind.as_str()
            );
        }
        assert_eq!(registry.registered_count(), TYPE_NAME_COUNT);
    }

    #[test]
    fn test_descriptor_count() {
        assert_eq!(TypeRegistry::bundled().descriptor_count(), 14);
    }

    #[test]
    fn test_family_routing() {
        let registry = TypeRegistry::bundled();
        let cases = [
            ("Note", "object"),
            ("Article", "object"),
            ("Video", "object"),
            ("Place", "place"),
            ("Profile", "profile"),
            ("Relationship", "relationship"),
            ("Tombstone", "tombstone"),
            ("Link", "link"),
            ("Mention", "link"),
            ("Like", "activity"),
            ("Create", "activity"),
            ("Announce", "activity"),
            ("Arrive", "intransitive-activity"),
            ("Travel", "intransitive-activity"),
            ("IntransitiveActivity", "intransitive-activity"),
            ("Question", "question"),
            ("Person", "actor"),
            ("Service", "actor"),
            ("Actor", "actor"),
            ("Collection", "collection"),
            ("OrderedCollection", "ordered-collection"),
            ("CollectionPage", "collection-page"),
            ("OrderedCollectionPage", "ordered-collection-page"),
        ];
        for (wire, descriptor) in cases {
            assert_eq!(registry.resolve(wire).name, descriptor, "{wire}");
        }
    }

    #[test]
    fn test_resolved_core_matches_vocabulary() {
        let registry = TypeRegistry::bundled();
        for &kind in TypeName::all() {
            assert_eq!(
                registry.resolve(kind.as_str()).core,
                kind.core_type(),
                "{}",
                kind.as_str()
            );
        }
    }

    #[test]
    fn test_unknown_type_falls_back_to_object() {
        let registry = TypeRegistry::bundled();
        assert!(!registry.recognizes("CustomExtension"));
        assert_eq!(registry.resolve("CustomExtension").name, "object");
        assert_eq!(registry.fallback().name, "object");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = TypeRegistry::bundled();
        assert!(registry.lookup("note").is_none());
        assert_eq!(registry.resolve("note").name, "object");
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(global(), global()));
        assert_eq!(global().registered_count(), TYPE_NAME_COUNT);
    }
}
