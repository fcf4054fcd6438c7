//! # apwire-schema — Descriptors, Registry, Normalization
//!
//! The schema layer of the wire validation engine: per-type validation
//! tables, discriminator resolution, and the reference normalizer that
//! rewrites wire shapes into the canonical model.
//!
//! ## Descriptors (`descriptor`)
//!
//! A [`SchemaDescriptor`] holds the recognized fields of one type
//! discriminator in canonical emission order, each with a shape (typed
//! references or a coerced scalar) and requiredness, plus the type's
//! cross-field invariants. Fourteen descriptors cover the bundled
//! vocabulary.
//!
//! ## Registry (`registry`)
//!
//! [`TypeRegistry`] maps all 55 bundled discriminators to their
//! descriptors. Resolution is total: unrecognized discriminators resolve
//! to the generic object descriptor so extension types validate under the
//! base rules. [`registry::global`] exposes the shared process-wide
//! registry.
//!
//! ## Normalization (`normalize`)
//!
//! [`normalize_references`] rewrites the three wire shapes of a reference
//! field (identifier string, embedded object, mixed array) into ordered
//! [`apwire_core::TypedReference`] sequences, recursing through embedded
//! payloads. [`coerce_scalar`] canonicalizes non-reference values.
//!
//! ## Crate Policy
//!
//! - Depends only on `apwire-core` internally.
//! - Descriptor field order defines canonical output key order and must
//!   not be rearranged casually.
//! - Normalization preserves element order and duplicates exactly, and
//!   short-circuits on the first offending value.

pub mod descriptor;
pub mod normalize;
pub mod registry;

pub use descriptor::{
    Cardinality, FieldRule, FieldShape, Invariant, RefTarget, ScalarKind, SchemaDescriptor,
};
pub use normalize::{
    coerce_scalar, is_mime_type, normalize_field, normalize_references, MAX_EMBED_DEPTH,
};
pub use registry::TypeRegistry;
