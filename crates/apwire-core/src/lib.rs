//! # apwire-core — Foundational Types for the Wire Vocabulary Engine
//!
//! This crate is the bedrock of the apwire workspace. It defines the
//! type-system primitives the validation and canonicalization layers are
//! built on. Every other crate in the workspace depends on `apwire-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One vocabulary table.** `TypeName` defines all 55 recognized type
//!    discriminators and their mapping onto the five `CoreType` behavioral
//!    families. Exhaustive `match` everywhere; adding a family forces every
//!    consumer to handle it.
//!
//! 2. **One canonical reference shape.** Heterogeneous wire fields (bare
//!    identifier strings, embedded objects, mixed arrays) all normalize to
//!    ordered sequences of `TypedReference`. The inner fields are private,
//!    so a reference cannot drift back into an unnormalized state.
//!
//! 3. **Canonical timestamps.** `Timestamp` accepts any RFC 3339 offset,
//!    stores UTC, renders with the `Z` suffix, and keeps sub-second
//!    precision across the round trip.
//!
//! 4. **Attributed errors.** Every `ValidationError` variant names the
//!    offending field, element index, or schema rule. Validation is
//!    single-pass and short-circuiting.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apwire-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`.

pub mod error;
pub mod reference;
pub mod temporal;
pub mod vocab;

// Re-export primary types for ergonomic imports.
pub use error::ValidationError;
pub use reference::{
    is_language_tag, FieldValue, LanguageMap, LanguageMapError, ScalarValue, TypedReference,
    ACTIVITY_STREAMS_CONTEXT,
};
pub use temporal::{Timestamp, TimestampParseError};
pub use vocab::{CoreType, TypeName, UnknownTypeName, CORE_TYPE_COUNT, TYPE_NAME_COUNT};
