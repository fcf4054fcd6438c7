//! # apwire-model — Canonical Documents and Dispatch
//!
//! The top of the apwire workspace: the validation pipeline that turns
//! untrusted wire payloads into canonical [`Document`]s, the dual-mode
//! serializer that writes them back out, and the derived-document
//! constructors a federated exchange produces from existing content.
//!
//! ## Dispatch
//!
//! [`dispatch`] validates raw JSON, [`dispatch_str`] parses text first,
//! and [`dispatch_envelope`] accepts a pre-parsed generic [`Envelope`]
//! from callers that already routed on the discriminator. All entry
//! points run the same pipeline and produce the same [`Document`] for
//! the same payload, or its first [`ValidationError`].
//!
//! ## Serialization
//!
//! [`Document::to_value`] renders either [`SerializeMode`]: verbose
//! (every reference an expanded typed object) or compact (top-level
//! identifier-only references collapse to bare strings). Both modes
//! re-validate to a document equal to the original.
//!
//! ## Crate Policy
//!
//! - No I/O and no logging: validation is a pure function from payload
//!   to document or error, and independent calls share only the
//!   read-only registry.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//!
//! [`ValidationError`]: apwire_core::ValidationError

pub mod derive;
pub mod document;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use derive::DeriveError;
pub use document::{Document, SerializeMode};
pub use validate::{dispatch, dispatch_envelope, dispatch_str, Envelope};
