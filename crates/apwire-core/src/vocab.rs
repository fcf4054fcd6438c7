//! # Type Vocabulary — Single Source of Truth
//!
//! Defines the `TypeName` enum with all 55 recognized ActivityStreams 2.0
//! type discriminators and the `CoreType` enum with the five behavioral
//! families they dispatch to. This is the ONE definition used across the
//! engine. Every `match` on `CoreType` must be exhaustive — adding a family
//! forces every consumer to handle it at compile time.
//!
//! Unrecognized discriminators are deliberately absent from `TypeName`:
//! they resolve through the registry's generic-object fallback and round-trip
//! verbatim, so extension vocabularies survive validation.
//!
//! ## Vocabulary Reference
//!
//! <https://www.w3.org/TR/activitystreams-vocabulary/>

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The five behavioral families of the ActivityStreams vocabulary.
///
/// Every recognized type name maps to exactly one family. The family
/// selects the schema descriptor lineage: which fields are recognized,
/// which are required, and which cross-field invariants apply.
///
/// | Family | Types |
/// |--------|-------|
/// | Object | Object, Article, Audio, Document, Event, Image, Note, Page, Place, Profile, Relationship, Tombstone, Video |
/// | Link | Link, Mention |
/// | Activity | Activity and 25 transitive subtypes; IntransitiveActivity, Arrive, Question, Travel |
/// | Actor | Actor, Application, Group, Organization, Person, Service |
/// | Collection | Collection, OrderedCollection, CollectionPage, OrderedCollectionPage |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreType {
    /// The base Object family, and the fallback for unrecognized types.
    Object,
    /// Qualified references to other resources (`href`-bearing).
    Link,
    /// Actions that have occurred or are occurring.
    Activity,
    /// Entities capable of performing activities.
    Actor,
    /// Ordered or unordered sets of objects and links.
    Collection,
}

/// Total number of behavioral families. Used for compile-time assertions.
pub const CORE_TYPE_COUNT: usize = 5;

impl CoreType {
    /// Returns all five families in canonical order.
    pub fn all() -> &'static [CoreType] {
        &[
            Self::Object,
            Self::Link,
            Self::Activity,
            Self::Actor,
            Self::Collection,
        ]
    }

    /// Returns the wire-format string identifier for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Link => "Link",
            Self::Activity => "Activity",
            Self::Actor => "Actor",
            Self::Collection => "Collection",
        }
    }
}

impl std::fmt::Display for CoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreType {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Object" => Ok(Self::Object),
            "Link" => Ok(Self::Link),
            "Activity" => Ok(Self::Activity),
            "Actor" => Ok(Self::Actor),
            "Collection" => Ok(Self::Collection),
            other => Err(UnknownTypeName(other.to_string())),
        }
    }
}

/// A string was not a recognized vocabulary type name.
///
/// This is NOT a validation failure: unrecognized discriminators are legal
/// on the wire and fall back to generic object handling. The error exists
/// for callers that require an exact vocabulary match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized type name: {0:?}")]
pub struct UnknownTypeName(pub String);

/// All 55 recognized ActivityStreams type discriminators.
///
/// Variant names equal the wire-format strings, so the plain serde derive
/// produces exactly the JSON `type` values. Canonical order is alphabetical,
/// matching the published vocabulary's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    /// Acceptance of the object.
    Accept,
    /// The base activity type.
    Activity,
    /// The base actor type.
    Actor,
    /// Addition of the object to a target.
    Add,
    /// A public announcement of the object.
    Announce,
    /// A software application actor.
    Application,
    /// An intransitive arrival at a location.
    Arrive,
    /// A multi-paragraph written work.
    Article,
    /// An audio document.
    Audio,
    /// Blocking of the object actor.
    Block,
    /// An unordered set of objects or links.
    Collection,
    /// A single page of a collection.
    CollectionPage,
    /// Creation of the object.
    Create,
    /// Deletion of the object.
    Delete,
    /// A dislike of the object.
    Dislike,
    /// The base document type.
    Document,
    /// An occurrence happening at a time and place.
    Event,
    /// Flagging of the object for moderation.
    Flag,
    /// A follow request for the object.
    Follow,
    /// A group actor.
    Group,
    /// Intent to ignore the object.
    Ignore,
    /// An image document.
    Image,
    /// The base intransitive activity type.
    IntransitiveActivity,
    /// An invitation of the object to a target.
    Invite,
    /// Joining of the object group.
    Join,
    /// Leaving of the object group.
    Leave,
    /// A like of the object.
    Like,
    /// The base qualified reference type.
    Link,
    /// Listening to the object.
    Listen,
    /// An @-mention link.
    Mention,
    /// Movement of the object from origin to target.
    Move,
    /// A short written note.
    Note,
    /// The base object type, and the fallback descriptor for extensions.
    Object,
    /// An offer of the object to a target.
    Offer,
    /// A strictly ordered set of objects or links.
    OrderedCollection,
    /// A single page of an ordered collection.
    OrderedCollectionPage,
    /// An organization actor.
    Organization,
    /// A web page.
    Page,
    /// An individual person actor.
    Person,
    /// A physical or logical location.
    Place,
    /// A descriptive profile of another object.
    Profile,
    /// An intransitive question.
    Question,
    /// Reading of the object.
    Read,
    /// Rejection of the object.
    Reject,
    /// A relationship between two objects.
    Relationship,
    /// Removal of the object from a target.
    Remove,
    /// A service actor.
    Service,
    /// Tentative acceptance of the object.
    TentativeAccept,
    /// Tentative rejection of the object.
    TentativeReject,
    /// A deleted object placeholder.
    Tombstone,
    /// An intransitive journey between locations.
    Travel,
    /// Undoing of the object activity.
    Undo,
    /// An update to the object.
    Update,
    /// A video document.
    Video,
    /// Viewing of the object.
    View,
}

/// Total number of recognized type names. Used for compile-time assertions.
pub const TYPE_NAME_COUNT: usize = 55;

impl TypeName {
    /// Returns all 55 recognized type names in canonical order.
    pub fn all() -> &'static [TypeName] {
        &[
            Self::Accept,
            Self::Activity,
            Self::Actor,
            Self::Add,
            Self::Announce,
            Self::Application,
            Self::Arrive,
            Self::Article,
            Self::Audio,
            Self::Block,
            Self::Collection,
            Self::CollectionPage,
            Self::Create,
            Self::Delete,
            Self::Dislike,
            Self::Document,
            Self::Event,
            Self::Flag,
            Self::Follow,
            Self::Group,
            Self::Ignore,
            Self::Image,
            Self::IntransitiveActivity,
            Self::Invite,
            Self::Join,
            Self::Leave,
            Self::Like,
            Self::Link,
            Self::Listen,
            Self::Mention,
            Self::Move,
            Self::Note,
            Self::Object,
            Self::Offer,
            Self::OrderedCollection,
            Self::OrderedCollectionPage,
            Self::Organization,
            Self::Page,
            Self::Person,
            Self::Place,
            Self::Profile,
            Self::Question,
            Self::Read,
            Self::Reject,
            Self::Relationship,
            Self::Remove,
            Self::Service,
            Self::TentativeAccept,
            Self::TentativeReject,
            Self::Tombstone,
            Self::Travel,
            Self::Undo,
            Self::Update,
            Self::Video,
            Self::View,
        ]
    }

    /// Returns the wire-format string for this type name.
    ///
    /// This must match the serde serialization format and the `type` values
    /// conforming peers put on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "Accept",
            Self::Activity => "Activity",
            Self::Actor => "Actor",
            Self::Add => "Add",
            Self::Announce => "Announce",
            Self::Application => "Application",
            Self::Arrive => "Arrive",
            Self::Article => "Article",
            Self::Audio => "Audio",
            Self::Block => "Block",
            Self::Collection => "Collection",
            Self::CollectionPage => "CollectionPage",
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Dislike => "Dislike",
            Self::Document => "Document",
            Self::Event => "Event",
            Self::Flag => "Flag",
            Self::Follow => "Follow",
            Self::Group => "Group",
            Self::Ignore => "Ignore",
            Self::Image => "Image",
            Self::IntransitiveActivity => "IntransitiveActivity",
            Self::Invite => "Invite",
            Self::Join => "Join",
            Self::Leave => "Leave",
            Self::Like => "Like",
            Self::Link => "Link",
            Self::Listen => "Listen",
            Self::Mention => "Mention",
            Self::Move => "Move",
            Self::Note => "Note",
            Self::Object => "Object",
            Self::Offer => "Offer",
            Self::OrderedCollection => "OrderedCollection",
            Self::OrderedCollectionPage => "OrderedCollectionPage",
            Self::Organization => "Organization",
            Self::Page => "Page",
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Profile => "Profile",
            Self::Question => "Question",
            Self::Read => "Read",
            Self::Reject => "Reject",
            Self::Relationship => "Relationship",
            Self::Remove => "Remove",
            Self::Service => "Service",
            Self::TentativeAccept => "TentativeAccept",
            Self::TentativeReject => "TentativeReject",
            Self::Tombstone => "Tombstone",
            Self::Travel => "Travel",
            Self::Undo => "Undo",
            Self::Update => "Update",
            Self::Video => "Video",
            Self::View => "View",
        }
    }

    /// Look up a wire-format string, returning `None` for unrecognized names.
    ///
    /// Lookup is case-sensitive: the vocabulary defines `"Like"`, and
    /// `"like"` is an extension term that falls back to generic handling.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::all().iter().find(|t| t.as_str() == s).copied()
    }

    /// Returns the behavioral family this type dispatches to.
    pub fn core_type(&self) -> CoreType {
        match self {
            Self::Object
            | Self::Article
            | Self::Audio
            | Self::Document
            | Self::Event
            | Self::Image
            | Self::Note
            | Self::Page
            | Self::Place
            | Self::Profile
            | Self::Relationship
            | Self::Tombstone
            | Self::Video => CoreType::Object,

            Self::Link | Self::Mention => CoreType::Link,

            Self::Accept
            | Self::Activity
            | Self::Add
            | Self::Announce
            | Self::Arrive
            | Self::Block
            | Self::Create
            | Self::Delete
            | Self::Dislike
            | Self::Flag
            | Self::Follow
            | Self::Ignore
            | Self::IntransitiveActivity
            | Self::Invite
            | Self::Join
            | Self::Leave
            | Self::Like
            | Self::Listen
            | Self::Move
            | Self::Offer
            | Self::Question
            | Self::Read
            | Self::Reject
            | Self::Remove
            | Self::TentativeAccept
            | Self::TentativeReject
            | Self::Travel
            | Self::Undo
            | Self::Update
            | Self::View => CoreType::Activity,

            Self::Actor
            | Self::Application
            | Self::Group
            | Self::Organization
            | Self::Person
            | Self::Service => CoreType::Actor,

            Self::Collection
            | Self::CollectionPage
            | Self::OrderedCollection
            | Self::OrderedCollectionPage => CoreType::Collection,
        }
    }

    /// Whether this is an intransitive activity type (no `object` allowed).
    pub fn is_intransitive(&self) -> bool {
        matches!(
            self,
            Self::IntransitiveActivity | Self::Arrive | Self::Question | Self::Travel
        )
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeName {
    type Err = UnknownTypeName;

    /// Parse a type name from its wire-format string.
    ///
    /// Accepts the same strings produced by [`TypeName::as_str()`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| UnknownTypeName(s.to_string()))
    }
}
