//! Integration test: published vocabulary examples, end to end.
//!
//! These payloads are lifted from the ActivityStreams 2.0 and ActivityPub
//! documents (trimmed to the fields the engine recognizes), so they double
//! as an interoperability check: a conforming peer's documents must
//! validate, and the canonical renderings must stay within the published
//! wire shapes.

use apwire_core::{ScalarValue, TypedReference};
use apwire_model::{dispatch, SerializeMode};
use serde_json::json;

#[test]
fn test_like_normalizes_mixed_addressing_shapes() {
    let like = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Like",
        "actor": "https://example.org/profiles/joe",
        "object": "https://example.com/notes/1",
        "to": ["A", "B", "C"],
        "cc": "D",
    }))
    .expect("the Like example must validate");

    let to = like.references("to").expect("to must normalize");
    assert_eq!(to.len(), 3, "array addressing keeps its element count");
    assert_eq!(to[0].id(), Some("A"));
    assert_eq!(to[1].id(), Some("B"));
    assert_eq!(to[2].id(), Some("C"));
    assert!(
        to.iter().all(|r| r.kind() == "Object"),
        "bare identifiers default to the generic Object tag"
    );

    let cc = like.references("cc").expect("cc must normalize");
    assert_eq!(cc.len(), 1, "a bare string promotes to a one-element sequence");
    assert_eq!(cc[0].id(), Some("D"));
    assert_eq!(cc[0].kind(), "Object");
}

#[test]
fn test_like_compact_rendering() {
    let like = dispatch(&json!({
        "type": "Like",
        "actor": "https://example.org/profiles/joe",
        "object": "https://example.com/notes/1",
        "to": ["A", "B", "C"],
        "cc": "D",
    }))
    .unwrap();

    let compact = like.to_value(SerializeMode::Compact);
    assert_eq!(compact["to"], json!(["A", "B", "C"]));
    assert_eq!(
        compact["cc"],
        json!(["D"]),
        "promotion to a list survives the round trip"
    );
    assert_eq!(compact["actor"], json!(["https://example.org/profiles/joe"]));
    assert_eq!(
        compact["object"],
        json!("https://example.com/notes/1"),
        "single-cardinality fields collapse back to the bare scalar"
    );
}

#[test]
fn test_like_verbose_rendering_round_trips() {
    let like = dispatch(&json!({
        "type": "Like",
        "actor": "https://example.org/profiles/joe",
        "object": "https://example.com/notes/1",
        "to": ["A", "B", "C"],
        "cc": "D",
    }))
    .unwrap();

    let verbose = like.to_value(SerializeMode::Verbose);
    assert_eq!(
        verbose["to"][0],
        json!({
            "@context": "https://www.w3.org/ns/activitystreams",
            "type": "Object",
            "id": "A",
        }),
        "verbose mode expands every reference to its full typed shape"
    );
    assert_eq!(
        verbose["object"],
        json!({
            "@context": "https://www.w3.org/ns/activitystreams",
            "type": "Object",
            "id": "https://example.com/notes/1",
        })
    );

    assert_eq!(dispatch(&verbose).unwrap(), like);
    assert_eq!(
        dispatch(&like.to_value(SerializeMode::Compact)).unwrap(),
        like,
        "identifier-only references survive the compact round trip"
    );
}

#[test]
fn test_activitystreams_person_example() {
    let person = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Person",
        "id": "https://sally.example.org",
        "name": "Sally Smith",
    }))
    .unwrap();

    assert_eq!(person.kind(), "Person");
    assert_eq!(person.id(), Some("https://sally.example.org"));
    assert_eq!(
        person.scalar("name"),
        Some(&ScalarValue::Text("Sally Smith".to_string()))
    );
    assert_eq!(dispatch(&person.to_value(SerializeMode::Verbose)).unwrap(), person);
    assert_eq!(dispatch(&person.to_value(SerializeMode::Compact)).unwrap(), person);
}

#[test]
fn test_activitypub_actor_example() {
    let payload = json!({
        "@context": ["https://www.w3.org/ns/activitystreams", {"@language": "ja"}],
        "type": "Person",
        "id": "https://kenzoishii.example.com/",
        "preferredUsername": "kenzoishii",
        "name": "石井健蔵",
        "summary": "この方はただの例です",
        "icon": ["https://kenzoishii.example.com/image/165987aklre4"],
        "inbox": "https://kenzoishii.example.com/inbox.json",
        "outbox": "https://kenzoishii.example.com/feed.json",
        "following": "https://kenzoishii.example.com/following.json",
        "followers": "https://kenzoishii.example.com/followers.json",
        "liked": "https://kenzoishii.example.com/liked.json",
    });
    let actor = dispatch(&payload).expect("the actor example must validate");

    assert_eq!(
        actor.context(),
        &payload["@context"],
        "a custom @context is preserved verbatim, array shape included"
    );
    assert_eq!(
        actor.scalar("preferredUsername"),
        Some(&ScalarValue::Text("kenzoishii".to_string()))
    );
    assert_eq!(
        actor.scalar("name"),
        Some(&ScalarValue::Text("石井健蔵".to_string()))
    );

    let icon = &actor.references("icon").unwrap()[0];
    assert_eq!(icon.kind(), "Image", "icon identifiers promote to Image");
    assert_eq!(icon.id(), Some("https://kenzoishii.example.com/image/165987aklre4"));

    assert_eq!(actor.references("inbox").unwrap()[0].kind(), "OrderedCollection");
    assert_eq!(actor.references("outbox").unwrap()[0].kind(), "OrderedCollection");
    assert_eq!(actor.references("following").unwrap()[0].kind(), "Collection");
    assert_eq!(actor.references("liked").unwrap()[0].kind(), "Collection");

    let verbose = actor.to_value(SerializeMode::Verbose);
    assert_eq!(verbose["@context"], payload["@context"]);
    assert_eq!(dispatch(&verbose).unwrap(), actor);
}

#[test]
fn test_note_with_mention_tag() {
    let note = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Note",
        "name": "Ability to mention people",
        "content": "Hello @sally",
        "tag": [
            {"type": "Mention", "href": "http://sally.example.org", "name": "@sally"},
        ],
    }))
    .unwrap();

    let mention = &note.references("tag").unwrap()[0];
    assert_eq!(mention.kind(), "Mention");
    assert_eq!(
        mention.id(),
        Some("http://sally.example.org"),
        "Link-family identifiers are read from href"
    );
    assert_eq!(mention.props()["name"], json!("@sally"));

    let verbose = note.to_value(SerializeMode::Verbose);
    assert_eq!(verbose["tag"][0]["href"], json!("http://sally.example.org"));
    assert!(
        verbose["tag"][0].get("id").is_none(),
        "Link-family references emit their identifier under href, not id"
    );

    let compact = note.to_value(SerializeMode::Compact);
    assert_eq!(
        compact["tag"],
        json!(["http://sally.example.org"]),
        "compact mode is identifier shorthand, payload fields and all"
    );
}

#[test]
fn test_question_example() {
    let question = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Question",
        "name": "What is the answer?",
        "oneOf": [
            {"type": "Note", "name": "Option A"},
            {"type": "Note", "name": "Option B"},
        ],
        "closed": "2016-05-10T00:00:00Z",
    }))
    .unwrap();

    let options = question.references("oneOf").unwrap();
    assert_eq!(options.len(), 2);
    assert!(options.iter().all(TypedReference::is_inline));
    assert!(matches!(
        question.scalar("closed"),
        Some(ScalarValue::Opaque(_))
    ));
}

#[test]
fn test_travel_intransitive_example() {
    let travel = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "summary": "Sally went to work",
        "type": "Travel",
        "actor": {"type": "Person", "name": "Sally"},
        "target": {"type": "Place", "name": "Work"},
    }))
    .expect("an intransitive activity without an object must validate");

    assert_eq!(travel.references("actor").unwrap()[0].kind(), "Person");
    assert_eq!(travel.references("target").unwrap()[0].kind(), "Place");
    assert!(
        travel.field("object").is_none(),
        "intransitive descriptors do not declare an object field"
    );
}

#[test]
fn test_create_example() {
    let create = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "summary": "Sally created a note",
        "type": "Create",
        "actor": {"type": "Person", "name": "Sally"},
        "object": {"type": "Note", "name": "A Simple Note", "content": "This is a simple note"},
    }))
    .unwrap();

    let object = &create.references("object").unwrap()[0];
    assert_eq!(object.kind(), "Note");
    assert_eq!(object.props()["content"], json!("This is a simple note"));

    // Inline references have no identifier to collapse to, so compact
    // output keeps the full shape.
    let compact = create.to_value(SerializeMode::Compact);
    assert_eq!(compact["object"]["type"], json!("Note"));
    assert_eq!(dispatch(&compact).unwrap(), create);
}

#[test]
fn test_ordered_collection_example() {
    let collection = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "summary": "Sally's notes",
        "type": "OrderedCollection",
        "totalItems": 2,
        "orderedItems": [
            {"type": "Note", "name": "A Simple Note"},
            {"type": "Note", "name": "Another Simple Note"},
        ],
    }))
    .unwrap();

    assert_eq!(
        collection.scalar("totalItems"),
        Some(&ScalarValue::UnsignedInt(2))
    );
    let items = collection.references("orderedItems").unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.kind() == "Note"));
}

#[test]
fn test_collection_page_example() {
    let page = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "summary": "Page 1 of Sally's notes",
        "type": "CollectionPage",
        "id": "http://example.org/collection?page=1",
        "partOf": "http://example.org/collection",
        "next": "http://example.org/collection?page=2",
        "items": ["http://example.org/posts/1", "http://example.org/posts/2"],
    }))
    .unwrap();

    assert_eq!(page.references("partOf").unwrap()[0].kind(), "Collection");
    assert_eq!(page.references("next").unwrap()[0].kind(), "CollectionPage");
    assert_eq!(page.references("items").unwrap().len(), 2);
}

#[test]
fn test_place_example() {
    let place = dispatch(&json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Place",
        "name": "Fresno Area",
        "latitude": 36.75,
        "longitude": 119.7667,
        "radius": 15,
        "units": "miles",
    }))
    .unwrap();

    assert_eq!(place.scalar("latitude"), Some(&ScalarValue::Float(36.75)));
    assert_eq!(place.scalar("radius"), Some(&ScalarValue::Float(15.0)));
    assert_eq!(
        place.scalar("units"),
        Some(&ScalarValue::Text("miles".to_string()))
    );
}
