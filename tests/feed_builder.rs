mod common;

use crate::common::*;
use serde_json::json;
use yammer_feed::libs::core::feed_builder::build;
use yammer_feed::libs::models::{FeedEnvelope, FeedError};

#[test]
fn test_alice_and_bob_scenario() {
    let envelope = alice_and_bob_feed();
    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records.len(), 2);

    assert_eq!(records[0].message_id, 11);
    assert_eq!(records[0].sender_display_name, "Bob");
    assert_eq!(records[0].reply_context_display_name.as_deref(), Some("Alice"));
    assert_eq!(records[0].body_plain, "hey");

    assert_eq!(records[1].message_id, 10);
    assert_eq!(records[1].sender_display_name, "Alice");
    assert_eq!(records[1].reply_context_display_name, None);
    assert_eq!(records[1].body_plain, "hi");
}

#[test]
fn test_time_label_and_client_type() {
    let envelope = alice_and_bob_feed();
    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records[0].relative_time_label, "5 minutes ago");
    assert_eq!(records[0].client_type, "Web");
}

#[test]
fn test_order_and_length_preserved() {
    let ids = [42, 7, 19, 3, 88, 5];
    let messages = ids.iter().map(|id| message(*id, 1, None, "text")).collect();
    let envelope = feed(messages, vec![user(1, "Alice")]);

    let records = build(&envelope.messages, &envelope.references, &now());

    let built: Vec<u64> = records.iter().map(|record| record.message_id).collect();
    assert_eq!(built, ids);
}

#[test]
fn test_reply_target_outside_batch_is_omitted() {
    let envelope = feed(
        vec![message(20, 2, Some(999), "replying to something older")],
        vec![user(1, "Alice"), user(2, "Bob")],
    );

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records[0].sender_display_name, "Bob");
    assert_eq!(records[0].reply_context_display_name, None);
}

#[test]
fn test_unknown_sender_has_empty_name() {
    let envelope = feed(vec![message(30, 77, None, "who am I")], vec![user(1, "Alice")]);

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records[0].sender_display_name, "");
}

#[test]
fn test_reply_to_unknown_sender_has_empty_context() {
    let envelope = feed(
        vec![message(31, 1, Some(30), "answer"), message(30, 77, None, "question")],
        vec![user(1, "Alice")],
    );

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records[0].reply_context_display_name.as_deref(), Some(""));
}

#[test]
fn test_duplicate_message_id_last_wins_for_replies() {
    let envelope = feed(
        vec![
            message(6, 1, Some(5), "reply"),
            message(5, 1, None, "first copy"),
            message(5, 2, None, "second copy"),
        ],
        vec![user(1, "Alice"), user(2, "Bob")],
    );

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].reply_context_display_name.as_deref(), Some("Bob"));
}

#[test]
fn test_non_user_references_are_ignored() {
    let group = json!({ "type": "group", "id": 2, "full_name": "Engineering" });
    let thread = json!({ "type": "thread", "id": 40 });
    let envelope = feed(
        vec![message(40, 2, None, "hello group")],
        vec![user(2, "Bob"), group, thread],
    );

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(envelope.references.len(), 3);
    assert_eq!(records[0].sender_display_name, "Bob");
}

#[test]
fn test_multiline_body_is_indented() {
    let envelope = feed(vec![message(50, 1, None, "line one\nline two")], vec![user(1, "Alice")]);

    let records = build(&envelope.messages, &envelope.references, &now());

    assert_eq!(records[0].body_plain, "line one\n\tline two");
}

#[test]
fn test_missing_sender_id_is_malformed() {
    let mut bad = message(60, 1, None, "text");
    bad.as_object_mut().unwrap().remove("sender_id");

    let result = FeedEnvelope::from_json(&feed_json(vec![bad], vec![]));

    assert!(matches!(
        result,
        Err(FeedError::MissingField { record: "message", field: "sender_id" })
    ));
}

#[test]
fn test_missing_plain_body_is_malformed() {
    let mut bad = message(61, 1, None, "text");
    bad["body"] = json!({ "parsed": "text" });

    let result = FeedEnvelope::from_json(&feed_json(vec![bad], vec![]));

    assert!(matches!(
        result,
        Err(FeedError::MissingField { record: "message", field: "body.plain" })
    ));
}

#[test]
fn test_user_without_name_is_malformed() {
    let bad_user = json!({ "type": "user", "id": 1, "mugshot_url": "https://example.com/1.png" });

    let result = FeedEnvelope::from_json(&feed_json(vec![], vec![bad_user]));

    assert!(matches!(
        result,
        Err(FeedError::MissingField { record: "user", field: "full_name" })
    ));
}

#[test]
fn test_missing_messages_key_is_malformed() {
    let result = FeedEnvelope::from_json(r#"{ "references": [] }"#);

    assert!(matches!(
        result,
        Err(FeedError::MissingField { record: "feed", field: "messages" })
    ));
}

#[test]
fn test_bad_timestamp_is_malformed() {
    let mut bad = message(62, 1, None, "text");
    bad["created_at"] = json!("last tuesday");

    let result = FeedEnvelope::from_json(&feed_json(vec![bad], vec![]));

    assert!(matches!(result, Err(FeedError::InvalidTimestamp { .. })));
}

#[test]
fn test_invalid_json() {
    let result = FeedEnvelope::from_json("{ not json");

    assert!(matches!(result, Err(FeedError::Json(_))));
}

#[test]
fn test_error_message_names_field() {
    let error = FeedError::MissingField {
        record: "message",
        field: "client_type",
    };

    assert_eq!(error.to_string(), "Malformed feed: message is missing `client_type`");
}
