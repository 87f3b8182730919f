use clip_to_notion::types::notion::{
    CreatePageRequest, Database, PropertyValue, RICH_TEXT_LIMIT, TextObject,
};
use serde_json::json;

fn database(value: serde_json::Value) -> Database {
    serde_json::from_value(value).expect("bad database json")
}

#[test]
fn first_title_property_in_returned_order_wins() {
    let db = database(json!({
        "id": "db",
        "properties": {
            "Tags": { "type": "multi_select" },
            "Zeta": { "type": "title" },
            "Alpha": { "type": "title" }
        }
    }));
    assert_eq!(db.title_property(), Some("Zeta"));
}

#[test]
fn no_title_property_is_none() {
    let db = database(json!({
        "id": "db",
        "properties": { "メモ": { "type": "rich_text" } }
    }));
    assert_eq!(db.title_property(), None);
}

#[test]
fn display_name_defaults_to_unknown() {
    assert_eq!(database(json!({ "id": "db" })).display_name(), "Unknown");
    assert_eq!(
        database(json!({ "id": "db", "title": [{}] })).display_name(),
        "Unknown"
    );
    assert_eq!(
        database(json!({ "id": "db", "title": [{ "plain_text": "Inbox" }, { "plain_text": "!" }] }))
            .display_name(),
        "Inbox"
    );
}

#[test]
fn chunking_respects_fragment_limit() {
    assert_eq!(TextObject::chunked(""), vec![TextObject::new("")]);

    let exact = "x".repeat(RICH_TEXT_LIMIT);
    assert_eq!(TextObject::chunked(&exact).len(), 1);

    let over = "é".repeat(RICH_TEXT_LIMIT + 1);
    let chunks = TextObject::chunked(&over);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].text.content, "é");
}

#[test]
fn create_request_matches_notion_wire_format() {
    let request = CreatePageRequest::new(
        "db",
        vec![
            ("Name".to_string(), PropertyValue::title("2024-05-01 12:00:00")),
            ("メモ".to_string(), PropertyValue::rich_text("hello")),
        ],
    );

    assert_eq!(
        serde_json::to_value(&request).expect("encode"),
        json!({
            "parent": { "database_id": "db" },
            "properties": {
                "Name": { "title": [{ "text": { "content": "2024-05-01 12:00:00" } }] },
                "メモ": { "rich_text": [{ "text": { "content": "hello" } }] }
            },
            "children": []
        })
    );
}
