use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Notion caps each rich text fragment at this many characters.
pub const RICH_TEXT_LIMIT: usize = 2000;

/// Database object as returned by `GET /databases/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichTextItem>,
    /// Property schema keyed by name, in the order Notion returned it.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Database {
    /// Human-readable name: the first title fragment, or "Unknown".
    pub fn display_name(&self) -> String {
        self.title
            .first()
            .and_then(|t| t.plain_text.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Name of the first property whose type is `title`.
    pub fn title_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, schema)| schema.get("type").and_then(Value::as_str) == Some("title"))
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RichTextItem {
    #[serde(default)]
    pub plain_text: Option<String>,
}

/// Page object; only the fields the client reports back.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePageRequest {
    pub parent: Parent,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parent {
    pub database_id: String,
}

/// Property value payloads accepted by page creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<TextObject>),
    RichText(Vec<TextObject>),
}

impl PropertyValue {
    pub fn title(content: &str) -> Self {
        PropertyValue::Title(TextObject::chunked(content))
    }

    pub fn rich_text(content: &str) -> Self {
        PropertyValue::RichText(TextObject::chunked(content))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextObject {
    pub text: TextContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextContent {
    pub content: String,
}

impl TextObject {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
            },
        }
    }

    /// Split `content` into fragments within [`RICH_TEXT_LIMIT`].
    /// Empty content still produces one (empty) fragment.
    pub fn chunked(content: &str) -> Vec<Self> {
        let chars: Vec<char> = content.chars().collect();
        if chars.is_empty() {
            return vec![Self::new("")];
        }
        chars
            .chunks(RICH_TEXT_LIMIT)
            .map(|chunk| Self::new(chunk.iter().collect::<String>()))
            .collect()
    }
}

impl CreatePageRequest {
    /// Row under `database_id` with the given properties and an empty body.
    pub fn new(database_id: impl Into<String>, properties: Vec<(String, PropertyValue)>) -> Self {
        Self {
            parent: Parent {
                database_id: database_id.into(),
            },
            properties: properties.into_iter().collect(),
            children: Vec::new(),
        }
    }
}
