#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use clip_to_notion::api::NotionTransport;
use clip_to_notion::types::notion::{CreatePageRequest, Database, Page, PropertyValue};
use clip_to_notion::{ClipError, Config, NotionClient};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const DATABASE_ID: &str = "0123456789abcdef0123456789abcdef";
pub const API_KEY: &str = "secret_test_key";

/// Concatenated plain content of a title or rich text property.
pub fn text_of(request: &CreatePageRequest, property: &str) -> Option<String> {
    let fragments = match request.properties.get(property)? {
        PropertyValue::Title(f) | PropertyValue::RichText(f) => f,
    };
    Some(fragments.iter().map(|f| f.text.content.as_str()).collect())
}

/// A database with a `Name` title column and a `メモ` rich text column.
pub fn standard_properties() -> Value {
    json!({
        "Name": { "id": "title", "name": "Name", "type": "title", "title": {} },
        "メモ": { "id": "m%3Bq", "name": "メモ", "type": "rich_text", "rich_text": {} }
    })
}

/// Same columns minus the title.
pub fn untitled_properties() -> Value {
    json!({
        "メモ": { "id": "m%3Bq", "name": "メモ", "type": "rich_text", "rich_text": {} }
    })
}

pub struct MockState {
    pub schema_fetches: AtomicUsize,
    pub page_creates: AtomicUsize,
    pub properties: Mutex<Value>,
    pub pages: Mutex<Vec<CreatePageRequest>>,
}

/// In-process stand-in for the Notion REST API.
pub struct MockNotion {
    pub base: Url,
    pub state: Arc<MockState>,
}

impl MockNotion {
    pub async fn start(properties: Value) -> Self {
        let state = Arc::new(MockState {
            schema_fetches: AtomicUsize::new(0),
            page_creates: AtomicUsize::new(0),
            properties: Mutex::new(properties),
            pages: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/v1/databases/{id}", get(retrieve_database))
            .route("/v1/pages", post(create_page))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock listener");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        let base = Url::parse(&format!("http://{addr}/v1/")).expect("bad mock url");
        Self { base, state }
    }

    pub fn set_properties(&self, properties: Value) {
        *self.state.properties.lock().unwrap() = properties;
    }

    pub fn schema_fetches(&self) -> usize {
        self.state.schema_fetches.load(Ordering::SeqCst)
    }

    pub fn page_creates(&self) -> usize {
        self.state.page_creates.load(Ordering::SeqCst)
    }

    pub fn last_page(&self) -> Option<CreatePageRequest> {
        self.state.pages.lock().unwrap().last().cloned()
    }

    pub fn config(&self) -> Config {
        Config {
            api_key: API_KEY.to_string(),
            database_id: DATABASE_ID.to_string(),
            api_base: self.base.clone(),
            ..Config::default()
        }
    }

    pub fn client(&self) -> NotionClient {
        NotionClient::from_config(&self.config()).expect("failed to build client")
    }
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn notion_error(status: StatusCode, code: &str, message: String) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "object": "error",
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
}

fn check_headers(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {API_KEY}");
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return Err(notion_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "API token is invalid.".to_string(),
        ));
    }
    if headers.get("notion-version").is_none() {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "missing_version",
            "Notion-Version header failed validation.".to_string(),
        ));
    }
    Ok(())
}

async fn retrieve_database(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult {
    check_headers(&headers)?;
    if id != DATABASE_ID {
        return Err(notion_error(
            StatusCode::NOT_FOUND,
            "object_not_found",
            format!("Could not find database with ID: {id}."),
        ));
    }
    state.schema_fetches.fetch_add(1, Ordering::SeqCst);
    let properties = state.properties.lock().unwrap().clone();
    Ok(Json(json!({
        "object": "database",
        "id": DATABASE_ID,
        "title": [{ "type": "text", "plain_text": "Clips" }],
        "properties": properties,
    })))
}

async fn create_page(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePageRequest>,
) -> ApiResult {
    check_headers(&headers)?;
    let properties = state.properties.lock().unwrap().clone();
    for (name, value) in &request.properties {
        let expected = match value {
            PropertyValue::Title(_) => "title",
            PropertyValue::RichText(_) => "rich_text",
        };
        let actual = properties
            .get(name)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str);
        if actual != Some(expected) {
            return Err(notion_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("{name} is not a property that exists."),
            ));
        }
    }
    let n = state.page_creates.fetch_add(1, Ordering::SeqCst) + 1;
    state.pages.lock().unwrap().push(request);
    let id = format!("page-{n}");
    Ok(Json(json!({
        "object": "page",
        "id": id,
        "url": format!("https://www.notion.so/{id}"),
    })))
}

/// In-memory transport that counts remote calls.
pub struct FakeTransport {
    pub calls: AtomicUsize,
    pub database: Mutex<Database>,
    pub requests: Mutex<Vec<CreatePageRequest>>,
}

impl FakeTransport {
    pub fn new(properties: Value) -> Self {
        let database: Database = serde_json::from_value(json!({
            "id": DATABASE_ID,
            "title": [{ "plain_text": "Clips" }],
            "properties": properties,
        }))
        .expect("bad fake database");
        Self {
            calls: AtomicUsize::new(0),
            database: Mutex::new(database),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NotionTransport for FakeTransport {
    async fn retrieve_database(&self, _database_id: &str) -> Result<Database, ClipError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let database = self.database.lock().unwrap().clone();
        Ok(database)
    }

    async fn create_page(&self, request: &CreatePageRequest) -> Result<Page, ClipError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        Ok(Page {
            id: format!("fake-{n}"),
            url: format!("https://www.notion.so/fake-{n}"),
        })
    }
}
