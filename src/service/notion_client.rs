use crate::api::{NotionApi, NotionTransport};
use crate::config::{Config, Credentials, DEFAULT_MEMO_PROPERTY};
use crate::error::ClipError;
use crate::types::notion::{CreatePageRequest, PropertyValue};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Format of the timestamp written to the title column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub database_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPage {
    pub page_id: String,
    pub url: String,
}

/// Creates one database row per saved snippet.
///
/// The database's title column is looked up on the first `create_page` and
/// remembered for the lifetime of the client. A failed lookup leaves nothing
/// cached, so the next call looks again.
pub struct NotionClient<T = NotionApi> {
    transport: T,
    database_id: String,
    memo_property: String,
    title_property: RwLock<Option<String>>,
}

impl NotionClient<NotionApi> {
    /// Validates credentials before the HTTP client is even built.
    pub fn from_config(config: &Config) -> Result<Self, ClipError> {
        let credentials = config.credentials()?;
        let transport =
            NotionApi::new(&credentials, config.api_base.clone(), config.proxy.as_ref())?;
        Ok(Self::new(transport, &credentials).with_memo_property(&config.memo_property))
    }
}

impl<T: NotionTransport> NotionClient<T> {
    pub fn new(transport: T, credentials: &Credentials) -> Self {
        Self {
            transport,
            database_id: credentials.database_id().to_string(),
            memo_property: DEFAULT_MEMO_PROPERTY.to_string(),
            title_property: RwLock::new(None),
        }
    }

    /// Target a differently named rich text column. Blank names are ignored.
    pub fn with_memo_property(mut self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        if name.is_empty() {
            warn!("blank memo property name, keeping {}", self.memo_property);
        } else {
            self.memo_property = name.to_string();
        }
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn memo_property(&self) -> &str {
        &self.memo_property
    }

    /// Cached title column name, if discovery has succeeded.
    pub fn title_property(&self) -> Option<String> {
        self.title_property
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the database once and report its name.
    pub async fn test_connection(&self) -> Result<ConnectionInfo, ClipError> {
        let database = self.transport.retrieve_database(&self.database_id).await?;
        let database_name = database.display_name();
        info!(database = %database_name, "Notion connection ok");
        Ok(ConnectionInfo { database_name })
    }

    /// Save `content` as a new row.
    ///
    /// The title column is always stamped with the current local time;
    /// `title` is accepted for interface compatibility and not stored.
    pub async fn create_page(&self, title: &str, content: &str) -> Result<CreatedPage, ClipError> {
        let title_property = self.resolve_title_property().await?;
        if title_property == self.memo_property {
            warn!(property = %title_property, "memo property collides with title property");
            return Err(ClipError::MemoIsTitleProperty(title_property));
        }
        let stamp = timestamp_now();
        debug!(requested_title = title, stamped_title = %stamp, "building page");

        let request = CreatePageRequest::new(
            self.database_id.clone(),
            vec![
                (title_property, PropertyValue::title(&stamp)),
                (self.memo_property.clone(), PropertyValue::rich_text(content)),
            ],
        );
        let page = self.transport.create_page(&request).await?;
        info!(page_id = %page.id, url = %page.url, "page created");
        Ok(CreatedPage {
            page_id: page.id,
            url: page.url,
        })
    }

    async fn resolve_title_property(&self) -> Result<String, ClipError> {
        if let Some(name) = self.title_property() {
            return Ok(name);
        }

        let database = self.transport.retrieve_database(&self.database_id).await?;
        let name = database
            .title_property()
            .ok_or(ClipError::TitlePropertyNotFound)?
            .to_string();
        info!(title_property = %name, "title property discovered");

        // Concurrent first calls may each discover; the last write wins.
        *self
            .title_property
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(name.clone());
        Ok(name)
    }
}
