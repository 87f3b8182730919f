use crate::config::{Credentials, NOTION_VERSION};
use crate::error::{ClipError, NotionError};
use crate::types::notion::{CreatePageRequest, Database, Page};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// The remote operations the client needs from Notion.
pub trait NotionTransport: Send + Sync {
    /// Database metadata, including its property schema.
    fn retrieve_database(
        &self,
        database_id: &str,
    ) -> impl Future<Output = Result<Database, ClipError>> + Send;

    /// Create a page under the request's parent database.
    fn create_page(
        &self,
        request: &CreatePageRequest,
    ) -> impl Future<Output = Result<Page, ClipError>> + Send;
}

/// Notion REST API over reqwest. Single attempt per call.
#[derive(Clone)]
pub struct NotionApi {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

impl NotionApi {
    pub fn new(credentials: &Credentials, base: Url, proxy: Option<&Url>) -> Result<Self, ClipError> {
        let mut headers = HeaderMap::new();
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("clip-to-notion/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers);
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;

        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client,
            base,
            api_key: credentials.api_key().to_string(),
        })
    }

    fn database_url(&self, database_id: &str) -> Result<Url, ClipError> {
        let mut url = self.base.join("databases/")?;
        url.path_segments_mut()
            .map_err(|_| ClipError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(database_id);
        Ok(url)
    }
}

impl NotionTransport for NotionApi {
    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ClipError> {
        let url = self.database_url(database_id)?;
        debug!(%url, "retrieving database");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;
        decode(resp).await
    }

    async fn create_page(&self, request: &CreatePageRequest) -> Result<Page, ClipError> {
        let url = self.base.join("pages")?;
        debug!(%url, database_id = %request.parent.database_id, "creating page");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }
}

/// Success bodies decode into `T`; anything else becomes a [`NotionError`].
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClipError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let body = resp.bytes().await?;
    let notion_err = serde_json::from_slice::<NotionError>(&body).unwrap_or_else(|_| NotionError {
        status: status.as_u16(),
        code: status
            .canonical_reason()
            .unwrap_or("unknown_error")
            .to_string(),
        message: String::from_utf8_lossy(&body).trim().to_string(),
    });
    error!(
        status = notion_err.status,
        code = %notion_err.code,
        message = %notion_err.message,
        "Notion API request failed"
    );
    Err(ClipError::NotionServerError(notion_err))
}
