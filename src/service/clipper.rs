use crate::api::{NotionApi, NotionTransport};
use crate::error::ClipError;
use crate::service::notion_client::{CreatedPage, NotionClient, timestamp_now};
use crate::service::selection::SelectionCapture;
use tracing::{error, info, warn};

/// Capture the selection and save it to Notion.
pub struct Clipper<T = NotionApi> {
    client: NotionClient<T>,
    capture: SelectionCapture,
}

impl<T: NotionTransport> Clipper<T> {
    pub fn new(client: NotionClient<T>, capture: SelectionCapture) -> Self {
        Self { client, capture }
    }

    pub fn client(&self) -> &NotionClient<T> {
        &self.client
    }

    pub async fn clip(&self) -> Result<CreatedPage, ClipError> {
        let text = self.capture.capture().await.inspect_err(|e| {
            warn!(error = %e, "could not capture selection");
        })?;
        self.save_text(&text).await
    }

    pub async fn save_text(&self, text: &str) -> Result<CreatedPage, ClipError> {
        if text.trim().is_empty() {
            warn!("refusing to save blank text");
            return Err(ClipError::EmptySelection);
        }

        let stamp = timestamp_now();
        info!(chars = text.chars().count(), title = %stamp, "saving selection");
        let page = self
            .client
            .create_page(&stamp, text)
            .await
            .inspect_err(|e| error!(error = %e, "save failed"))?;
        info!(url = %page.url, "saved");
        Ok(page)
    }
}
