pub mod notion_api;

pub use notion_api::{NotionApi, NotionTransport};
