pub mod clipper;
pub mod notion_client;
pub mod selection;

pub use clipper::Clipper;
pub use notion_client::{ConnectionInfo, CreatedPage, NotionClient};
pub use selection::{CaptureCommand, CaptureMode, SelectionCapture};
