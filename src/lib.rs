pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod types;

pub use config::{Config, ConfigStore, Credentials};
pub use error::{ClipError, ErrorKind};
pub use service::{Clipper, NotionClient};
