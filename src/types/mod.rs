pub mod hotkey;
pub mod notion;
pub mod report;

pub use hotkey::Hotkey;
pub use report::Report;
