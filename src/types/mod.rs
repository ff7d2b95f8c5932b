//! Core data types shared across the crate.

mod export_format;
mod message;

pub use export_format::ExportFormat;
pub use message::{Message, Role};
