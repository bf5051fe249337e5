pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod model;

pub use config::{EditorConfig, Viewport};
pub use document::{Document, Record, deserialize, from_json, parse_document, serialize, to_json};
pub use error::{ConfigError, DocumentError, DocumentResult};
pub use id::ElementId;
pub use model::*;
