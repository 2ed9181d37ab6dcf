pub mod metadata;
pub mod tags;

pub use metadata::{extract_safe_metadata, SafeMetadata, SAFE_TAGS};
pub use tags::*;
