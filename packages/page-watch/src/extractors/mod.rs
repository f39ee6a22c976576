//! Extractor implementations.
//!
//! - `HtmlExtractor` - HTTP fetch + CSS selectors, no JavaScript
//! - `MockExtractor` - Scripted responses for testing

mod html;
mod mock;

pub use html::{extract_records, HtmlExtractor, MISSING_LINK};
pub use mock::MockExtractor;

// Re-export from traits for convenience
pub use crate::traits::Extractor;
