//! Record store implementations.
//!
//! Available backends:
//! - `MemoryStore` - In-memory storage (tests, ephemeral runs)
//! - `JsonFileStore` - Pretty JSON file, rewritten after each productive cycle

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, RecordMap};
