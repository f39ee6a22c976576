//! Data types shared by the extractor, store and poller.

pub mod record;
pub mod source;
