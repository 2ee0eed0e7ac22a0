//! Page chunking.
//!
//! Each page is stripped of newlines and cut by a recursive character
//! splitter; every chunk carries a byte-truncated preview of its page.

mod helpers;
mod strategies;
mod types;

pub use helpers::RecursiveSplitter;
pub use strategies::PageChunker;
pub use types::{ChunkError, DEFAULT_SEPARATORS};
