//! Library discovery

mod scanner;

pub use scanner::{scan, DiscoveredFile};
