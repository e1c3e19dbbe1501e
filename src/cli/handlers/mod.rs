//! CLI command handlers module
//!
//! - resolve: in-process resolution and backend lookup with fallback
//! - serve: API server
//! - info: configuration display

pub mod info;
pub mod resolve;
pub mod serve;

// Re-export all public handlers
pub use info::*;
pub use resolve::*;
pub use serve::*;
