//! Path discovery for Claude Code configuration.
//!
//! ## Modules
//!
//! - [`harness`] - Harness registry and the Claude Code path layout
//! - [`types`] - Core type definitions
//! - [`error`] - Error types

pub mod error;
pub mod harness;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
pub use harness::Harness;
pub use harness::claude_code::ClaudeLayout;
pub use types::{HarnessKind, HarnessStatus, Scope};
