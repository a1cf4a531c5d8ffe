//! Cargo Sweeper - workspace-aware cleaning of Cargo project trees
//!
//! This crate provides functionality for:
//! - Discovering every Cargo manifest under a directory
//! - Cleaning build artifacts through `cargo clean` with fallbacks
//! - Handling workspaces with missing or broken members

pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SweeperError};
