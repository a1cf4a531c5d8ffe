//! Project discovery and cleaning functionality.
//!
//! This module provides:
//! - Classification of Cargo manifests and workspace members
//! - A fallback cascade for cleaning a single project
//! - Workspace-aware coordination and the tree walk tying it together

pub mod diagnostics;
pub mod executor;
pub mod manifest;
pub mod orchestrator;
pub mod project_scanner;
pub mod tool;
pub mod workspace;

pub use executor::{CleanExecutor, CleanOptions, CleanResult};
pub use manifest::{Classification, MemberValidation, ProjectManifest};
pub use orchestrator::{CleanOrchestrator, RunSummary};
pub use project_scanner::{ProjectScanner, ScanOptions};
pub use tool::{CargoTool, CleanMode, CleanTool, ToolOutput};
pub use workspace::WorkspaceCoordinator;
