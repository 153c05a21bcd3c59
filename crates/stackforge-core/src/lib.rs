//! Stackforge Core - project scaffolding engine
//!
//! This library turns a set of answers into a starter project. It is used by
//! the `stackforge` binary and can drive other front ends with a different
//! `ProductConfig`.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Pure configuration validation, strategy
//!   selection, version resolution and file-tree generation
//! - **Layer 2: Workflow Orchestration** - `ProductConfig`, the post-generation
//!   `Pipeline`, `addon` for features added to existing projects, and the
//!   `workflow` helpers shared by every front end
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stackforge_core::{config::{FeatureConfig, RawAnswers}, generate, PinnedVersions};
//!
//! let config = FeatureConfig::build(RawAnswers::for_stack("shop-api", "express"))?;
//! let tree = generate(&config, &PinnedVersions::bundled())?;
//! for file in tree.files() {
//!     println!("{}", file.path);
//! }
//! ```

pub mod addon;
pub mod config;
pub mod generator;
pub mod pipeline;
pub mod product;
pub mod report;
pub mod runtime;
pub mod templates;
pub mod versions;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use addon::{add, Addon, AddOutcome};
pub use config::{ConfigError, FeatureConfig, RawAnswers};
pub use generator::{generate, write_tree, FileTree, GenerateError, TokioFs};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, PipelineReport, StepStatus};
pub use product::ProductConfig;
pub use runtime::{check_runtimes, RuntimeInfo, TokioCommandRunner};
pub use templates::{select_strategy, Strategy};
pub use versions::{PinnedVersions, VersionResolver, VersionSource};

#[cfg(feature = "tui")]
pub use tui::run;
