//! Template selection
//!
//! This module provides:
//! - The mapping from a configuration to a generation strategy
//!   (delegate to an external create-* tool, or assemble the tree in-repo)
//! - The stack catalog behind `list`

pub mod catalog;
pub mod strategy;

pub use catalog::{by_category, catalog, CatalogEntry};
pub use strategy::{
    launch, select_strategy, strategy_kind, Assembly, Delegation, Layout, Profile, SecondaryTool,
    Strategy, StrategyKind,
};
