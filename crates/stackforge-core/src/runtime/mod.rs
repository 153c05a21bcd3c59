//! Tool detection and external command execution
//!
//! This module provides:
//! - Detection of Node.js, package managers and git
//! - The `CommandRunner` abstraction over process spawning

pub mod check;
pub mod command;

pub use check::{
    check_git, check_node, check_package_manager, check_runtimes, check_runtimes_with_advisory,
    RuntimeInfo, Tool,
};
pub use command::{
    CommandError, CommandOutput, CommandRunner, Invocation, RunOptions, TokioCommandRunner,
};
