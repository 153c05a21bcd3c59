//! Detection of the tools a project needs: Node.js, its package manager, git

use crate::config::PackageManager;
use anyhow::Result;
use std::fmt;
use std::process::Command;

/// Tools the scaffolding pipeline may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Node,
    PackageManager(PackageManager),
    Git,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Node => "Node.js",
            Tool::PackageManager(pm) => pm.display_name(),
            Tool::Git => "Git",
        }
    }

    fn binary(&self) -> &'static str {
        match self {
            Tool::Node => "node",
            Tool::PackageManager(pm) => pm.as_str(),
            Tool::Git => "git",
        }
    }

    fn install_hint(&self) -> &'static str {
        match self {
            Tool::Node => "install from https://nodejs.org",
            Tool::PackageManager(PackageManager::Npm) => "ships with Node.js",
            Tool::PackageManager(PackageManager::Pnpm) => "run `corepack enable` or see https://pnpm.io",
            Tool::PackageManager(PackageManager::Yarn) => "run `corepack enable` or see https://yarnpkg.com",
            Tool::PackageManager(PackageManager::Bun) => "install from https://bun.sh",
            Tool::Git => "install from https://git-scm.com",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

fn detect(tool: Tool) -> RuntimeInfo {
    let output = Command::new(tool.binary()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name: tool.display_name(),
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name: tool.display_name(),
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    detect(Tool::Node)
}

/// Check if the given package manager is available
pub fn check_package_manager(pm: PackageManager) -> RuntimeInfo {
    detect(Tool::PackageManager(pm))
}

/// Check if git is available
pub fn check_git() -> RuntimeInfo {
    detect(Tool::Git)
}

/// Check tools with no advisory entries (strict mode - fail on any missing).
pub fn check_runtimes(required: &[Tool]) -> Result<Vec<RuntimeInfo>> {
    check_runtimes_with_advisory(required, &[])
}

/// Check tools; tools in `advisory` get availability reported but don't cause failure.
pub fn check_runtimes_with_advisory(
    required: &[Tool],
    advisory: &[Tool],
) -> Result<Vec<RuntimeInfo>> {
    check_with(required, advisory, detect)
}

fn check_with(
    required: &[Tool],
    advisory: &[Tool],
    detect: impl Fn(Tool) -> RuntimeInfo,
) -> Result<Vec<RuntimeInfo>> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    for tool in required {
        let info = detect(*tool);
        if !info.available {
            missing.push(format!("{} ({})", tool, tool.install_hint()));
        }
        results.push(info);
    }
    for tool in advisory.iter().filter(|t| !required.contains(t)) {
        results.push(detect(*tool));
    }

    if !missing.is_empty() {
        anyhow::bail!(
            "Missing required tools:\n{}",
            missing
                .iter()
                .map(|m| format!("  - {}", m))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    Ok(results)
}
