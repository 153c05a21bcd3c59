//! Adding a feature to a project that already exists
//!
//! The project kind is read from the dependencies in its `package.json`; the
//! package manager from the lockfile next to it.

use crate::config::PackageManager;
use crate::generator::FileSystem;
use crate::runtime::{CommandError, CommandRunner, Invocation, RunOptions};
use crate::templates::strategy::{launch, shadcn_init};
use clap::ValueEnum;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Features `add` knows how to bolt onto a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Addon {
    #[value(aliases = ["shadcn-ui", "ui"])]
    Shadcn,
    #[value(alias = "nextauth")]
    Auth,
    #[value(aliases = ["db", "prisma"])]
    Database,
}

impl Addon {
    pub fn display_name(&self) -> &'static str {
        match self {
            Addon::Shadcn => "shadcn/ui",
            Addon::Auth => "NextAuth.js",
            Addon::Database => "Prisma",
        }
    }

    fn supports(&self, kind: ProjectKind) -> bool {
        match self {
            Addon::Shadcn | Addon::Auth => kind == ProjectKind::NextJs,
            Addon::Database => matches!(kind, ProjectKind::NextJs | ProjectKind::ReactVite),
        }
    }

    /// Commands that install and initialize the feature, in order
    pub fn commands(&self, pm: PackageManager) -> Vec<Invocation> {
        let add = |packages: &[&str], dev: bool| {
            Invocation::new(pm.as_str())
                .args(pm.add_args(dev).iter().copied())
                .args(packages.iter().copied())
        };
        match self {
            Addon::Shadcn => vec![shadcn_init(pm).invocation],
            Addon::Auth => vec![add(&["next-auth"], false)],
            Addon::Database => vec![
                add(&["@prisma/client"], false),
                add(&["prisma"], true),
                launch(pm, &["prisma", "init"]),
            ],
        }
    }

    /// What is left to the user once the commands succeeded
    pub fn next_steps(&self, pm: PackageManager) -> Vec<String> {
        let launcher = pm.launcher_display();
        match self {
            Addon::Shadcn => vec![
                format!("Add components: {} shadcn@latest add button", launcher),
                "Browse components: https://ui.shadcn.com".to_string(),
            ],
            Addon::Auth => vec![
                "Create app/api/auth/[...nextauth]/route.ts".to_string(),
                "Configure providers in that route".to_string(),
                "Wrap the app in SessionProvider".to_string(),
                "Documentation: https://next-auth.js.org".to_string(),
            ],
            Addon::Database => vec![
                "Define your models in prisma/schema.prisma".to_string(),
                format!("{} prisma migrate dev --name init", launcher),
                format!("{} prisma generate", launcher),
            ],
        }
    }
}

impl fmt::Display for Addon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Kind of frontend project found in a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    NextJs,
    ReactVite,
    React,
}

impl ProjectKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectKind::NextJs => "Next.js",
            ProjectKind::ReactVite => "React (Vite)",
            ProjectKind::React => "React",
        }
    }

    /// Classify a parsed `package.json` by its dependencies
    pub fn from_manifest(manifest: &Value) -> Option<ProjectKind> {
        let declares = |name: &str| {
            ["dependencies", "devDependencies"]
                .iter()
                .any(|section| manifest[section].get(name).is_some())
        };
        if declares("next") {
            Some(ProjectKind::NextJs)
        } else if declares("react") && declares("vite") {
            Some(ProjectKind::ReactVite)
        } else if declares("react") {
            Some(ProjectKind::React)
        } else {
            None
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error)]
pub enum AddError {
    #[error("no package.json in {}, run this inside a Next.js or React project", .0.display())]
    NoManifest(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a Next.js or React project", .0.display())]
    UnknownProject(PathBuf),

    #[error("{addon} cannot be added to a {kind} project")]
    Unsupported { addon: Addon, kind: ProjectKind },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Result of a successful `add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub kind: ProjectKind,
    pub package_manager: PackageManager,
    pub commands: Vec<String>,
    pub next_steps: Vec<String>,
}

pub async fn detect_project<F: FileSystem>(fs: &F, dir: &Path) -> Result<ProjectKind, AddError> {
    let path = dir.join("package.json");
    let text = fs
        .read_to_string(&path)
        .await
        .map_err(|_| AddError::NoManifest(dir.to_path_buf()))?;
    let manifest: Value =
        serde_json::from_str(&text).map_err(|source| AddError::Manifest { path, source })?;
    ProjectKind::from_manifest(&manifest).ok_or_else(|| AddError::UnknownProject(dir.to_path_buf()))
}

/// Package manager whose lockfile sits in `dir`, npm when there is none
pub async fn detect_package_manager<F: FileSystem>(fs: &F, dir: &Path) -> PackageManager {
    for pm in [PackageManager::Pnpm, PackageManager::Yarn, PackageManager::Bun] {
        if fs.exists(&dir.join(pm.lockfile())).await {
            return pm;
        }
    }
    // Older bun releases write a binary lockfile
    if fs.exists(&dir.join("bun.lockb")).await {
        return PackageManager::Bun;
    }
    PackageManager::Npm
}

/// Install and initialize `addon` in the project at `dir`
///
/// `package_manager` overrides lockfile detection. Nothing runs when the
/// project kind does not support the feature.
pub async fn add<R, F>(
    runner: &R,
    fs: &F,
    dir: &Path,
    addon: Addon,
    package_manager: Option<PackageManager>,
) -> Result<AddOutcome, AddError>
where
    R: CommandRunner,
    F: FileSystem,
{
    let kind = detect_project(fs, dir).await?;
    log::info!("Detected {} project in {}", kind, dir.display());
    if !addon.supports(kind) {
        return Err(AddError::Unsupported { addon, kind });
    }

    let pm = match package_manager {
        Some(pm) => pm,
        None => detect_package_manager(fs, dir).await,
    };

    let mut commands = Vec::new();
    for invocation in addon.commands(pm) {
        log::debug!("Running {} in {}", invocation, dir.display());
        runner.run(&invocation, &RunOptions::in_dir(dir)).await?;
        commands.push(invocation.to_string());
    }

    Ok(AddOutcome {
        kind,
        package_manager: pm,
        commands,
        next_steps: addon.next_steps(pm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TokioFs;
    use crate::runtime::CommandOutput;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl CommandRunner for RecordingRunner {
        async fn run(
            &self,
            invocation: &Invocation,
            _options: &RunOptions,
        ) -> Result<CommandOutput, CommandError> {
            let command = invocation.to_string();
            self.calls.lock().unwrap().push(command.clone());
            if self.fail_on.is_some_and(|needle| command.contains(needle)) {
                return Err(CommandError::Failed {
                    command,
                    code: Some(1),
                    stderr: "ERR! network".to_string(),
                });
            }
            Ok(CommandOutput::default())
        }
    }

    fn project(manifest: Value, lockfile: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), manifest.to_string()).unwrap();
        if let Some(lockfile) = lockfile {
            std::fs::write(dir.path().join(lockfile), "").unwrap();
        }
        dir
    }

    fn next_manifest() -> Value {
        json!({ "dependencies": { "next": "15.0.0", "react": "19.0.0" } })
    }

    #[test]
    fn test_project_kind_from_dependencies() {
        assert_eq!(ProjectKind::from_manifest(&next_manifest()), Some(ProjectKind::NextJs));
        assert_eq!(
            ProjectKind::from_manifest(&json!({
                "dependencies": { "react": "19.0.0" },
                "devDependencies": { "vite": "6.0.0" }
            })),
            Some(ProjectKind::ReactVite)
        );
        assert_eq!(
            ProjectKind::from_manifest(&json!({ "dependencies": { "react": "19.0.0" } })),
            Some(ProjectKind::React)
        );
        assert_eq!(ProjectKind::from_manifest(&json!({ "name": "x" })), None);
    }

    #[test]
    fn test_aliases_parse() {
        for (input, addon) in [
            ("ui", Addon::Shadcn),
            ("shadcn-ui", Addon::Shadcn),
            ("nextauth", Addon::Auth),
            ("prisma", Addon::Database),
            ("db", Addon::Database),
        ] {
            assert_eq!(Addon::from_str(input, true).unwrap(), addon);
        }
    }

    #[tokio::test]
    async fn test_database_on_pnpm_project() {
        let dir = project(next_manifest(), Some("pnpm-lock.yaml"));
        let runner = RecordingRunner::default();

        let outcome = add(&runner, &TokioFs, dir.path(), Addon::Database, None)
            .await
            .unwrap();

        assert_eq!(outcome.package_manager, PackageManager::Pnpm);
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec![
                "pnpm add @prisma/client",
                "pnpm add -D prisma",
                "pnpm dlx prisma init",
            ]
        );
        assert!(outcome
            .next_steps
            .contains(&"pnpm dlx prisma migrate dev --name init".to_string()));
    }

    #[tokio::test]
    async fn test_shadcn_reuses_the_init_command() {
        let dir = project(next_manifest(), None);
        let runner = RecordingRunner::default();

        let outcome = add(&runner, &TokioFs, dir.path(), Addon::Shadcn, None)
            .await
            .unwrap();

        assert_eq!(
            outcome.commands,
            vec![shadcn_init(PackageManager::Npm).invocation.to_string()]
        );
        assert_eq!(outcome.commands[0], "npx --yes shadcn@latest init -y --defaults");
    }

    #[tokio::test]
    async fn test_unsupported_combination_runs_nothing() {
        let dir = project(
            json!({ "dependencies": { "react": "19.0.0", "vite": "6.0.0" } }),
            None,
        );
        let runner = RecordingRunner::default();

        let err = add(&runner, &TokioFs, dir.path(), Addon::Auth, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AddError::Unsupported {
                addon: Addon::Auth,
                kind: ProjectKind::ReactVite
            }
        ));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = add(&RecordingRunner::default(), &TokioFs, dir.path(), Addon::Shadcn, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AddError::NoManifest(_)));
    }

    #[tokio::test]
    async fn test_failing_command_stops_the_rest() {
        let dir = project(next_manifest(), Some("yarn.lock"));
        let runner = RecordingRunner {
            fail_on: Some("@prisma/client"),
            ..Default::default()
        };

        let err = add(&runner, &TokioFs, dir.path(), Addon::Database, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AddError::Command(CommandError::Failed { .. })));
        assert_eq!(*runner.calls.lock().unwrap(), vec!["yarn add @prisma/client"]);
    }

    #[tokio::test]
    async fn test_explicit_package_manager_wins() {
        let dir = project(next_manifest(), Some("yarn.lock"));
        let outcome = add(
            &RecordingRunner::default(),
            &TokioFs,
            dir.path(),
            Addon::Auth,
            Some(PackageManager::Bun),
        )
        .await
        .unwrap();
        assert_eq!(outcome.commands, vec!["bun add next-auth"]);
    }
}
