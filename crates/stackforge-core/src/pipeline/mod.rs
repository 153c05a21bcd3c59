//! Post-generation integration
//!
//! Sequences everything that happens to a project directory:
//!
//! 1. validate the destination
//! 2. generate (delegate to a create-* tool, or write the assembled tree)
//! 3. normalize the root package.json
//! 4. install dependencies
//! 5. run the secondary tool (shadcn/ui, NativeWind)
//! 6. initialize git
//!
//! Only the first two steps are required; a failure there aborts the run.
//! The others are best effort: a failure is logged and recorded as a warning
//! and the run continues.

mod git;

pub use git::{CommitState, GitInitializer, GitOutcome, RepositoryState};

use crate::config::FeatureConfig;
use crate::generator::{generate, staging_path, write_tree, FileSystem, GenerateError};
use crate::runtime::{CommandError, CommandRunner, Invocation, RunOptions};
use crate::templates::{select_strategy, Strategy};
use crate::versions::VersionSource;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    ValidateDestination,
    Generate,
    NormalizeManifest,
    InstallDependencies,
    SecondaryTool,
    InitRepository,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 6] = [
        PipelineStep::ValidateDestination,
        PipelineStep::Generate,
        PipelineStep::NormalizeManifest,
        PipelineStep::InstallDependencies,
        PipelineStep::SecondaryTool,
        PipelineStep::InitRepository,
    ];

    /// A failure aborts the run instead of being downgraded to a warning
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            PipelineStep::ValidateDestination | PipelineStep::Generate
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStep::ValidateDestination => "Validate destination",
            PipelineStep::Generate => "Generate project",
            PipelineStep::NormalizeManifest => "Normalize package.json",
            PipelineStep::InstallDependencies => "Install dependencies",
            PipelineStep::SecondaryTool => "Secondary tool",
            PipelineStep::InitRepository => "Initialize git",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done(String),
    Skipped(String),
    /// Best-effort step failed; the run went on
    Warned(String),
}

impl StepStatus {
    pub fn message(&self) -> &str {
        match self {
            StepStatus::Done(m) | StepStatus::Skipped(m) | StepStatus::Warned(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: PipelineStep,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub outcomes: Vec<StepOutcome>,
    pub git: Option<GitOutcome>,
}

impl PipelineReport {
    pub fn status(&self, step: PipelineStep) -> Option<&StepStatus> {
        self.outcomes
            .iter()
            .find(|o| o.step == step)
            .map(|o| &o.status)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StepStatus::Warned(_)))
    }
}

/// Why a step could not finish
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{source}\n{} may hold a partially created project; remove it before retrying", .dir.display())]
    Delegate {
        dir: PathBuf,
        #[source]
        source: CommandError,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{step} failed: {source}")]
    StepFailed {
        step: PipelineStep,
        #[source]
        source: StepError,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Install dependencies (and run the secondary tool, which needs them)
    pub install: bool,
    pub commit_message: String,
}

impl PipelineOptions {
    pub fn new(commit_message: impl Into<String>) -> Self {
        Self {
            install: true,
            commit_message: commit_message.into(),
        }
    }
}

/// Notified around every step, e.g. to drive terminal output
pub trait Progress {
    fn step_started(&mut self, _step: PipelineStep) {}

    fn step_finished(&mut self, _step: PipelineStep, _status: &StepStatus) {}
}

impl Progress for () {}

/// The planned run for one configuration and destination
pub struct Pipeline<'a> {
    config: &'a FeatureConfig,
    dest: PathBuf,
    options: PipelineOptions,
    strategy: Strategy,
}

impl<'a> Pipeline<'a> {
    pub fn plan(config: &'a FeatureConfig, dest: impl Into<PathBuf>, options: PipelineOptions) -> Self {
        Self {
            config,
            dest: dest.into(),
            options,
            strategy: select_strategy(config),
        }
    }

    pub fn steps(&self) -> &'static [PipelineStep] {
        &PipelineStep::ALL
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    /// Directory the delegated tool creates: it is always named after the project
    fn tool_output_dir(&self) -> PathBuf {
        self.dest.with_file_name(self.config.project_name().as_str())
    }

    pub async fn run<R, F, V>(
        &self,
        runner: &R,
        fs: &F,
        versions: &V,
    ) -> Result<PipelineReport, PipelineError>
    where
        R: CommandRunner,
        F: FileSystem,
        V: VersionSource,
    {
        self.run_with_progress(runner, fs, versions, &mut ()).await
    }

    pub async fn run_with_progress<R, F, V, P>(
        &self,
        runner: &R,
        fs: &F,
        versions: &V,
        progress: &mut P,
    ) -> Result<PipelineReport, PipelineError>
    where
        R: CommandRunner,
        F: FileSystem,
        V: VersionSource,
        P: Progress,
    {
        let mut report = PipelineReport::default();

        for &step in self.steps() {
            progress.step_started(step);
            let result = match step {
                PipelineStep::ValidateDestination => self.validate_destination(fs).await,
                PipelineStep::Generate => self.generate(runner, fs, versions).await,
                PipelineStep::NormalizeManifest => self.normalize_manifest(fs).await,
                PipelineStep::InstallDependencies => self.install(runner).await,
                PipelineStep::SecondaryTool => self.secondary_tool(runner).await,
                PipelineStep::InitRepository => {
                    self.init_repository(runner, fs, &mut report).await
                }
            };

            let status = match result {
                Ok(status) => status,
                Err(source) if step.is_required() => {
                    return Err(PipelineError::StepFailed { step, source });
                }
                Err(e) => {
                    log::warn!("{} failed: {}", step, e);
                    StepStatus::Warned(e.to_string())
                }
            };
            log::info!("{}: {}", step, status.message());
            progress.step_finished(step, &status);
            report.outcomes.push(StepOutcome { step, status });
        }

        Ok(report)
    }

    async fn validate_destination<F: FileSystem>(&self, fs: &F) -> Result<StepStatus, StepError> {
        let mut taken = vec![self.dest.clone()];
        if let Strategy::Delegate(_) = self.strategy {
            taken.push(self.tool_output_dir());
        }
        for path in taken {
            if fs.exists(&path).await {
                return Err(GenerateError::DestinationExists(path).into());
            }
        }
        let staging = staging_path(&self.dest);
        if fs.exists(&staging).await {
            return Err(GenerateError::StaleStaging(staging).into());
        }
        Ok(StepStatus::Done(format!("{} is free", self.dest.display())))
    }

    async fn generate<R, F, V>(&self, runner: &R, fs: &F, versions: &V) -> Result<StepStatus, StepError>
    where
        R: CommandRunner,
        F: FileSystem,
        V: VersionSource,
    {
        match &self.strategy {
            Strategy::Delegate(delegation) => {
                let invocation =
                    delegation.invocation(self.config.package_manager(), self.options.install);
                let output_dir = self.tool_output_dir();
                let parent = output_dir
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
                    .to_path_buf();
                fs.create_dir_all(&parent).await.map_err(|source| StepError::Io {
                    path: parent.clone(),
                    source,
                })?;

                runner
                    .run(&invocation, &RunOptions::in_dir(&parent))
                    .await
                    .map_err(|source| StepError::Delegate {
                        dir: output_dir.clone(),
                        source,
                    })?;

                if output_dir != self.dest {
                    fs.rename(&output_dir, &self.dest)
                        .await
                        .map_err(|source| StepError::Io {
                            path: self.dest.clone(),
                            source,
                        })?;
                }
                Ok(StepStatus::Done(format!("ran {}", delegation.tool)))
            }
            Strategy::Assemble(_) => {
                let tree = generate(self.config, versions)?;
                write_tree(fs, &self.dest, &tree).await?;
                Ok(StepStatus::Done(format!("wrote {} files", tree.len())))
            }
        }
    }

    /// Set `name` and `version` of the root package.json
    ///
    /// create-* tools name the package after the directory they were given and
    /// some start at `0.0.0`; assembled manifests already match and are left
    /// untouched.
    async fn normalize_manifest<F: FileSystem>(&self, fs: &F) -> Result<StepStatus, StepError> {
        let path = self.dest.join("package.json");
        if !fs.exists(&path).await {
            return Ok(StepStatus::Skipped("no package.json".to_string()));
        }

        let io_error = |source| StepError::Io {
            path: path.clone(),
            source,
        };
        let text = fs.read_to_string(&path).await.map_err(io_error)?;
        let mut manifest: Value =
            serde_json::from_str(&text).map_err(|source| StepError::Manifest {
                path: path.clone(),
                source,
            })?;
        let Some(fields) = manifest.as_object_mut() else {
            return Ok(StepStatus::Skipped("package.json is not an object".to_string()));
        };

        let wanted = [
            ("name", self.config.project_name().as_str()),
            ("version", "0.1.0"),
        ];
        let mut changed = Vec::new();
        for (key, value) in wanted {
            if fields.get(key).and_then(Value::as_str) != Some(value) {
                fields.insert(key.to_string(), Value::from(value));
                changed.push(key);
            }
        }
        if changed.is_empty() {
            return Ok(StepStatus::Skipped("already up to date".to_string()));
        }

        let mut rendered = serde_json::to_string_pretty(&manifest).map_err(|source| {
            StepError::Manifest {
                path: path.clone(),
                source,
            }
        })?;
        rendered.push('\n');
        fs.write(&path, rendered.as_bytes()).await.map_err(io_error)?;
        Ok(StepStatus::Done(format!("set {}", changed.join(" and "))))
    }

    async fn install<R: CommandRunner>(&self, runner: &R) -> Result<StepStatus, StepError> {
        if !self.options.install {
            return Ok(StepStatus::Skipped("install disabled".to_string()));
        }

        let dirs = match &self.strategy {
            Strategy::Delegate(delegation) => {
                if delegation.will_install(self.options.install) {
                    return Ok(StepStatus::Skipped(format!(
                        "installed by {}",
                        delegation.tool
                    )));
                }
                vec![".".to_string()]
            }
            Strategy::Assemble(assembly) => assembly.install_dirs.clone(),
        };

        let pm = self.config.package_manager();
        let invocation = Invocation::new(pm.as_str()).arg("install");
        for dir in &dirs {
            let cwd = if dir == "." {
                self.dest.clone()
            } else {
                self.dest.join(dir)
            };
            log::debug!("Installing dependencies in {}", cwd.display());
            // Installs may legitimately take minutes; no timeout
            runner.run(&invocation, &RunOptions::in_dir(cwd)).await?;
        }
        Ok(StepStatus::Done(format!(
            "{} in {}",
            pm.install_command(),
            dirs.join(", ")
        )))
    }

    async fn secondary_tool<R: CommandRunner>(&self, runner: &R) -> Result<StepStatus, StepError> {
        let secondary = match &self.strategy {
            Strategy::Delegate(delegation) => delegation.secondary.as_ref(),
            Strategy::Assemble(_) => None,
        };
        let Some(secondary) = secondary else {
            return Ok(StepStatus::Skipped("nothing to run".to_string()));
        };
        if !self.options.install {
            return Ok(StepStatus::Skipped(format!(
                "{} needs installed dependencies",
                secondary.name
            )));
        }

        runner
            .run(&secondary.invocation, &RunOptions::in_dir(&self.dest))
            .await?;
        Ok(StepStatus::Done(format!("set up {}", secondary.name)))
    }

    async fn init_repository<R, F>(
        &self,
        runner: &R,
        fs: &F,
        report: &mut PipelineReport,
    ) -> Result<StepStatus, StepError>
    where
        R: CommandRunner,
        F: FileSystem,
    {
        if !self.config.git() {
            return Ok(StepStatus::Skipped("git disabled".to_string()));
        }

        let init = GitInitializer::new(runner, fs, &self.dest, &self.options.commit_message);
        match init.initialize().await {
            Ok(outcome) => {
                report.git = Some(outcome);
                Ok(StepStatus::Done(outcome.describe().to_string()))
            }
            Err(e) if e.is_not_found() => Ok(StepStatus::Skipped("git is not installed".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
