//! Repository initialization for a freshly generated project

use crate::generator::FileSystem;
use crate::runtime::{CommandError, CommandRunner, Invocation, RunOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    Initialized,
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Committed,
    AlreadyCommitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitOutcome {
    pub repository: RepositoryState,
    pub commit: CommitState,
}

impl GitOutcome {
    pub fn describe(&self) -> &'static str {
        match (self.repository, self.commit) {
            (RepositoryState::Initialized, CommitState::Committed) => {
                "initialized repository with first commit"
            }
            (RepositoryState::AlreadyInitialized, CommitState::Committed) => {
                "created first commit in existing repository"
            }
            (RepositoryState::Initialized, CommitState::AlreadyCommitted) => {
                "initialized repository"
            }
            (RepositoryState::AlreadyInitialized, CommitState::AlreadyCommitted) => {
                "repository already initialized and committed"
            }
        }
    }
}

/// Creates a repository and its first commit
///
/// Safe to run any number of times: an existing `.git` directory and an
/// existing `HEAD` are detected and left alone.
pub struct GitInitializer<'a, R, F> {
    runner: &'a R,
    fs: &'a F,
    dir: PathBuf,
    message: String,
}

impl<'a, R: CommandRunner, F: FileSystem> GitInitializer<'a, R, F> {
    pub fn new(runner: &'a R, fs: &'a F, dir: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            runner,
            fs,
            dir: dir.into(),
            message: message.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn git<I, A>(&self, args: I) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let invocation = Invocation::new("git").args(args);
        self.runner
            .run(&invocation, &RunOptions::in_dir(&self.dir).captured())
            .await
            .map(|_| ())
    }

    async fn has_head(&self) -> Result<bool, CommandError> {
        match self.git(["rev-parse", "--verify", "--quiet", "HEAD"]).await {
            Ok(()) => Ok(true),
            Err(CommandError::Failed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn initialize(&self) -> Result<GitOutcome, CommandError> {
        let repository = if self.fs.exists(&self.dir.join(".git")).await {
            log::debug!("{} is already a git repository", self.dir.display());
            RepositoryState::AlreadyInitialized
        } else {
            self.git(["init"]).await?;
            RepositoryState::Initialized
        };

        let commit = if self.has_head().await? {
            CommitState::AlreadyCommitted
        } else {
            self.git(["add", "-A"]).await?;
            self.git(["commit", "-m", self.message.as_str()]).await?;
            CommitState::Committed
        };

        let outcome = GitOutcome { repository, commit };
        log::info!("{}: {}", self.dir.display(), outcome.describe());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TokioFs;
    use crate::runtime::CommandOutput;
    use std::sync::Mutex;

    /// Plays git against a real directory: `init` creates `.git`, `commit`
    /// makes `HEAD` resolvable
    #[derive(Default)]
    struct FakeGit {
        commits: Mutex<u32>,
        calls: Mutex<Vec<String>>,
    }

    impl CommandRunner for FakeGit {
        async fn run(
            &self,
            invocation: &Invocation,
            options: &RunOptions,
        ) -> Result<CommandOutput, CommandError> {
            self.calls.lock().unwrap().push(invocation.to_string());
            let cwd = options.cwd.clone().unwrap();
            match invocation.args[0].as_str() {
                "init" => std::fs::create_dir(cwd.join(".git")).unwrap(),
                "rev-parse" if *self.commits.lock().unwrap() == 0 => {
                    return Err(CommandError::Failed {
                        command: invocation.to_string(),
                        code: Some(1),
                        stderr: String::new(),
                    })
                }
                "commit" => *self.commits.lock().unwrap() += 1,
                _ => {}
            }
            Ok(CommandOutput::default())
        }
    }

    #[tokio::test]
    async fn test_initialize_then_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::default();
        let init = GitInitializer::new(&git, &TokioFs, dir.path(), "Initial commit");

        let first = init.initialize().await.unwrap();
        assert_eq!(first.repository, RepositoryState::Initialized);
        assert_eq!(first.commit, CommitState::Committed);

        for _ in 0..2 {
            let again = init.initialize().await.unwrap();
            assert_eq!(again.repository, RepositoryState::AlreadyInitialized);
            assert_eq!(again.commit, CommitState::AlreadyCommitted);
        }
        assert_eq!(*git.commits.lock().unwrap(), 1);
        assert_eq!(
            git.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with("git init"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_existing_repository_without_commits() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let git = FakeGit::default();

        let outcome = GitInitializer::new(&git, &TokioFs, dir.path(), "first")
            .initialize()
            .await
            .unwrap();
        assert_eq!(outcome.repository, RepositoryState::AlreadyInitialized);
        assert_eq!(outcome.commit, CommitState::Committed);
        assert!(git
            .calls
            .lock()
            .unwrap()
            .contains(&"git commit -m first".to_string()));
    }

    #[tokio::test]
    async fn test_missing_git_is_reported() {
        struct NoGit;
        impl CommandRunner for NoGit {
            async fn run(
                &self,
                invocation: &Invocation,
                _options: &RunOptions,
            ) -> Result<CommandOutput, CommandError> {
                Err(CommandError::Spawn {
                    program: invocation.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let err = GitInitializer::new(&NoGit, &TokioFs, dir.path(), "first")
            .initialize()
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
