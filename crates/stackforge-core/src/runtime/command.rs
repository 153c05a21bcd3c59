//! External command execution
//!
//! Everything the tool runs (scaffolding generators, package managers, git)
//! goes through the `CommandRunner` trait so the pipeline can be tested with
//! scripted fakes.

use colored::Colorize;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Lines of stderr kept for error messages
const STDERR_TAIL: usize = 20;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cwd: Option<PathBuf>,
    /// Collect output silently instead of echoing it to the terminal
    pub capture_output: bool,
    /// `None` runs to completion, however long that takes
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Default::default()
        }
    }

    pub fn captured(mut self) -> Self {
        self.capture_output = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with code {}{}", .code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()), format_stderr(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("`{command}` did not finish within {} seconds", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },
    #[error("failed while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// The program could not be found or started at all
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

fn format_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}

/// Runs external programs
pub trait CommandRunner: Send + Sync {
    /// Run to completion. A non-zero exit is `CommandError::Failed`.
    fn run(
        &self,
        invocation: &Invocation,
        options: &RunOptions,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(
        &self,
        invocation: &Invocation,
        options: &RunOptions,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
        (**self).run(invocation, options)
    }
}

/// tokio::process-backed runner
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        options: &RunOptions,
    ) -> Result<CommandOutput, CommandError> {
        let command_line = invocation.to_string();
        log::debug!("Running {}", command_line);

        let mut command = TokioCommand::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let io_error = |source| CommandError::Io {
            command: command_line.clone(),
            source,
        };
        let missing_pipe = || {
            io_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "output pipe was not captured",
            ))
        };
        let stdout = child.stdout.take().ok_or_else(missing_pipe)?;
        let stderr = child.stderr.take().ok_or_else(missing_pipe)?;
        let echo = !options.capture_output;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        // Stream both pipes until they close, then reap the child
        let output_task = async {
            let mut out = String::new();
            let mut err = String::new();
            let (mut out_done, mut err_done) = (false, false);

            while !(out_done && err_done) {
                tokio::select! {
                    line = stdout_reader.next_line(), if !out_done => match line {
                        Ok(Some(line)) => {
                            if echo {
                                println!("  {}", line);
                            }
                            out.push_str(&line);
                            out.push('\n');
                        }
                        Ok(None) => out_done = true,
                        Err(e) => {
                            log::debug!("Error reading stdout of {}: {}", command_line, e);
                            out_done = true;
                        }
                    },
                    line = stderr_reader.next_line(), if !err_done => match line {
                        Ok(Some(line)) => {
                            if echo {
                                eprintln!("  {}", line.yellow());
                            }
                            err.push_str(&line);
                            err.push('\n');
                        }
                        Ok(None) => err_done = true,
                        Err(e) => {
                            log::debug!("Error reading stderr of {}: {}", command_line, e);
                            err_done = true;
                        }
                    },
                }
            }

            child.wait().await.map(|status| (status, out, err))
        };

        let finished = match options.timeout {
            Some(limit) => {
                let bounded = timeout(limit, output_task).await;
                match bounded {
                    Ok(result) => result,
                    Err(_) => {
                        let _ = child.kill().await;
                        return Err(CommandError::TimedOut {
                            command: command_line,
                            timeout: limit,
                        });
                    }
                }
            }
            None => output_task.await,
        };
        let (status, stdout, stderr) = finished.map_err(io_error)?;

        if !status.success() {
            return Err(CommandError::Failed {
                command: command_line,
                code: status.code(),
                stderr: tail(&stderr, STDERR_TAIL),
            });
        }

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(0),
            stdout,
            stderr,
        })
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
