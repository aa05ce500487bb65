//! Script execution (shell spec + process runner).
//!
//! parse_shell -> ShellSpec { program, args }
//! ProcessRunner: spawn-and-wait with inherited stdio.
//! ShellRunner: the real runner, tokio child process on a current-thread runtime.
//!
use anyhow::{Context, Result, bail};
use shell_words::split as shell_split;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Shell used when `--shell` is not given.
pub const DEFAULT_SHELL: &str = "bash";

/// The shell invocation that scripts are handed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ShellSpec {
    fn default() -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for ShellSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Parse a `--shell` value into a `ShellSpec`.
///
/// The value is split with shell-style rules, so `"bash -e"` and
/// `"/opt/my shell/bin/sh" -x` both work.
pub fn parse_shell(raw: &str) -> Result<ShellSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Shell string is empty");
    }
    let parts = shell_split(trimmed).context("Failed to parse shell command line")?;
    let Some((program, args)) = parts.split_first() else {
        bail!("No tokens produced when parsing shell");
    };
    if program.is_empty() {
        bail!("Empty program name in shell");
    }
    Ok(ShellSpec {
        program: program.clone(),
        args: args.to_vec(),
    })
}

/// Exit status of a finished child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for RunStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Capability to run a script as a child process sharing our terminal.
///
/// `Err` means the child could not be started at all.
pub trait ProcessRunner {
    fn run(&self, script: &Path, args: &[String]) -> Result<RunStatus>;
}

/// Runs scripts as `<shell> <script> [args...]` with stdin/stdout/stderr inherited.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    shell: ShellSpec,
}

impl ShellRunner {
    pub fn new(shell: ShellSpec) -> Self {
        Self { shell }
    }

    async fn run_async(&self, script: &Path, args: &[String]) -> Result<RunStatus> {
        let mut cmd = Command::new(&self.shell.program);
        cmd.args(&self.shell.args)
            .arg(script)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        log_trace!("spawning: {:?}", cmd.as_std());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn '{}' for {}", self.shell, script.display()))?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed waiting on {}", script.display()))?;
        Ok(status.into())
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, script: &Path, args: &[String]) -> Result<RunStatus> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime")?;
        let status = rt.block_on(self.run_async(script, args))?;
        log_debug!("{} exited with {:?}", script.display(), status.code);
        Ok(status)
    }
}
