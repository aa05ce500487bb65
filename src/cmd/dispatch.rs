/*!
`dispatch.rs`

The command dispatcher: subcommand name -> script path -> child process.

Flow for `run(args)`:
  1. first arg is the subcommand; missing / empty / not in the table is an
     `UnrecognizedCommand` and nothing is executed
  2. script path = `<base_dir>/../deploy/<script>` (never the caller's cwd)
  3. `<shell> <script> [rest of args]` runs with inherited stdio
  4. non-zero exit, signal death or spawn failure -> `ChildExecutionFailure`

Both failures exit with code 1 and print one line (plus the usage hint for
an unknown command) to the diagnostic stream.
*/

use anyhow::{Context, Result};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::table::{CommandTable, SCRIPTS_DIR};
use crate::runner::ProcessRunner;
use crate::utils::monotonic_ms;
use crate::utils::output::{Color, color_if};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/* -------------------------------------------------------------------------- */
/* Errors                                                                     */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No subcommand, or one that is not in the table.
    UnrecognizedCommand,
    /// The script could not be started or exited unsuccessfully.
    ChildExecutionFailure { name: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnrecognizedCommand => {
                f.write_str("Unknown command or no command provided.")
            }
            DispatchError::ChildExecutionFailure { name } => {
                write!(f, "Command \"{name}\" failed.")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/* -------------------------------------------------------------------------- */
/* Install location                                                           */
/* -------------------------------------------------------------------------- */

/// Directory containing the running executable.
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable path has no parent: {}", exe.display()))
}

/* -------------------------------------------------------------------------- */
/* Dispatcher                                                                 */
/* -------------------------------------------------------------------------- */

#[derive(Debug)]
pub struct Dispatcher<R> {
    table: CommandTable,
    base_dir: PathBuf,
    runner: R,
    use_color: bool,
}

impl<R: ProcessRunner> Dispatcher<R> {
    /// `base_dir` must be absolute; a relative one would make resolution
    /// depend on the working directory, so every command then fails.
    pub fn new(table: CommandTable, base_dir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            table,
            base_dir: base_dir.into(),
            runner,
            use_color: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Resolve `name` to its absolute script path without running anything.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, DispatchError> {
        let script = self
            .table
            .lookup(name)
            .ok_or(DispatchError::UnrecognizedCommand)?;
        if !self.base_dir.is_absolute() {
            log_debug!(
                "install directory '{}' is not absolute",
                self.base_dir.display()
            );
            return Err(DispatchError::ChildExecutionFailure {
                name: name.to_string(),
            });
        }
        Ok(self.base_dir.join("..").join(SCRIPTS_DIR).join(script))
    }

    /// Validate, resolve and execute. `args[0]` is the subcommand; the rest
    /// are forwarded to the script.
    pub fn dispatch(&self, args: &[String]) -> Result<(), DispatchError> {
        let Some((name, rest)) = args.split_first() else {
            return Err(DispatchError::UnrecognizedCommand);
        };
        let script = self.resolve(name)?;
        let failed = || DispatchError::ChildExecutionFailure { name: name.clone() };

        log_info!("{name}: {}", script.display());
        let started = monotonic_ms();
        match self.runner.run(&script, rest) {
            Ok(status) if status.success() => {
                log_debug!("{name} finished in {} ms", monotonic_ms() - started);
                Ok(())
            }
            Ok(status) => {
                log_debug!("{name} exited with {:?}", status.code);
                Err(failed())
            }
            Err(e) => {
                log_debug!("{name} could not be started: {e:#}");
                Err(failed())
            }
        }
    }

    /// Run the command and report any failure to `diag`. Returns the process
    /// exit code (0 or 1).
    pub fn run<W: Write>(&self, args: &[String], diag: &mut W) -> u8 {
        match self.dispatch(args) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => report(&self.table, &e, self.use_color, diag),
        }
    }
}

/// Write the one-line diagnostic for `err` (plus the usage line for an
/// unknown command) and return the exit code.
pub fn report<W: Write>(
    table: &CommandTable,
    err: &DispatchError,
    use_color: bool,
    diag: &mut W,
) -> u8 {
    let _ = writeln!(diag, "{}", color_if(use_color, Color::Red, err.to_string()));
    if matches!(err, DispatchError::UnrecognizedCommand) {
        let _ = writeln!(
            diag,
            "{}",
            color_if(use_color, Color::Bold, table.usage_line())
        );
    }
    EXIT_FAILURE
}

/* --------------------------------- Tests ---------------------------------- */
