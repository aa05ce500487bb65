use clap::Parser;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[macro_use]
mod utils;
mod cmd;
mod runner;

use cmd::{CommandTable, Dispatcher};
use cmd::dispatch::{DispatchError, EXIT_FAILURE, report};
use runner::{DEFAULT_SHELL, ShellRunner};

/// Aurora - launcher for the deploy / destroy scripts.
///
///   aurora deploy  [ARGS...]   runs <install>/../deploy/deploy.sh
///   aurora destroy [ARGS...]   runs <install>/../deploy/destroy.sh
///
/// Scripts run through the shell (default: bash) with the terminal handed
/// over to them. Any failure exits with code 1.
///
/// There is no --help / --version: anything that is not a known command is
/// answered with the list of available commands.
#[derive(Parser, Debug)]
#[command(
    name = "aurora",
    version,
    about = "Aurora - launcher for the deploy / destroy scripts",
    verbatim_doc_comment,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Shell used to run the scripts (shell-style string, e.g. "bash -e")
    #[arg(long, value_name = "SHELL", default_value = DEFAULT_SHELL)]
    shell: String,

    /// Command to run (deploy, destroy)
    #[arg(value_name = "COMMAND")]
    command: Option<String>,

    /// Arguments passed through to the script
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

impl Cli {
    /// Subcommand followed by its forwarded arguments, as the dispatcher expects.
    fn dispatch_args(&self) -> Vec<String> {
        self.command
            .iter()
            .chain(self.args.iter())
            .cloned()
            .collect()
    }
}

/// Parse argv. A parse error means the leading arguments are not a known
/// command, so it is reported as one (exit 1) instead of with clap's text.
fn parse_cli<I, T, W>(
    argv: I,
    table: &CommandTable,
    use_color: bool,
    diag: &mut W,
) -> Result<Cli, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    Cli::try_parse_from(argv).map_err(|e| {
        log_debug!("argument parsing failed: {:?}", e.kind());
        report(
            table,
            &DispatchError::UnrecognizedCommand,
            use_color,
            diag,
        )
    })
}

fn main() -> ExitCode {
    let table = CommandTable::builtin();
    let use_color = utils::output::color_enabled();
    let cli = match parse_cli(std::env::args_os(), &table, use_color, &mut std::io::stderr()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let shell = match runner::parse_shell(&cli.shell) {
        Ok(s) => s,
        Err(e) => {
            log_error!("Invalid shell '{}': {e}", cli.shell);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    // An unresolvable install location fails the command after validation.
    let base_dir = cmd::install_dir().unwrap_or_else(|e| {
        log_warn!("{e:#}");
        PathBuf::new()
    });
    log_debug!("install dir: {}, shell: {}", base_dir.display(), shell);

    let dispatcher =
        Dispatcher::new(table, base_dir, ShellRunner::new(shell)).with_color(use_color);
    log_trace!("commands: {}", dispatcher.table());

    let code = dispatcher.run(&cli.dispatch_args(), &mut std::io::stderr());
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_bare_command() {
        let cli = Cli::try_parse_from(["aurora", "deploy"]).unwrap();
        assert_eq!(cli.dispatch_args(), vec!["deploy"]);
        assert_eq!(cli.shell, "bash");
    }

    #[test]
    fn clap_parses_no_command() {
        let cli = Cli::try_parse_from(["aurora"]).unwrap();
        assert!(cli.dispatch_args().is_empty());
    }

    #[test]
    fn clap_keeps_unknown_command_for_dispatcher() {
        let cli = Cli::try_parse_from(["aurora", "launch"]).unwrap();
        assert_eq!(cli.command.as_deref(), Some("launch"));
    }

    #[test]
    fn clap_forwards_trailing_args() {
        let cli =
            Cli::try_parse_from(["aurora", "-v", "destroy", "--force", "-y", "prod"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.dispatch_args(), vec!["destroy", "--force", "-y", "prod"]);
    }

    #[test]
    fn clap_shell_and_quiet_flags() {
        let cli = Cli::try_parse_from(["aurora", "-q", "--shell", "bash -e", "deploy"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.shell, "bash -e");
        assert_eq!(cli.command.as_deref(), Some("deploy"));
    }

    fn parse_capture(argv: &[&str]) -> (Result<Cli, u8>, String) {
        let mut diag = Vec::new();
        let res = parse_cli(argv.iter().copied(), &CommandTable::builtin(), false, &mut diag);
        (res, String::from_utf8(diag).unwrap())
    }

    fn assert_unknown(argv: &[&str]) {
        let (res, out) = parse_capture(argv);
        assert_eq!(res.err(), Some(1), "{argv:?} should exit 1");
        assert!(
            out.starts_with("Unknown command or no command provided.\n"),
            "{argv:?}: {out}"
        );
        assert!(out.contains("deploy, destroy"));
    }

    #[test]
    fn help_and_version_flags_are_unknown_commands() {
        assert_unknown(&["aurora", "--help"]);
        assert_unknown(&["aurora", "-h"]);
        assert_unknown(&["aurora", "--version"]);
        assert_unknown(&["aurora", "-V"]);
    }

    #[test]
    fn hyphen_prefixed_first_arg_is_unknown_command() {
        assert_unknown(&["aurora", "-launch"]);
        assert_unknown(&["aurora", "--deploy"]);
        assert_unknown(&["aurora", "--shell"]);
    }

    #[test]
    fn known_command_parses_without_diagnostic() {
        let (res, out) = parse_capture(&["aurora", "deploy", "--help"]);
        assert!(out.is_empty());
        assert_eq!(res.unwrap().dispatch_args(), vec!["deploy", "--help"]);
    }
}
