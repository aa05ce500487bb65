/*!
CommandTable: subcommand name -> script filename.

The built-in table has exactly two entries (`deploy`, `destroy`). The
dispatcher receives a table by value, so tests can hand it a different one.

Helpers:
  - builtin() / from_entries()
  - lookup()
  - names() / usage_line()
*/

use std::fmt;

/// Directory (sibling of the executable's directory) holding the scripts.
pub const SCRIPTS_DIR: &str = "deploy";

/// Immutable, ordered mapping from subcommand name to script filename.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandTable {
    entries: Vec<(String, String)>,
}

impl CommandTable {
    /// The launcher's own table.
    pub fn builtin() -> Self {
        Self::from_entries([("deploy", "deploy.sh"), ("destroy", "destroy.sh")])
    }

    /// Build a table from `(name, script)` pairs. Order is kept for help display.
    /// Empty names are dropped; a later duplicate never shadows the first entry.
    pub fn from_entries<I, N, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut out: Vec<(String, String)> = Vec::new();
        for (name, script) in entries {
            let name = name.into();
            if name.is_empty() || out.iter().any(|(n, _)| *n == name) {
                continue;
            }
            out.push((name, script.into()));
        }
        Self { entries: out }
    }

    /// Exact, case-sensitive lookup of the script for `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_str())
    }

    /// Subcommand names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// The usage hint printed after an unknown command.
    pub fn usage_line(&self) -> String {
        format!("Available commands: {self}")
    }
}

impl fmt::Display for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(", "))
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::CommandTable;

    #[test]
    fn builtin_has_two_entries_in_order() {
        let t = CommandTable::builtin();
        assert_eq!(t.names().count(), 2);
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["deploy", "destroy"]);
        assert_eq!(t.lookup("deploy"), Some("deploy.sh"));
        assert_eq!(t.lookup("destroy"), Some("destroy.sh"));
    }

    #[test]
    fn lookup_is_exact() {
        let t = CommandTable::builtin();
        assert_eq!(t.lookup("Deploy"), None);
        assert_eq!(t.lookup(" deploy"), None);
        assert_eq!(t.lookup("launch"), None);
        assert_eq!(t.lookup(""), None);
    }

    #[test]
    fn usage_line_lists_names() {
        assert_eq!(
            CommandTable::builtin().usage_line(),
            "Available commands: deploy, destroy"
        );
    }

    #[test]
    fn from_entries_skips_empty_and_duplicates() {
        let t = CommandTable::from_entries([("a", "a.sh"), ("", "x.sh"), ("a", "other.sh")]);
        assert_eq!(t.names().count(), 1);
        assert_eq!(t.lookup("a"), Some("a.sh"));
    }
}
