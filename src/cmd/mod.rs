/*!
Command dispatch.

Layout:
  src/cmd/
    mod.rs       (this file)
    table.rs     (CommandTable: subcommand -> script filename)
    dispatch.rs  (Dispatcher + DispatchError)

Conventions:
  - The table, install directory and process runner are all handed to the
    `Dispatcher`; nothing here reads ambient state except `install_dir()`.
  - User-facing failures are a single line on the diagnostic stream and
    exit code 1. Details go to the debug log only.
*/

pub mod dispatch;
pub mod table;

pub use dispatch::{Dispatcher, install_dir};
pub use table::CommandTable;
