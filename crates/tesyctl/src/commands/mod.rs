//! Command dispatch: bridges CLI args -> coordinator calls -> output
//! formatting.

pub mod config_cmd;
pub mod probe;
pub mod set;
pub mod status;
pub mod watch;

use tesyctl_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(coordinator, args, global).await,
        Command::Watch(args) => watch::handle(coordinator, args, global).await,
        Command::Set(args) => set::handle(coordinator, args, global).await,
        Command::Probe(args) => probe::handle(coordinator, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
