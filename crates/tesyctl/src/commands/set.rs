//! `set` command: one-shot writes to the heater.

use tesyctl_core::Coordinator;

use crate::cli::{GlobalOpts, SetArgs, SetCommand};
use crate::error::CliError;

pub async fn handle(
    coordinator: &Coordinator,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Writes need a validated snapshot for model-aware range checks.
    coordinator.start().await.map_err(CliError::from)?;

    let confirmation = match args.command {
        SetCommand::Temp { value } => {
            coordinator.set_target_temperature(value).await?;
            format!("target set to {value}")
        }
        SetCommand::Power { state } => {
            coordinator.set_power(state).await?;
            format!("power {}", on_off(state))
        }
        SetCommand::Boost { state } => {
            coordinator.set_boost(state).await?;
            format!("boost {}", on_off(state))
        }
        SetCommand::Mode { mode } => {
            let mode: tesyctl_core::Mode = mode.into();
            let text = mode.text();
            coordinator.set_operation_mode(mode).await?;
            format!("mode set to {text}")
        }
    };

    coordinator.shutdown().await;

    if !global.quiet {
        eprintln!("{confirmation}");
    }
    Ok(())
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
