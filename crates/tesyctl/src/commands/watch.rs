//! `watch` command: keep polling and print each update until
//! interrupted.

use std::time::Duration;

use owo_colors::OwoColorize;

use tesyctl_core::{Coordinator, Health, decode};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    coordinator: &Coordinator,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    coordinator.set_poll_interval(Duration::from_secs(args.interval));
    coordinator.start().await.map_err(CliError::from)?;

    let mut snapshots = coordinator.snapshots();
    let mut health = coordinator.health();
    let color = output::should_color(&global.color);
    let mut remaining = args.count;

    // The validating fetch already produced the first snapshot.
    print_update(coordinator, global, color);
    if consume(&mut remaining) {
        coordinator.shutdown().await;
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                print_update(coordinator, global, color);
                if consume(&mut remaining) {
                    break;
                }
            }
            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                if *health.borrow_and_update() == Health::Stale && !global.quiet {
                    let line = format!("{} device unreachable, retrying", timestamp());
                    if color {
                        eprintln!("{}", line.yellow());
                    } else {
                        eprintln!("{line}");
                    }
                }
            }
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

/// Decrement the remaining-update budget; `true` when exhausted.
fn consume(remaining: &mut Option<u32>) -> bool {
    match remaining {
        Some(n) => {
            *n = n.saturating_sub(1);
            *n == 0
        }
        None => false,
    }
}

fn print_update(coordinator: &Coordinator, global: &GlobalOpts, color: bool) {
    if global.quiet {
        return;
    }
    let Some(snapshot) = coordinator.current_snapshot() else {
        return;
    };

    match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let out = output::render_json_compact(&*snapshot);
            output::print_output(&out, global.quiet);
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let temp = decode::current_temperature(&snapshot)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".into());
            let target = decode::target_temperature(&snapshot)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".into());
            let mode = decode::mode_text(&snapshot).unwrap_or_else(|| "?".into());
            let heating = match decode::is_heating(&snapshot) {
                Some(true) => "heating",
                Some(false) => "idle",
                None => "?",
            };

            let line = format!(
                "{} temp={temp} target={target} mode={mode} {heating}",
                timestamp()
            );
            if color && heating == "heating" {
                println!("{}", line.red());
            } else {
                println!("{line}");
            }
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
