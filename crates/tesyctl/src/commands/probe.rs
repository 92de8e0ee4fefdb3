//! `probe` command: diagnostic endpoint discovery on modern firmwares.
//!
//! Probing talks straight to the WiFi module's ancillary paths and does
//! not need a validated snapshot, so no poll loop is started.

use tabled::Tabled;

use tesyctl_core::Coordinator;

use crate::cli::{GlobalOpts, OutputFormat, ProbeArgs, ProbeCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Status")]
    status: u16,
    #[tabled(rename = "Type")]
    content_type: String,
    #[tabled(rename = "Bytes")]
    length: usize,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: ProbeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProbeCommand::Discover => {
            let report = coordinator.discover_diagnostics().await?;

            match global.output {
                OutputFormat::Table => {
                    let out = output::render_list(
                        &global.output,
                        &report.endpoints,
                        |hit| EndpointRow {
                            path: hit.path.clone(),
                            status: hit.status,
                            content_type: hit.content_type.clone(),
                            length: hit.content_length,
                        },
                        |hit| hit.path.clone(),
                    );
                    output::print_output(&out, global.quiet);
                    if !global.quiet {
                        eprintln!(
                            "{} endpoints answered; use -o json for the full report",
                            report.endpoint_count()
                        );
                    }
                }
                _ => {
                    let out = output::render_single(
                        &global.output,
                        &report,
                        |_| String::new(),
                        |r| format!("{} endpoints", r.endpoint_count()),
                    );
                    output::print_output(&out, global.quiet);
                }
            }
            Ok(())
        }

        ProbeCommand::System => print_bucket(coordinator.system_info().await?, global),
        ProbeCommand::Wifi => print_bucket(coordinator.wifi_info().await?, global),
        ProbeCommand::Fs => print_bucket(coordinator.filesystem_info().await?, global),

        ProbeCommand::Endpoint { path } => {
            let report = coordinator.fetch_endpoint(&path).await?;

            match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    if !global.quiet {
                        println!("HTTP {} ({} bytes)", report.status, report.content_length);
                        println!("{}", report.body);
                    }
                }
                _ => {
                    let out = output::render_single(
                        &global.output,
                        &report,
                        |_| String::new(),
                        |r| r.path.clone(),
                    );
                    output::print_output(&out, global.quiet);
                }
            }
            Ok(())
        }
    }
}

/// Focused sweeps return a flat JSON map; tables add nothing here, so
/// every format renders the JSON.
fn print_bucket(
    bucket: serde_json::Map<String, serde_json::Value>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match global.output {
        OutputFormat::JsonCompact => output::render_json_compact(&bucket),
        _ => output::render_json_pretty(&bucket),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
