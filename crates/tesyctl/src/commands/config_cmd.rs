//! `config` command: profile management.

use tesyctl_core::WritePolicy;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| {
                    toml::to_string_pretty(c)
                        .unwrap_or_else(|e| format!("serialization error: {e}"))
                },
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set {
            name,
            host,
            api,
            heater_power,
            poll_interval,
            refresh_after_write,
            default,
        } => {
            let mut cfg = config::load_config_or_default();

            cfg.profiles.insert(
                name.clone(),
                Profile {
                    host,
                    api: api.into(),
                    heater_power_watts: heater_power,
                    poll_interval_secs: poll_interval,
                    timeout_secs: None,
                    write_policy: if refresh_after_write {
                        WritePolicy::RefreshAfterWrite
                    } else {
                        WritePolicy::MergeAck
                    },
                },
            );
            if default || cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("profile '{name}' saved");
            }
            Ok(())
        }

        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config_or_default();
            if cfg.profiles.remove(&name).is_none() {
                return Err(CliError::ProfileNotFound { name });
            }
            if cfg.default_profile.as_deref() == Some(&name) {
                cfg.default_profile = None;
            }
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("profile '{name}' removed");
            }
            Ok(())
        }
    }
}
