//! CLI configuration: TOML profiles with environment overrides.
//!
//! Profiles live in a single TOML file resolved via XDG / platform
//! conventions. `GlobalOpts` flags override profile values, and a bare
//! `--host` works with no config file at all.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use tesyctl_core::{ApiVariant, HeaterConfig, WritePolicy, config as core_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named heater profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// A named heater profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Heater host or IP, e.g. "192.168.1.40".
    pub host: String,

    /// API generation.
    #[serde(default)]
    pub api: ApiVariant,

    /// Nominal element power in watts.
    pub heater_power_watts: Option<u32>,

    /// Poll interval in seconds.
    pub poll_interval_secs: Option<u64>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Local-state behavior after writes.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tesyctl", "tesyctl").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("tesyctl");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("TESYCTL_").split("_"));

    figment.extract().map_err(|e| CliError::Config {
        message: e.to_string(),
    })
}

/// Load config, returning a default if the file doesn't exist or is
/// malformed.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg).map_err(|e| CliError::Config {
        message: e.to_string(),
    })?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `HeaterConfig` from the config file, profile, and CLI flag
/// overrides. A bare `--host` works without any profile.
pub fn resolve_heater_config(global: &GlobalOpts) -> Result<HeaterConfig, CliError> {
    resolve_with(&load_config_or_default(), global)
}

fn resolve_with(config: &Config, global: &GlobalOpts) -> Result<HeaterConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let profile = match config.profiles.get(&profile_name) {
        Some(profile) => Some(profile),
        // An explicitly named profile must exist; the implicit default
        // may be absent when --host is given.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound { name: profile_name });
        }
        None => None,
    };

    let host = global
        .host
        .clone()
        .or_else(|| profile.map(|p| p.host.clone()))
        .ok_or(CliError::NoHost)?;

    let mut cfg = HeaterConfig::new(host);

    if let Some(profile) = profile {
        cfg.api = profile.api;
        cfg.write_policy = profile.write_policy;
        if let Some(watts) = profile.heater_power_watts {
            cfg.heater_power_watts = watts;
        }
        if let Some(secs) = profile.poll_interval_secs {
            cfg.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = profile.timeout_secs {
            cfg.timeout = Duration::from_secs(secs);
        }
    }

    // CLI flags override profile values, but only when actually given.
    if let Some(api) = global.api {
        cfg.api = api.into();
    }
    if let Some(watts) = global.heater_power {
        cfg.heater_power_watts = watts;
    }
    if let Some(secs) = global.timeout {
        cfg.timeout = Duration::from_secs(secs);
    }

    cfg.poll_interval = core_config::clamp_poll_interval(cfg.poll_interval);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn bare_global(host: Option<&str>, profile: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            profile: profile.map(str::to_owned),
            host: host.map(str::to_owned),
            api: None,
            heater_power: None,
            output: crate::cli::OutputFormat::Table,
            color: crate::cli::ColorMode::Never,
            verbose: 0,
            quiet: false,
            timeout: None,
        }
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        Config {
            default_profile: Some(name.into()),
            profiles: HashMap::from([(name.to_owned(), profile)]),
        }
    }

    #[test]
    fn bare_host_needs_no_profile() {
        let cfg = resolve_heater_config(&bare_global(Some("10.0.0.9"), None)).unwrap();
        assert_eq!(cfg.host, "10.0.0.9");
        assert_eq!(cfg.api, ApiVariant::Modern);
    }

    #[test]
    fn named_profile_must_exist() {
        let err = resolve_heater_config(&bare_global(Some("10.0.0.9"), Some("garage")));
        assert!(matches!(err, Err(CliError::ProfileNotFound { .. })));
    }

    #[test]
    fn profile_timeout_survives_unless_the_flag_is_given() {
        let config = config_with(
            "attic",
            Profile {
                host: "192.168.1.40".into(),
                api: ApiVariant::Modern,
                heater_power_watts: None,
                poll_interval_secs: None,
                timeout_secs: Some(4),
                write_policy: WritePolicy::MergeAck,
            },
        );

        let cfg = resolve_with(&config, &bare_global(None, None)).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(4));

        let mut global = bare_global(None, None);
        global.timeout = Some(2);
        let cfg = resolve_with(&config, &global).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(2));
    }

    #[test]
    fn profile_round_trips_through_toml() {
        let profile = Profile {
            host: "192.168.1.40".into(),
            api: ApiVariant::Legacy,
            heater_power_watts: Some(3000),
            poll_interval_secs: Some(60),
            timeout_secs: None,
            write_policy: WritePolicy::RefreshAfterWrite,
        };
        let toml_str = toml::to_string(&profile).unwrap();
        let back: Profile = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.host, profile.host);
        assert_eq!(back.api, ApiVariant::Legacy);
        assert_eq!(back.write_policy, WritePolicy::RefreshAfterWrite);
    }
}
