//! Profile selection and CLI flag overrides.
//!
//! The TOML layer lives in `muxlink-config`; this module only decides which
//! profile is active and lays the global flags over it before handing a
//! `SessionConfig` to the core.

use muxlink_config::{Config, ConfigError, Profile};
use muxlink_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Pick the profile to use and apply flag overrides.
///
/// An explicitly requested profile must exist. Without one, a bare
/// `--host` is enough to build an ad-hoc profile.
pub fn resolve_profile(config: &Config, global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let (name, mut profile) = match config.profile(global.profile.as_deref()) {
        Ok((name, profile)) => (name, profile.clone()),
        Err(err @ ConfigError::ProfileNotFound { .. }) if global.profile.is_some() => {
            return Err(err.into());
        }
        Err(_) => {
            let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
                path: muxlink_config::config_path().display().to_string(),
            })?;
            (active_profile_name(global, config), Profile::new(host))
        }
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if let Some(system_id) = global.system_id {
        profile.system_id = system_id;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout_secs = Some(timeout);
    }

    Ok((name, profile))
}

/// Load the config file and build the session config for this invocation.
pub fn session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let config = muxlink_config::load_config()?;
    let (name, profile) = resolve_profile(&config, global)?;
    tracing::debug!(profile = %name, host = %profile.host, "resolved profile");

    Ok(muxlink_config::profile_to_session_config(
        &profile,
        &name,
        &config.defaults,
    )?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["muxlink"];
        argv.extend_from_slice(args);
        argv.push("devices");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, host: &str) -> Config {
        let mut config = Config {
            default_profile: Some(name.into()),
            ..Config::default()
        };
        config.profiles.insert(name.into(), Profile::new(host));
        config
    }

    #[test]
    fn flags_override_the_default_profile() {
        let config = config_with("lab", "192.168.168.50");
        let (name, profile) = resolve_profile(
            &config,
            &global(&["--host", "10.0.0.9", "-u", "operator", "--system-id", "3", "--timeout", "4"]),
        )
        .unwrap();

        assert_eq!(name, "lab");
        assert_eq!(profile.host, "10.0.0.9");
        assert_eq!(profile.username, "operator");
        assert_eq!(profile.system_id, 3);
        assert_eq!(profile.timeout_secs, Some(4));
    }

    #[test]
    fn missing_explicit_profile_is_an_error() {
        let config = config_with("lab", "192.168.168.50");
        let err = resolve_profile(&config, &global(&["-p", "studio", "--host", "10.0.0.9"]))
            .unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "studio"));
    }

    #[test]
    fn host_flag_alone_builds_an_ad_hoc_profile() {
        let (name, profile) =
            resolve_profile(&Config::default(), &global(&["--host", "10.0.0.9"])).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.host, "10.0.0.9");
        assert_eq!(profile.username, "admin");
    }

    #[test]
    fn nothing_configured_asks_for_config() {
        let err = resolve_profile(&Config::default(), &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
