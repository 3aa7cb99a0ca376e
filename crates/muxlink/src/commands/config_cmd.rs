//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;

use muxlink_config::{Config, ConfigError, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: &str) -> CliError {
    let mut available: Vec<String> = cfg.profiles.keys().cloned().collect();
    available.sort();
    ConfigError::ProfileNotFound {
        name: name.into(),
        available,
    }
    .into()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply one `config set` key to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "host" => profile.host = value,
        "username" => profile.username = value,
        "system_id" | "system-id" => {
            profile.system_id = parse_value(key, &value, "a non-negative number")?;
        }
        "polling" => profile.polling = parse_value(key, &value, "'true' or 'false'")?,
        "poll_interval_secs" | "poll-interval" => {
            profile.poll_interval_secs = parse_value(key, &value, "a number (seconds)")?;
        }
        "timeout_secs" | "timeout" => {
            profile.timeout_secs = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "password_env" | "password-env" => profile.password_env = Some(value),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: host, username, system_id, \
                     polling, poll_interval_secs, timeout_secs, password_env"
                ),
            });
        }
    }
    Ok(())
}

/// Resolved view of a profile, with the password reduced to its source.
#[derive(Serialize)]
struct ProfileView {
    profile: String,
    host: String,
    username: String,
    system_id: u32,
    polling: bool,
    poll_interval_secs: u64,
    timeout_secs: u64,
    password: String,
}

fn detail(v: &ProfileView) -> String {
    [
        format!("Profile:       {}", v.profile),
        format!("Host:          {}", v.host),
        format!("Username:      {}", v.username),
        format!("System ID:     {}", v.system_id),
        format!("Polling:       {}", if v.polling { "on" } else { "off" }),
        format!("Poll interval: {}s", v.poll_interval_secs),
        format!("Timeout:       {}s", v.timeout_secs),
        format!("Password:      {}", v.password),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = muxlink_config::load_config()?;
            let (name, profile) = config::resolve_profile(&cfg, global)?;
            let password = match muxlink_config::resolve_password(&profile, &name) {
                Ok((_, source)) => format!("set ({source})"),
                Err(_) => "(not set)".into(),
            };

            let view = ProfileView {
                host: profile.host,
                username: profile.username,
                system_id: profile.system_id,
                polling: profile.polling,
                poll_interval_secs: profile.poll_interval_secs,
                timeout_secs: profile.timeout_secs.unwrap_or(cfg.defaults.timeout),
                password,
                profile: name,
            };
            let out = output::render_single(&global.output, &view, detail, |v| v.profile.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &muxlink_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = muxlink_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .get_mut(&profile_name)
                .ok_or_else(|| CliError::NoConfig {
                    path: muxlink_config::config_path().display().to_string(),
                })?;

            set_profile_key(profile, &key, value)?;
            muxlink_config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = muxlink_config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: muxlink config init");
                return Ok(());
            }
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let out = names
                .into_iter()
                .map(|name| {
                    let marker = if name == default { " *" } else { "" };
                    format!("{name}{marker}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = muxlink_config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, &name));
            }

            cfg.default_profile = Some(name.clone());
            muxlink_config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = muxlink_config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, &profile_name));
            }

            let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            muxlink_config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password for '{profile_name}' stored in system keyring");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = muxlink_config::config_path();
    eprintln!("muxlink configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let host: String = Input::new()
        .with_prompt("Appliance host or IP")
        .default("192.168.168.50".into())
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let system_id: u32 = Input::new()
        .with_prompt("System ID")
        .default(0)
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let plaintext = if store_selection == 0 {
        muxlink_config::store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let mut profile = Profile::new(host);
    profile.username = username;
    profile.system_id = system_id;
    profile.password = plaintext;

    let mut cfg = muxlink_config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    let written = muxlink_config::save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: muxlink devices");
    Ok(())
}
