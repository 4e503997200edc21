//! Configuration loading for Crewbook.
//!
//! Reads `~/.crewbook/config.toml`. Every section is optional:
//!
//! ```toml
//! [startup]
//! lookup_timeout_ms = 3000
//! fallback = "sign_in"
//!
//! [roster]
//! path = "${HOME}/crewbook/users.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use crewbook_core::StartupPolicy;
use crewbook_types::StartDestination;

/// Overrides `[startup] lookup_timeout_ms` when set to a valid integer.
pub const LOOKUP_TIMEOUT_ENV: &str = "CREWBOOK_LOOKUP_TIMEOUT_MS";

#[derive(Debug, Default, Deserialize)]
pub struct CrewbookConfig {
    pub startup: Option<StartupConfig>,
    pub roster: Option<RosterConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartupConfig {
    /// How long the user-count lookup may run before the fallback is used.
    pub lookup_timeout_ms: Option<u64>,
    /// Destination used when the lookup fails or times out.
    pub fallback: Option<StartDestination>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RosterConfig {
    /// JSON array of registered users. `${VAR}` references are expanded.
    pub path: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl CrewbookConfig {
    /// Load the user config. `Ok(None)` when there is no home dir or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Startup policy from config, with the timeout env override applied.
    #[must_use]
    pub fn startup_policy(&self) -> StartupPolicy {
        self.startup_policy_with(|key| env::var(key).ok())
    }

    fn startup_policy_with(&self, lookup: impl Fn(&str) -> Option<String>) -> StartupPolicy {
        let defaults = StartupPolicy::default();
        let startup = self.startup.as_ref();

        let configured_ms = startup.and_then(|s| s.lookup_timeout_ms);
        let env_ms = lookup(LOOKUP_TIMEOUT_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring invalid {LOOKUP_TIMEOUT_ENV}");
                None
            }
        });

        let lookup_timeout = env_ms
            .or(configured_ms)
            .map_or(defaults.lookup_timeout, Duration::from_millis);
        let fallback = startup
            .and_then(|s| s.fallback)
            .unwrap_or(defaults.fallback);

        StartupPolicy {
            lookup_timeout,
            fallback,
        }
    }

    /// Roster file location, if configured.
    #[must_use]
    pub fn roster_path(&self) -> Option<PathBuf> {
        self.roster_path_with(|key| env::var(key).ok())
    }

    fn roster_path_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        let raw = self.roster.as_ref()?.path.as_deref()?;
        let expanded = expand_vars(raw, lookup);
        if expanded.trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(expanded))
    }
}

/// Replace `${VAR}` with the looked-up value; unknown variables become empty.
fn expand_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&lookup(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".crewbook").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn expand_vars_no_vars() {
        assert_eq!(expand_vars("hello world", no_env), "hello world");
    }

    #[test]
    fn expand_vars_replaces_known_and_blanks_unknown() {
        let lookup = |key: &str| (key == "ROOT").then(|| "/data".to_string());
        assert_eq!(
            expand_vars("${ROOT}/users.json", lookup),
            "/data/users.json"
        );
        assert_eq!(expand_vars("a${MISSING}b", lookup), "ab");
        assert_eq!(expand_vars("${ROOT}-${ROOT}", lookup), "/data-/data");
    }

    #[test]
    fn expand_vars_keeps_unterminated_reference() {
        assert_eq!(expand_vars("x${OPEN", no_env), "x${OPEN");
        assert_eq!(expand_vars("${}", no_env), "");
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = CrewbookConfig::load_from(file.path()).unwrap();
        assert!(config.startup.is_none());
        assert!(config.roster.is_none());

        let policy = config.startup_policy_with(no_env);
        assert_eq!(policy, StartupPolicy::default());
        assert_eq!(config.roster_path_with(no_env), None);
    }

    #[test]
    fn parses_startup_and_roster_sections() {
        let file = write_config(
            r#"
[startup]
lookup_timeout_ms = 1500
fallback = "register"

[roster]
path = "${CREW_HOME}/users.json"
"#,
        );
        let config = CrewbookConfig::load_from(file.path()).unwrap();
        let policy = config.startup_policy_with(no_env);
        assert_eq!(policy.lookup_timeout, Duration::from_millis(1500));
        assert_eq!(policy.fallback, StartDestination::Register);

        let lookup = |key: &str| (key == "CREW_HOME").then(|| "/srv/crew".to_string());
        assert_eq!(
            config.roster_path_with(lookup),
            Some(PathBuf::from("/srv/crew/users.json"))
        );
    }

    #[test]
    fn env_overrides_timeout() {
        let file = write_config("[startup]\nlookup_timeout_ms = 1500\n");
        let config = CrewbookConfig::load_from(file.path()).unwrap();

        let lookup = |key: &str| (key == LOOKUP_TIMEOUT_ENV).then(|| "250".to_string());
        let policy = config.startup_policy_with(lookup);
        assert_eq!(policy.lookup_timeout, Duration::from_millis(250));

        let lookup = |key: &str| (key == LOOKUP_TIMEOUT_ENV).then(|| "soon".to_string());
        let policy = config.startup_policy_with(lookup);
        assert_eq!(policy.lookup_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn fallback_accepts_destination_aliases() {
        for (alias, expected) in [
            ("login", StartDestination::SignIn),
            ("signin", StartDestination::SignIn),
            ("signup", StartDestination::Register),
            ("sign_up", StartDestination::Register),
        ] {
            let file = write_config(&format!("[startup]\nfallback = \"{alias}\"\n"));
            let config = CrewbookConfig::load_from(file.path()).unwrap();
            assert_eq!(config.startup_policy_with(no_env).fallback, expected, "{alias}");
            assert_eq!(StartDestination::parse(alias), Some(expected));
        }
    }

    #[test]
    fn unknown_fallback_is_a_parse_error() {
        let file = write_config("[startup]\nfallback = \"dashboard\"\n");
        let err = CrewbookConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), file.path());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = CrewbookConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn blank_roster_path_is_none() {
        let file = write_config("[roster]\npath = \"${UNSET}\"\n");
        let config = CrewbookConfig::load_from(file.path()).unwrap();
        assert_eq!(config.roster_path_with(no_env), None);
    }
}
