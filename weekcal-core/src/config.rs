//! The weekcal configuration file.
//!
//! A `KEY="value"` file at `~/.config/weekcal/.env` holding the OAuth client,
//! the current tokens, the calendar id and UI colors. It is read once at
//! startup into a [`Config`]; afterwards only the token keys are rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use crate::credentials::Credentials;
use crate::error::ConfigError;

pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const CALENDAR_ID: &str = "CALENDAR_ID";
pub const COLOR_PRIMARY: &str = "COLOR_PRIMARY";
pub const COLOR_WARNING: &str = "COLOR_WARNING";
pub const COLOR_ERROR: &str = "COLOR_ERROR";
pub const PORT: &str = "PORT";

pub const DEFAULT_PORT: u16 = 8080;

const TEMPLATE: &[(&str, &str)] = &[
    (CLIENT_ID, "your-client-id.apps.googleusercontent.com"),
    (CLIENT_SECRET, "your-client-secret"),
    (CALENDAR_ID, "primary"),
    (ACCESS_TOKEN, ""),
    (REFRESH_TOKEN, ""),
    (COLOR_PRIMARY, "#6495ED"),
    (COLOR_WARNING, "#FFA500"),
    (COLOR_ERROR, "#FF0000"),
];

/// UI colors as written in the config (`#RRGGBB`, an ANSI index or a name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colors {
    pub primary: String,
    pub warning: String,
    pub error: String,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            primary: "#6495ED".into(),
            warning: "#FFA500".into(),
            error: "#FF0000".into(),
        }
    }
}

/// Everything read from the config file at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub credentials: Credentials,
    pub colors: Colors,
    pub port: u16,
}

impl Config {
    /// `~/.config/weekcal/.env` (platform equivalent).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("weekcal")
            .join(".env"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load the config at `path`.
    ///
    /// A missing file is replaced by a template and reported as
    /// [`ConfigError::Created`] so the caller can exit with instructions.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let template: Vec<(String, String)> = TEMPLATE
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            write_env_file(path, &template)?;
            return Err(ConfigError::Created(path.to_path_buf()));
        }

        let entries = read_env_file(path)?;
        let lookup = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string())
        };
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    key,
                })
        };

        let credentials = Credentials {
            access_token: lookup(ACCESS_TOKEN).unwrap_or_default(),
            refresh_token: lookup(REFRESH_TOKEN).unwrap_or_default(),
            client_id: required(CLIENT_ID)?,
            client_secret: required(CLIENT_SECRET)?,
            calendar_id: required(CALENDAR_ID)?,
        };

        let defaults = Colors::default();
        let colors = Colors {
            primary: lookup(COLOR_PRIMARY)
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.primary),
            warning: lookup(COLOR_WARNING)
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.warning),
            error: lookup(COLOR_ERROR)
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.error),
        };

        let port = match lookup(PORT).filter(|v| !v.is_empty()) {
            None => DEFAULT_PORT,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: PORT,
                value,
            })?,
        };

        Ok(Config {
            path: path.to_path_buf(),
            credentials,
            colors,
            port,
        })
    }
}

/// Read every `KEY=value` pair in file order.
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    iter.map(|entry| {
        entry.map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })
    .collect()
}

/// Write all pairs as `KEY="value"` lines, owner-readable only.
pub fn write_env_file(path: &Path, entries: &[(String, String)]) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let contents: String = entries
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"\n", k, escape(v)))
        .collect();

    fs::write(path, contents).map_err(io_err)?;

    // Set to owner-only (0600) since the file contains OAuth secrets:
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }

    Ok(())
}

/// Replace (or append) the given keys, keeping every other line as it was.
pub fn update_env_file(path: &Path, updates: &[(&str, &str)]) -> Result<(), ConfigError> {
    let mut entries = read_env_file(path)?;

    for (key, value) in updates {
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    write_env_file(path, &entries)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
