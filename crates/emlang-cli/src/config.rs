//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, environment, working directory,
//! system directory) and writing the default configuration file.

use std::{
    env,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use emlang::{EmlangError, config::AppConfig};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "EMLANG_CONFIG";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".emlang.toml";

/// Contents written by `emlang init`.
pub const DEFAULT_CONFIG: &str = r##"# Emlang configuration file

[lint]
# Rules whose issues are not reported.
# ignore = ["command-without-event", "orphan-exception", "slice-missing-event"]

[fmt]
# Element key style used by `emlang fmt`: "long" or "short".
# keys = "long"

[diagram.css]
# CSS custom property overrides for HTML diagrams.
# "--text-color" = "#212529"
# "--border-color" = "#ced4da"
# "--trigger-color" = "#e9ecef"
# "--command-color" = "#a5d8ff"
# "--event-color" = "#ffd8a8"
# "--exception-color" = "#ffc9c9"
# "--view-color" = "#b2f2bb"

[diagram.serve]
# Live-reload server started by `emlang diagram --serve`.
# address = "127.0.0.1"
# port = 8274

[repl]
# Server started by `emlang repl`.
# address = "127.0.0.1"
# port = 8275
"##;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Configuration file already exists: {0}")]
    AlreadyExists(PathBuf),
}

impl From<ConfigError> for EmlangError {
    fn from(err: ConfigError) -> Self {
        EmlangError::Config(err.to_string())
    }
}

/// Candidate configuration locations, in search order.
#[derive(Debug, Default)]
struct SearchPaths {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    local: PathBuf,
    system: Option<PathBuf>,
}

impl SearchPaths {
    fn from_environment(explicit: Option<&str>) -> Self {
        let system = match ProjectDirs::from("org", "emlang", "emlang") {
            Some(proj_dirs) => Some(proj_dirs.config_dir().join("config.toml")),
            None => {
                debug!("Could not determine platform-specific config directory");
                None
            }
        };

        Self {
            explicit: explicit.map(PathBuf::from),
            env: env::var_os(CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            local: PathBuf::from(LOCAL_CONFIG),
            system,
        }
    }

    fn load(&self) -> Result<AppConfig, EmlangError> {
        // 1. An explicit path must exist
        if let Some(path) = &self.explicit {
            info!(path = path.display().to_string(); "Loading configuration from explicit path");
            return load_config_file(path);
        }

        // 2. So must a path named by the environment
        if let Some(path) = &self.env {
            info!(
                path = path.display().to_string(), variable = CONFIG_ENV;
                "Loading configuration from environment"
            );
            return load_config_file(path);
        }

        // 3. Working directory
        if self.local.exists() {
            info!(path = self.local.display().to_string(); "Loading configuration from local path");
            return load_config_file(&self.local);
        }

        // 4. Platform-specific config directory
        if let Some(path) = &self.system {
            if path.exists() {
                info!(path = path.display().to_string(); "Loading configuration from system path");
                return load_config_file(path);
            }
            debug!(path = path.display().to_string(); "System configuration file not found");
        }

        debug!("No configuration file found, using default configuration");
        Ok(AppConfig::default())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Path in the `EMLANG_CONFIG` environment variable
/// 3. `.emlang.toml` in the working directory
/// 4. Platform-specific config directory
/// 5. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - An explicit or environment path is given but the file doesn't exist
/// - A config file exists but cannot be read or parsed
pub fn load_config(explicit_path: Option<&str>) -> Result<AppConfig, EmlangError> {
    SearchPaths::from_environment(explicit_path).load()
}

/// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite.
pub fn write_default_config(path: impl AsRef<Path>) -> Result<(), EmlangError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => ConfigError::AlreadyExists(path.to_path_buf()).into(),
            _ => EmlangError::Io(err),
        })?;
    file.write_all(DEFAULT_CONFIG.as_bytes())?;

    info!(path = path.display().to_string(); "Created configuration file");
    Ok(())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, EmlangError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = std::fs::read_to_string(path)?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use emlang::format::KeyStyle;
    use tempfile::tempdir;

    use super::*;

    fn paths_in(dir: &Path) -> SearchPaths {
        SearchPaths {
            local: dir.join(LOCAL_CONFIG),
            ..SearchPaths::default()
        }
    }

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.lint().ignore().is_empty());
        assert_eq!(config.fmt().keys(), KeyStyle::Long);
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        let dir = tempdir().unwrap();
        let config = paths_in(dir.path()).load().unwrap();
        assert!(config.diagram().css().is_empty());
    }

    #[test]
    fn test_local_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "[fmt]\nkeys = \"short\"\n").unwrap();

        let config = paths_in(dir.path()).load().unwrap();
        assert_eq!(config.fmt().keys(), KeyStyle::Short);
    }

    #[test]
    fn test_precedence() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let from_env = dir.path().join("env.toml");
        fs::write(&explicit, "[lint]\nignore = [\"orphan-exception\"]\n").unwrap();
        fs::write(&from_env, "[lint]\nignore = [\"slice-missing-event\"]\n").unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "[fmt]\nkeys = \"short\"\n").unwrap();

        let paths = SearchPaths {
            explicit: Some(explicit),
            env: Some(from_env.clone()),
            ..paths_in(dir.path())
        };
        assert_eq!(paths.load().unwrap().lint().ignore(), ["orphan-exception"]);

        let paths = SearchPaths {
            env: Some(from_env),
            ..paths_in(dir.path())
        };
        assert_eq!(paths.load().unwrap().lint().ignore(), ["slice-missing-event"]);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempdir().unwrap();
        let paths = SearchPaths {
            explicit: Some(dir.path().join("missing.toml")),
            ..paths_in(dir.path())
        };

        let err = paths.load().unwrap_err();
        assert!(matches!(err, EmlangError::Config(ref message) if message.contains("missing.toml")));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "[fmt\n").unwrap();

        let err = paths_in(dir.path()).load().unwrap_err();
        assert!(matches!(err, EmlangError::Config(_)));
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG);

        write_default_config(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        let err = write_default_config(&path).unwrap_err();
        assert!(matches!(err, EmlangError::Config(ref message) if message.contains("already exists")));
    }
}
