//! Reading config files, and seeding the per-user one on first run.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::schema::SlidecastConfig;
use crate::validation;
use slidecast_common::ConfigError;
use tracing::{info, warn};

use super::template::default_config_toml;

const APP_DIR: &str = "slidecast";
const FILE_NAME: &str = "config.toml";

fn io_failure(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::ParseError(format!("failed to {action} {}: {e}", path.display()))
}

/// Parse one TOML file.
///
/// Missing fields take their serde defaults. Validation failures are only
/// logged here; callers that need a hard failure run `validation::validate`.
pub fn load_from_path(path: &Path) -> Result<SlidecastConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_failure("read", path, e))?;

    let config: SlidecastConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// `<config_dir>/slidecast/config.toml`, e.g. `~/.config/slidecast/config.toml`
/// on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// Write the commented template to `path`, creating parent directories.
///
/// An existing file is left untouched.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_failure("create directory", parent, e))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("config already present at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(io_failure("create", path, e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(|e| io_failure("write", path, e))?;

    info!("created default config at {}", path.display());
    Ok(())
}

/// Load the per-user config, seeding it from the template when absent.
pub fn load_default() -> Result<SlidecastConfig, ConfigError> {
    let path = default_config_path()?;
    if path.exists() {
        return load_from_path(&path);
    }

    info!("no config found at {}, creating default", path.display());
    create_default_config(&path)?;
    Ok(SlidecastConfig::default())
}
