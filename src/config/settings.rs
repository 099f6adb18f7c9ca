//! Engine settings loading from config.toml
//!
//! The file is optional. When it is missing, or a section is omitted, the
//! built-in defaults apply. Status names are validated up front so a typo in the
//! config fails at startup instead of silently counting nothing as blocking.

use crate::core::availability::{BLOCKING_STATUSES, OrderStatus};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Availability engine settings
    #[serde(default)]
    pub availability: AvailabilitySettings,
}

/// The `[availability]` section
#[derive(Debug, Deserialize)]
pub struct AvailabilitySettings {
    /// Order statuses that reserve units for their date range
    #[serde(default = "default_blocking_statuses")]
    pub blocking_statuses: Vec<String>,
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        Self {
            blocking_statuses: default_blocking_statuses(),
        }
    }
}

fn default_blocking_statuses() -> Vec<String> {
    BLOCKING_STATUSES
        .iter()
        .map(|status| status.as_str().to_string())
        .collect()
}

impl AvailabilitySettings {
    /// Parses the configured status names.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first unknown status.
    pub fn blocking_statuses(&self) -> Result<Vec<OrderStatus>> {
        self.blocking_statuses
            .iter()
            .map(|name| {
                OrderStatus::from_str(name).map_err(|_| Error::Config {
                    message: format!("Unknown blocking status in config.toml: '{name}'"),
                })
            })
            .collect()
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads ./config.toml, falling back to defaults when the file does not exist.
///
/// # Errors
/// Returns an error only if the file exists but cannot be parsed.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}
