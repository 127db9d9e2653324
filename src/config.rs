//! Runtime configuration
//!
//! Settings come from an optional TOML file, then environment variables.
//! The CLI applies its own flags on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

pub const ENV_API_URL: &str = "EPP_API_URL";
pub const ENV_ISSUER_NAME: &str = "EPP_ISSUER_NAME";
pub const ENV_OUTPUT_DIR: &str = "EPP_OUTPUT_DIR";

/// Resolved settings handed to the views
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the EPP API
    pub api_base_url: Url,
    /// Name of the person issuing equipment, pre-filled on the registration form
    pub issuer_name: Option<String>,
    /// Directory exported PDFs are written to
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_URL).expect("default URL is valid"),
            issuer_name: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// On-disk shape of the settings file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    issuer_name: Option<String>,
    output_dir: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from a TOML string, starting from the defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: FileSettings =
            toml::from_str(toml_str).map_err(|e| AppError::Config(e.to_string()))?;

        let mut settings = Settings::default();
        if let Some(url) = file.api_url {
            settings.set_api_url(&url)?;
        }
        settings.set_issuer_name(file.issuer_name);
        if let Some(dir) = file.output_dir {
            settings.output_dir = dir;
        }
        Ok(settings)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Settings::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.set_api_url(&url)?;
        }
        if let Some(name) = lookup(ENV_ISSUER_NAME) {
            self.set_issuer_name(Some(name));
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn set_api_url(&mut self, raw: &str) -> Result<()> {
        let url = Url::parse(raw).map_err(|e| AppError::Config(format!("{}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "{}: API URL must use http or https",
                raw
            )));
        }
        if url.cannot_be_a_base() {
            return Err(AppError::Config(format!("{}: not a base URL", raw)));
        }
        self.api_base_url = url;
        Ok(())
    }

    /// Blank names count as unset
    pub fn set_issuer_name(&mut self, name: Option<String>) {
        self.issuer_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }
}
