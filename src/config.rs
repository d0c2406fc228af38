use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::CompanyDetails;

const DEFAULT_COMPANY_TEMPLATE: &str = include_str!("../company.toml");
const DEFAULT_OUTPUT_DIR: &str = "~/Documents/Invoices";

/// External program that prints the invoice HTML to PDF.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RendererSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            program: "chromium".to_string(),
            args: vec![
                "--headless".to_string(),
                "--disable-gpu".to_string(),
                "--no-pdf-header-footer".to_string(),
            ],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub output_dir: String,
    pub templates_dir: Option<String>,
    pub renderer: RendererSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            templates_dir: None,
            renderer: RendererSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.output_dir))
    }

    pub fn templates_path(&self) -> Option<PathBuf> {
        self.templates_dir
            .as_deref()
            .map(|dir| PathBuf::from(expand_home_dir(dir)))
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "gst-invoice", "app") {
        return proj_dirs.config_dir().to_path_buf();
    }
    PathBuf::from(".")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn company_path() -> PathBuf {
    config_dir().join("company.toml")
}

/// Reads settings from `path`; a missing file means defaults.
pub fn load_settings_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        debug!("no settings at {}, using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_settings() -> Result<AppSettings, ConfigError> {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(settings)?;
    write_file(path, &toml_str)?;
    info!("settings saved to {}", path.display());
    Ok(())
}

/// Issuer details from `path`. The first run writes a blank template there
/// for the user to fill in.
pub fn load_company_from(path: &Path) -> Result<CompanyDetails, ConfigError> {
    let content = if path.exists() {
        fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        info!("initializing default company details at {}", path.display());
        write_file(path, DEFAULT_COMPANY_TEMPLATE)?;
        DEFAULT_COMPANY_TEMPLATE.to_string()
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
