use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "scraper.config.json";
const DEFAULT_OUTPUT: &str = "./output/docs.pdf";

/// Flags gathered from the command line, before merging with the config file.
#[derive(Debug, Default, Clone)]
pub struct CliFlags {
    pub base_url: Option<String>,
    pub entry_point: Option<String>,
    pub directories: Vec<String>,
    pub custom_styles: Option<String>,
    pub output: Option<String>,
    pub force_images: bool,
}

/// Options read from `scraper.config.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub entry_point: Option<String>,
    pub required_dirs: Option<Vec<String>>,
    pub custom_styles: Option<String>,
    pub output_dir: Option<String>,
    pub force_images: Option<bool>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub entry_point: String,
    pub required_dirs: Vec<String>,
    pub custom_styles: Option<String>,
    pub output: PathBuf,
    pub force_images: bool,
}

impl Config {
    /// Merges CLI flags with the nearest config file; flags take precedence.
    pub fn resolve(flags: CliFlags) -> Result<Self> {
        let file = env::current_dir()
            .ok()
            .and_then(|dir| find_config_file(CONFIG_FILE_NAME, &dir))
            .and_then(|path| load_config_file(&path))
            .unwrap_or_default();
        Self::merge(flags, file)
    }

    pub fn merge(flags: CliFlags, file: FileConfig) -> Result<Self> {
        let base_url = flags
            .base_url
            .or(file.base_url)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "--baseUrl is required (pass it as a flag or set baseUrl in {})",
                    CONFIG_FILE_NAME
                )
            })?;

        let entry_point = flags
            .entry_point
            .or(file.entry_point)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "--entryPoint is required (pass it as a flag or set entryPoint in {})",
                    CONFIG_FILE_NAME
                )
            })?;

        let required_dirs = if flags.directories.is_empty() {
            file.required_dirs.unwrap_or_default()
        } else {
            flags.directories
        };

        Ok(Self {
            base_url,
            entry_point,
            required_dirs,
            custom_styles: flags
                .custom_styles
                .or(file.custom_styles)
                .filter(|value| !value.is_empty()),
            output: PathBuf::from(
                flags
                    .output
                    .or(file.output_dir)
                    .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            ),
            force_images: flags.force_images || file.force_images.unwrap_or(false),
        })
    }
}

/// Searches for `filename` starting at `directory` and walking up the tree.
pub fn find_config_file(filename: &str, directory: &Path) -> Option<PathBuf> {
    let candidate = directory.join(filename);
    if candidate.exists() {
        return Some(candidate);
    }
    directory
        .parent()
        .and_then(|parent| find_config_file(filename, parent))
}

/// A config file that cannot be read or parsed is logged and ignored.
fn load_config_file(path: &Path) -> Option<FileConfig> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                info!("Using configuration from: {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Error parsing config file {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            warn!("Error loading config file {}: {}", path.display(), e);
            None
        }
    }
}
