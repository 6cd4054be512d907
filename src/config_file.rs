use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::ConversionError;
use crate::image_processing::codec::{EncodeOptions, MAX_ICO_DIMENSION};
use crate::image_processing::ConversionConfig;
use crate::notify::NotifyMode;

const CONFIG_DIR_NAME: &str = "image-converter";
const CONFIG_FILE_NAME: &str = "config.json";

/// Optional settings file. Every key may be omitted.
///
/// ```json
/// { "quality": 90, "notify": "dialog", "icoSizes": [16, 32, 256] }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub quality: Option<u8>,
    pub notify: Option<NotifyMode>,
    pub verbose: Option<bool>,
    pub report: Option<bool>,
    pub json_progress: Option<bool>,
    /// Square icon sizes, one ICO frame each
    pub ico_sizes: Option<Vec<u32>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ConfigFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality {
            if !(1..=100).contains(&quality) {
                anyhow::bail!("quality must be between 1 and 100, got {}", quality);
            }
        }

        if let Some(sizes) = &self.ico_sizes {
            if sizes.is_empty() {
                anyhow::bail!("icoSizes must list at least one size");
            }
            if let Some(bad) = sizes.iter().find(|&&s| s == 0 || s > MAX_ICO_DIMENSION) {
                anyhow::bail!(
                    "icoSizes entries must be between 1 and {}, got {}",
                    MAX_ICO_DIMENSION,
                    bad
                );
            }
        }

        Ok(())
    }
}

/// `<config dir>/image-converter/config.json`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Effective settings for one run: command line merged over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output_format: String,
    pub notify: NotifyMode,
    pub verbose: bool,
    pub report: bool,
    pub json_progress: bool,
    pub conversion: ConversionConfig,
    /// Config file that was actually loaded
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Load the config file (explicit `--config`, else the default location if
    /// present) and merge the command line over it.
    pub fn resolve(args: &Args) -> Result<Self, ConversionError> {
        let config_path = match &args.config_file {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|path| path.is_file()),
        };

        let file = match &config_path {
            Some(path) => ConfigFile::load(path).map_err(|err| ConversionError::Config {
                path: path.clone(),
                message: format!("{:#}", err),
            })?,
            None => ConfigFile::default(),
        };

        Ok(Self::merge(args, file, config_path))
    }

    /// Command-line values win. Boolean flags can only switch an option on.
    pub fn merge(args: &Args, file: ConfigFile, config_path: Option<PathBuf>) -> Self {
        let defaults = EncodeOptions::default();

        let encode = EncodeOptions {
            quality: args.quality.or(file.quality).unwrap_or(defaults.quality),
            ico_sizes: file
                .ico_sizes
                .map(|sizes| sizes.into_iter().map(|s| (s, s)).collect())
                .unwrap_or(defaults.ico_sizes),
        };

        Self {
            input: args.input.clone(),
            output_format: args.output_format.clone(),
            notify: args.notify.or(file.notify).unwrap_or_default(),
            verbose: args.verbose || file.verbose.unwrap_or(false),
            report: args.report || file.report.unwrap_or(false),
            json_progress: args.json_progress || file.json_progress.unwrap_or(false),
            conversion: ConversionConfig {
                encode,
                dry_run: args.dry_run,
            },
            config_path,
        }
    }
}
