//! Dashboard configuration.
//!
//! Stored in `<config dir>/gapminder-dashboard/config.toml`. Every field has a
//! default, so partial files (or no file at all) are fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Published five-year Gapminder extract.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/gapminderDataFiveYear.csv";

const APP_DIR: &str = "gapminder-dashboard";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub assets: AssetConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV location fetched at startup.
    pub url: String,

    /// Keep a local copy of the download. `None` disables the cache.
    pub cache_dir: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATA_URL.to_string(),
            cache_dir: dirs::cache_dir().map(|d| d.join(APP_DIR)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub report_path: PathBuf,
    pub presentation_path: PathBuf,
    pub script_path: PathBuf,

    /// Program run as `<interpreter> <script_path>` to rebuild the deck.
    pub interpreter: String,

    /// Seconds before a regeneration run is killed.
    pub regeneration_timeout_secs: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("Data Analysis and Visualization Report.pdf"),
            presentation_path: PathBuf::from("Data Analysis Presentation.pptx"),
            script_path: PathBuf::from("analysis.R"),
            interpreter: "Rscript".to_string(),
            regeneration_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_width: f32,
    pub window_height: f32,
    pub histogram_bins: usize,

    /// Largest bubble radius, in points.
    pub bubble_size_max: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 860.0,
            histogram_bins: 20,
            bubble_size_max: 40.0,
        }
    }
}

impl DashboardConfig {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load the config at the default location. A missing file gives the
    /// defaults; an unreadable one is logged and also gives the defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }
}
