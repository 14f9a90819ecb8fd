use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use mandelia_core::FractalParams;
use mandelia_render::{ExportSpec, ModuloColoration};

// ---------------------------------------------------------------------------
// Application preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    /// Size of the large surface; the small one is a third of it.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_max_iterations")]
    pub default_max_iterations: u32,
    #[serde(default)]
    pub coloration: ModuloColoration,
    /// Settings used by `render` and `animate`.
    #[serde(default)]
    pub export: ExportSpec,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_max_iterations() -> u32 {
    FractalParams::DEFAULT_MAX_ITERATIONS
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            default_max_iterations: default_max_iterations(),
            coloration: ModuloColoration::default(),
            export: ExportSpec::default(),
        }
    }
}

impl AppPreferences {
    /// Load preferences from the OS config directory, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    prefs
                }
                Err(e) => {
                    error!("Failed to parse preferences: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read preferences file: {e}");
                Self::default()
            }
        }
    }

    /// Parse preferences; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Persist preferences to disk and return the path written.
    pub fn save(&self) -> io::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&path, json)?;
        debug!("Saved preferences to {}", path.display());
        Ok(path)
    }
}

/// `preferences.json` in the platform config directory, or next to the
/// working directory when the platform has none.
pub fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "Mandelia")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("preferences.json")
}
