use crate::grid::ZcornFixup;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Knobs for building a grid and its derived activity from a deck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingConfig {
    pub zcorn_fixup: ZcornFixup,
    /// Crossings no larger than this are left alone.
    pub zcorn_epsilon: f64,
    pub deactivate_zero_pore_volume: bool,
    /// Replaces every MINPV limit from the deck.
    pub minpv_override: Option<f64>,
    pub deactivate_pinched_cells: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            zcorn_fixup: ZcornFixup::default(),
            zcorn_epsilon: 0.0,
            deactivate_zero_pore_volume: true,
            minpv_override: None,
            deactivate_pinched_cells: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read processing config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse processing config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_processing_config(
    config_path: impl AsRef<Path>,
) -> Result<ProcessingConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
