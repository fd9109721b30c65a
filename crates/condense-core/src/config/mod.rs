use crate::error::{Error, Result};
use crate::settings::{Quality, VideoFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub output: OutputConfig,
}

/// Settings pre-filled into a new conversion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub quality: Quality,
    pub format: VideoFormat,
    pub remove_audio: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        // Converted files land under ~/Videos/Condense/
        let output_dir = directories::UserDirs::new()
            .and_then(|u| u.video_dir().map(|v| v.to_path_buf()))
            .unwrap_or_else(|| {
                directories::UserDirs::new()
                    .map(|u| u.home_dir().join("Videos"))
                    .unwrap_or_else(|| PathBuf::from("~/Videos"))
            })
            .join("Condense");

        Self {
            defaults: DefaultsConfig {
                quality: Quality::Medium,
                format: VideoFormat::Mp4,
                remove_audio: false,
            },
            output: OutputConfig { dir: output_dir },
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "condense", "Condense")
            .ok_or_else(|| Error::Config("cannot determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path).map_err(Error::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(Error::Json)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(Error::Json)?;
        std::fs::write(&path, content).map_err(Error::Io)?;
        Ok(())
    }

    /// Ensure the output directory exists before a conversion writes to it.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output.dir).map_err(Error::Io)?;
        Ok(())
    }
}
