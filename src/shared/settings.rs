use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Optional `alias=canonical` timezone alias list, resolved relative to
    /// the working directory when not absolute.
    pub alias_file: String,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub default_from_zone: String,
    pub default_to_zone: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            alias_file: "tz_aliases.txt".to_string(),
            preferences: UserPreferences {
                default_from_zone: "UTC".to_string(),
                default_to_zone: "Asia/Tokyo".to_string(),
            },
        }
    }
}

impl AppSettings {
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "zonelens", "zonelens")
            .ok_or_else(|| AppError::Settings("Unable to determine config directory".into()))?;
        Ok(proj_dirs.config_dir().join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults when the file is
    /// missing. A malformed file is an error so typos are not silently eaten.
    pub async fn load() -> AppResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).await?;
        serde_json::from_str(&raw).map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Settings(e.to_string()))?;
        fs::write(&path, raw).await?;
        Ok(())
    }
}
