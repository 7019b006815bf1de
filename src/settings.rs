use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::modules::layout::{LayoutContext, LayoutLimits};

pub const SETTINGS_FILE: &str = "homescreen.json";

/// Reference values used to recognise the default search provider tile.
/// These are region specific, so they live in settings rather than code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchProviderConstants {
    pub guid: String,
    pub us_url: String,
    pub row_url: String,
}

impl Default for SearchProviderConstants {
    fn default() -> Self {
        Self {
            guid: "DefaultGoogleGUID".to_string(),
            us_url: "https://www.google.com/webhp?client=firefox-b-1-m&channel=ts".to_string(),
            row_url: "https://www.google.com/webhp?client=firefox-b-m&channel=ts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureFlags {
    /// Build-level switch for the Jump Back In section.
    pub jump_back_in: bool,
    /// Homescreen configuration switch for the section.
    pub jump_back_in_section_enabled: bool,
    /// User preference from the settings screen.
    pub jump_back_in_user_enabled: bool,
    pub tab_tray_groups: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            jump_back_in: true,
            jump_back_in_section_enabled: true,
            jump_back_in_user_enabled: true,
            tab_tray_groups: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutLimits,
    pub layout_context: LayoutContext,
    pub features: FeatureFlags,
    pub search_provider: SearchProviderConstants,
    pub icon_request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: LayoutLimits::default(),
            layout_context: LayoutContext::default(),
            features: FeatureFlags::default(),
            search_provider: SearchProviderConstants::default(),
            icon_request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn get_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    pub fn load(data_dir: &Path) -> Self {
        let path = Self::get_path(data_dir);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), String> {
        let path = Self::get_path(data_dir);
        let tmp_path = path.with_extension("tmp");

        fs::create_dir_all(data_dir).map_err(|e| e.to_string())?;

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }
}
