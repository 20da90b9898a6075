//! User settings stored as settings.json in the app data directory

use crate::constants::*;
use crate::types::{CategoryFilter, MissPolicy, ResolveOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Source
    pub host: String,
    pub gallery_root: String,
    pub use_manifest: bool,
    pub probe_timeout_secs: u64,

    // Scan limits
    pub max_per_category: u32,
    pub miss_streak_limit: u32,
    pub miss_policy: MissPolicy,

    // View
    pub last_filter: CategoryFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            host: DEFAULT_HOST.to_string(),
            gallery_root: DEFAULT_GALLERY_ROOT.to_string(),
            use_manifest: true,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            max_per_category: DEFAULT_MAX_PER_CATEGORY,
            miss_streak_limit: DEFAULT_MISS_STREAK_LIMIT,
            miss_policy: MissPolicy::default(),
            last_filter: CategoryFilter::All,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            gallery_root: self.gallery_root.clone(),
            max_per_category: self.max_per_category,
            miss_streak_limit: self.miss_streak_limit,
            miss_policy: self.miss_policy,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            host: "http://localhost:3000".into(),
            miss_streak_limit: 3,
            miss_policy: MissPolicy::IgnoreErrors,
            last_filter: CategoryFilter::Only(Category::Early),
            ..Default::default()
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"max_per_category": 20}"#).unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.max_per_category, 20);
        assert_eq!(settings.miss_streak_limit, DEFAULT_MISS_STREAK_LIMIT);
        assert_eq!(settings.host, DEFAULT_HOST);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_resolve_options_mirror_settings() {
        let settings = Settings {
            gallery_root: "photos".into(),
            max_per_category: 12,
            ..Default::default()
        };
        let opts = settings.resolve_options();
        assert_eq!(opts.gallery_root, "photos");
        assert_eq!(opts.max_per_category, 12);
        assert_eq!(opts.miss_policy, MissPolicy::CountErrorsAsMisses);
    }
}
