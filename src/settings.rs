use std::path::{Path, PathBuf};

use crate::ops::composite::MockupStyle;

/// Persistent user preferences, stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Style preselected when the editor opens.
    pub default_style: MockupStyle,
    /// Key for the generation service. Empty = local simulation only.
    pub api_key: String,
    /// JPEG quality for exported mockups (1–100).
    pub jpeg_quality: u8,
    /// Width the background is displayed at in the editor, in points.
    pub display_width: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_style: MockupStyle::Engrave,
            api_key: String::new(),
            jpeg_quality: 90,
            display_width: 576.0,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/mockupfe/mockupfe_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\MockupFE\mockupfe_settings.cfg
    /// On macOS:   ~/Library/Application Support/MockupFE/mockupfe_settings.cfg
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("mockupfe");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("mockupfe_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            let config_dir = PathBuf::from(appdata).join("MockupFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("mockupfe_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("MockupFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("mockupfe_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("mockupfe_settings.cfg")))
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Key to attach to generation requests, if one is configured.
    pub fn service_key(&self) -> Option<String> {
        self.has_credentials().then(|| self.api_key.trim().to_string())
    }

    pub fn to_config(&self) -> String {
        let mut content = String::new();
        content.push_str(&format!("default_style={}\n", self.default_style.key()));
        content.push_str(&format!("api_key={}\n", self.api_key));
        content.push_str(&format!("jpeg_quality={}\n", self.jpeg_quality));
        content.push_str(&format!("display_width={}\n", self.display_width));
        content
    }

    /// Parse config text. Unknown keys and bad values fall back to defaults.
    pub fn from_config(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "default_style" => {
                    s.default_style = val.parse().unwrap_or_default();
                }
                "api_key" => {
                    s.api_key = val.to_string();
                }
                "jpeg_quality" => {
                    s.jpeg_quality = val.parse::<u8>().map(|q| q.clamp(1, 100)).unwrap_or(90);
                }
                "display_width" => {
                    s.display_width = val
                        .parse::<f32>()
                        .ok()
                        .filter(|w| w.is_finite() && *w >= 100.0)
                        .unwrap_or(576.0);
                }
                _ => {}
            }
        }
        s
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_config())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config(&content),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            crate::log_warn!("Failed to save settings to {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from(&path)
    }
}
