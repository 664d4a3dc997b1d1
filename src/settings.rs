//! Persistent launcher settings.

use fancy_apps::{DEFAULT_ENVIRONMENTS, get_config_directory, get_current_desktops};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Shortcut that opens the menu.
pub const DEFAULT_SHORTCUT: &str = "Alt+F1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Favorite desktop files, in display order.
    pub favorites: Vec<String>,
    /// Explicit `.menu` file; the session default when None.
    pub menu_file: Option<PathBuf>,
    /// Clear the search text every time the menu is shown.
    pub filter_clear: bool,
    /// Search text when the launcher last exited.
    pub last_filter: String,
    /// Desktop names for OnlyShowIn / NotShowIn.
    pub environments: Vec<String>,
    pub shortcut: String,
    /// Terminal for apps with `Terminal=true`.
    pub terminal: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut environments = get_current_desktops();
        if environments.is_empty() {
            environments = DEFAULT_ENVIRONMENTS.iter().map(|s| s.to_string()).collect();
        }
        Self {
            favorites: Vec::new(),
            menu_file: None,
            filter_clear: false,
            last_filter: String::new(),
            environments,
            shortcut: DEFAULT_SHORTCUT.to_string(),
            terminal: None,
        }
    }
}

impl Settings {
    /// ~/.config/FancyMenu/settings.json
    pub fn default_path() -> PathBuf {
        get_config_directory().join("settings.json")
    }

    /// Load from config file, or return default if missing or unreadable
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save to config file
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_or_corrupt_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        assert_eq!(Settings::default().shortcut, "Alt+F1");
        assert!(!Settings::default().environments.is_empty());
    }

    #[test]
    fn save_creates_directories_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("FancyMenu").join("settings.json");

        let settings = Settings {
            favorites: vec![
                "/usr/share/applications/b.desktop".to_string(),
                "/usr/share/applications/a.desktop".to_string(),
            ],
            menu_file: Some(PathBuf::from("/etc/xdg/menus/lxqt-applications.menu")),
            filter_clear: true,
            last_filter: "term".to_string(),
            environments: vec!["LXQt".to_string()],
            shortcut: "Super".to_string(),
            terminal: Some("qterminal".to_string()),
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "favorites": ["/apps/a.desktop"], "filter_clear": true }"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.favorites, vec!["/apps/a.desktop"]);
        assert!(settings.filter_clear);
        assert_eq!(settings.shortcut, DEFAULT_SHORTCUT);
        assert_eq!(settings.menu_file, None);
    }
}
