//! App Catalog implementation.

use crate::desktop_entry::{DesktopFile, Locale, parse_desktop_file};
use crate::error::ResolveError;
use crate::exec::LaunchHandle;
use crate::paths::get_application_directories;
use log::{debug, info, warn};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything the menu needs to know about one launchable application.
pub struct Description {
    /// Stable identifier: the path of the backing desktop file.
    pub id: String,
    pub title: String,
    /// Comment, or the generic name when the comment is empty.
    pub comment: String,
    pub icon: Option<String>,
    pub keywords: Vec<String>,
    pub handle: Box<dyn LaunchHandle>,
}

impl std::fmt::Debug for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Description")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl From<DesktopFile> for Description {
    fn from(file: DesktopFile) -> Self {
        Description {
            id: file.path.to_string_lossy().to_string(),
            title: file.name.clone(),
            comment: file.description(),
            icon: file.icon.clone(),
            keywords: file.keywords.clone(),
            handle: Box::new(file),
        }
    }
}

/// Turns an identifier into a [`Description`].
pub trait DescriptionResolver {
    fn resolve(&self, id: &str) -> Result<Description, ResolveError>;
}

/// Desktop file ids mapped to their files, scanned from the application dirs.
pub struct AppCatalog {
    /// Directories in precedence order.
    directories: Vec<PathBuf>,
    /// Desktop file path indexed by ID (e.g. "firefox.desktop").
    apps: HashMap<String, PathBuf>,
    locale: Option<Locale>,
    terminal: Option<String>,
}

impl AppCatalog {
    /// Create an empty catalog over the standard XDG application dirs.
    pub fn new() -> Self {
        Self::with_directories(get_application_directories())
    }

    /// Create an empty catalog over the given dirs, most important first.
    pub fn with_directories(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            apps: HashMap::new(),
            locale: Locale::from_env(),
            terminal: None,
        }
    }

    pub fn set_locale(&mut self, locale: Option<Locale>) {
        self.locale = locale;
    }

    /// Terminal command handed to loaded entries that run in a terminal.
    pub fn set_terminal(&mut self, terminal: Option<String>) {
        self.terminal = terminal;
    }

    /// Rescan all directories.
    pub fn refresh(&mut self) {
        info!("Scanning {} application directories...", self.directories.len());
        let mut apps = HashMap::new();

        for dir in &self.directories {
            if !dir.exists() {
                continue;
            }

            let walker = walkdir::WalkDir::new(dir).follow_links(true).max_depth(3);
            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                    continue;
                }
                // Apps are identified by their path as a string
                if path.to_str().is_none() {
                    warn!("Skipping {}: path is not valid UTF-8", path.display());
                    continue;
                }
                if let Some(id) = desktop_file_id(dir, path) {
                    // Earlier directories take precedence
                    apps.entry(id).or_insert_with(|| path.to_path_buf());
                }
            }
        }

        info!("Found {} desktop files.", apps.len());
        self.apps = apps;
    }

    /// Path of the desktop file with this id.
    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.apps.get(id).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Parse every known desktop file, skipping the broken ones.
    pub fn load_all(&self) -> Vec<DesktopFile> {
        let mut ids: Vec<&String> = self.apps.keys().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| match self.load(id) {
                Ok(file) => Some(file),
                Err(e) => {
                    debug!("Skipping {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    /// Parse one desktop file, by id or by absolute path.
    pub fn load(&self, id: &str) -> Result<DesktopFile, ResolveError> {
        if id.starts_with('/') {
            let path = Path::new(id);
            let file_id = self
                .directories
                .iter()
                .find_map(|dir| desktop_file_id(dir, path))
                .unwrap_or_else(|| {
                    path.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                });
            return self.parse(path, &file_id);
        }

        let path = self
            .path_of(id)
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))?;
        self.parse(path, id)
    }

    fn parse(&self, path: &Path, id: &str) -> Result<DesktopFile, ResolveError> {
        let mut file = parse_desktop_file(path, id, self.locale.as_ref())?;
        file.terminal_command = self.terminal.clone();
        Ok(file)
    }
}

impl Default for AppCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptionResolver for AppCatalog {
    fn resolve(&self, id: &str) -> Result<Description, ResolveError> {
        self.load(id).map(Description::from)
    }
}

/// Desktop file id of `path` relative to the applications dir `base`:
/// `base/kde/konsole.desktop` becomes `kde-konsole.desktop`.
pub fn desktop_file_id(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("-"))
}
