//! fancy-apps: Desktop entries, XDG menus and launching for Linux desktops.
//!
//! Provides the platform side of the application menu:
//! - Desktop entry parsing with localized keys and sub-actions
//! - An app catalog that resolves desktop file ids to launchable descriptions
//! - A freedesktop `.menu` reader producing a category/app-link tree
//! - Detached process start, desktop export and clipboard export
//! - Change notifications for the menu and application dirs

mod catalog;
mod desktop;
mod desktop_entry;
mod error;
mod exec;
mod menu;
mod paths;
mod watcher;

pub use catalog::{AppCatalog, Description, DescriptionResolver, desktop_file_id};
pub use desktop::{Clipboard, ExportOutcome, SystemClipboard, export_to_desktop, file_uri};
pub use desktop_entry::{DesktopAction, DesktopFile, DirectoryEntry, Locale, parse_desktop_file};
pub use error::{LaunchError, MenuError, ResolveError};
pub use exec::{ActionInfo, LaunchHandle, run_command, spawn_detached, split_exec};
pub use menu::{DEFAULT_ENVIRONMENTS, MenuCategory, MenuNode, MenuSource, XdgMenu};
pub use paths::{
    get_application_directories, get_config_directory, get_current_desktops,
    get_desktop_directory, get_menu_file,
};
pub use watcher::{MenuEvent, MenuWatcher, drain_changes};
