//! Path helpers for XDG directories and config files.

use std::path::PathBuf;

fn home() -> String {
    std::env::var("HOME").unwrap_or_default()
}

fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home()).join(".local/share"))
}

fn xdg_data_dirs() -> Vec<PathBuf> {
    let dirs = std::env::var("XDG_DATA_DIRS")
        .unwrap_or_else(|_| "/usr/local/share:/usr/share".to_string());
    split_path_list(&dirs)
}

fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home()).join(".config"))
}

fn xdg_config_dirs() -> Vec<PathBuf> {
    let dirs = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_string());
    split_path_list(&dirs)
}

fn split_path_list(list: &str) -> Vec<PathBuf> {
    list.split(':')
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Get all application .desktop file directories, most important first.
pub fn get_application_directories() -> Vec<PathBuf> {
    let mut dirs = vec![xdg_data_home().join("applications")];

    for data_dir in xdg_data_dirs() {
        dirs.push(data_dir.join("applications"));
    }

    // App formats (flatpak, snap)
    dirs.push(PathBuf::from(home()).join(".local/share/flatpak/exports/share/applications"));
    dirs.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    dirs.push(PathBuf::from("/var/lib/snapd/desktop/applications"));

    dirs
}

/// Get all .directory file directories, most important first.
pub fn get_directory_file_directories() -> Vec<PathBuf> {
    let mut dirs = vec![xdg_data_home().join("desktop-directories")];
    for data_dir in xdg_data_dirs() {
        dirs.push(data_dir.join("desktop-directories"));
    }
    dirs
}

/// Locate the applications menu file.
///
/// Looks for `${XDG_MENU_PREFIX}applications.menu` in the user config dir and
/// then in every `XDG_CONFIG_DIRS` entry; falls back to the LXQt menu.
pub fn get_menu_file() -> Option<PathBuf> {
    let prefix = std::env::var("XDG_MENU_PREFIX").unwrap_or_default();
    let mut names = vec![format!("{}applications.menu", prefix)];
    if prefix != "lxqt-" {
        names.push("lxqt-applications.menu".to_string());
    }

    let mut roots = vec![xdg_config_home()];
    roots.extend(xdg_config_dirs());

    for name in &names {
        for root in &roots {
            let candidate = root.join("menus").join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Desktop names from `XDG_CURRENT_DESKTOP`, used for OnlyShowIn/NotShowIn.
pub fn get_current_desktops() -> Vec<String> {
    std::env::var("XDG_CURRENT_DESKTOP")
        .map(|v| {
            v.split(':')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Directory that holds desktop icons (usually ~/Desktop).
pub fn get_desktop_directory() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| PathBuf::from(home()).join("Desktop"))
}

/// Directory for FancyMenu configuration files.
/// Typically ~/.config/FancyMenu
pub fn get_config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(xdg_config_home)
        .join("FancyMenu")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_list_skips_empty_entries() {
        let dirs = split_path_list("/usr/share::/opt/share:");
        assert_eq!(
            dirs,
            vec![PathBuf::from("/usr/share"), PathBuf::from("/opt/share")]
        );
    }

    #[test]
    fn application_directories_end_with_app_formats() {
        let dirs = get_application_directories();
        assert!(dirs[0].ends_with("applications"));
        assert_eq!(
            dirs.last(),
            Some(&PathBuf::from("/var/lib/snapd/desktop/applications"))
        );
    }
}
