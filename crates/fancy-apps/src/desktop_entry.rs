//! Desktop entry parsing.

use crate::error::ResolveError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const DESKTOP_ENTRY_GROUP: &str = "Desktop Entry";
const ACTION_GROUP_PREFIX: &str = "Desktop Action ";

/// Message locale used for localized keys (`Name[de]`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    pub lang: String,
    pub country: Option<String>,
    pub modifier: Option<String>,
}

impl Locale {
    /// Parse `lang_COUNTRY.ENCODING@MODIFIER`. "C" and "POSIX" have no translations.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == "C" || value == "POSIX" {
            return None;
        }

        let (rest, modifier) = match value.split_once('@') {
            Some((rest, m)) => (rest, Some(m.to_string())),
            None => (value, None),
        };
        // Encoding is irrelevant for key matching
        let rest = rest.split('.').next().unwrap_or(rest);
        let (lang, country) = match rest.split_once('_') {
            Some((l, c)) => (l, Some(c.to_string())),
            None => (rest, None),
        };
        if lang.is_empty() {
            return None;
        }

        Some(Locale {
            lang: lang.to_string(),
            country,
            modifier,
        })
    }

    /// Locale from `LC_ALL`, `LC_MESSAGES` or `LANG`, first non-empty wins.
    pub fn from_env() -> Option<Self> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|v| Locale::parse(&v))
    }

    /// Candidate keys for `key`, best match first, unlocalized key last.
    fn candidate_keys(&self, key: &str) -> Vec<String> {
        let mut keys = Vec::with_capacity(5);
        if let (Some(country), Some(modifier)) = (&self.country, &self.modifier) {
            keys.push(format!("{}[{}_{}@{}]", key, self.lang, country, modifier));
        }
        if let Some(country) = &self.country {
            keys.push(format!("{}[{}_{}]", key, self.lang, country));
        }
        if let Some(modifier) = &self.modifier {
            keys.push(format!("{}[{}@{}]", key, self.lang, modifier));
        }
        keys.push(format!("{}[{}]", key, self.lang));
        keys.push(key.to_string());
        keys
    }
}

/// A named sub-action from a `[Desktop Action <id>]` group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesktopAction {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub exec: String,
}

/// Parsed from .desktop files.
#[derive(Clone, Debug)]
pub struct DesktopFile {
    /// Desktop file id, e.g. "org.kde.kate.desktop".
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub generic_name: Option<String>,
    pub comment: Option<String>,
    pub icon: Option<String>,
    pub exec: String,
    /// `Path=` key, the working directory of the program.
    pub working_dir: Option<PathBuf>,
    pub terminal: bool,
    /// Terminal used for `Terminal=true` entries; `$TERMINAL` or xterm when None.
    pub terminal_command: Option<String>,
    pub keywords: Vec<String>,
    pub categories: Vec<String>,
    pub no_display: bool,
    pub only_show_in: Vec<String>,
    pub not_show_in: Vec<String>,
    pub actions: Vec<DesktopAction>,
}

impl DesktopFile {
    /// Whether this entry should appear in any of the given desktops.
    pub fn is_shown_in(&self, desktops: &[String]) -> bool {
        if !self.only_show_in.is_empty()
            && !self.only_show_in.iter().any(|d| desktops.contains(d))
        {
            return false;
        }
        !self.not_show_in.iter().any(|d| desktops.contains(d))
    }

    /// Comment, or the generic name when the comment is empty.
    pub fn description(&self) -> String {
        match &self.comment {
            Some(c) if !c.is_empty() => c.clone(),
            _ => self.generic_name.clone().unwrap_or_default(),
        }
    }

    pub fn action(&self, id: &str) -> Option<&DesktopAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

struct Group<'a> {
    entries: HashMap<String, String>,
    locale: Option<&'a Locale>,
}

impl Group<'_> {
    fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    fn string(&self, key: &str) -> Option<String> {
        self.raw(key).map(unescape)
    }

    fn localized(&self, key: &str) -> Option<String> {
        match self.locale {
            Some(locale) => locale
                .candidate_keys(key)
                .iter()
                .find_map(|k| self.string(k)),
            None => self.string(key),
        }
    }

    fn localized_list(&self, key: &str) -> Vec<String> {
        let raw = match self.locale {
            Some(locale) => locale
                .candidate_keys(key)
                .into_iter()
                .find_map(|k| self.entries.get(&k).cloned()),
            None => self.entries.get(key).cloned(),
        };
        raw.map(|v| split_list(&v)).unwrap_or_default()
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.raw(key).map(split_list).unwrap_or_default()
    }

    fn boolean(&self, key: &str) -> bool {
        self.raw(key).map(|v| v == "true").unwrap_or(false)
    }
}

/// Parse a .desktop file into a DesktopFile struct.
pub fn parse_desktop_file(
    path: &Path,
    id: &str,
    locale: Option<&Locale>,
) -> Result<DesktopFile, ResolveError> {
    let content = fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut groups = parse_groups(&content);

    let entry = Group {
        entries: groups
            .remove(DESKTOP_ENTRY_GROUP)
            .ok_or_else(|| ResolveError::MissingGroup(path.to_path_buf()))?,
        locale,
    };

    if entry.raw("Type") != Some("Application") {
        return Err(ResolveError::NotApplication(path.to_path_buf()));
    }
    if entry.boolean("Hidden") {
        return Err(ResolveError::Hidden(path.to_path_buf()));
    }

    let missing = |key| ResolveError::MissingKey {
        path: path.to_path_buf(),
        key,
    };
    let name = entry.localized("Name").ok_or_else(|| missing("Name"))?;
    let exec = entry.string("Exec").ok_or_else(|| missing("Exec"))?;

    // Actions listed in Actions= that have a usable group, in declared order
    let actions = entry
        .list("Actions")
        .into_iter()
        .filter_map(|action_id| {
            let group = Group {
                entries: groups.remove(&format!("{}{}", ACTION_GROUP_PREFIX, action_id))?,
                locale,
            };
            Some(DesktopAction {
                name: group.localized("Name")?,
                exec: group.string("Exec")?,
                icon: group.string("Icon").filter(|i| !i.is_empty()),
                id: action_id,
            })
        })
        .collect();

    Ok(DesktopFile {
        id: id.to_string(),
        path: path.to_path_buf(),
        name,
        generic_name: entry.localized("GenericName"),
        comment: entry.localized("Comment"),
        icon: entry.string("Icon").filter(|i| !i.is_empty()),
        exec,
        working_dir: entry
            .string("Path")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from),
        terminal: entry.boolean("Terminal"),
        terminal_command: None,
        keywords: entry.localized_list("Keywords"),
        categories: entry.list("Categories"),
        no_display: entry.boolean("NoDisplay"),
        only_show_in: entry.list("OnlyShowIn"),
        not_show_in: entry.list("NotShowIn"),
        actions,
    })
}

/// Title and icon of a menu, from a `.directory` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub icon: Option<String>,
}

/// Parse a .directory file. Returns None when it is unreadable or has no name.
pub fn parse_directory_file(path: &Path, locale: Option<&Locale>) -> Option<DirectoryEntry> {
    let content = fs::read_to_string(path).ok()?;
    let group = Group {
        entries: parse_groups(&content).remove(DESKTOP_ENTRY_GROUP)?,
        locale,
    };
    Some(DirectoryEntry {
        name: group.localized("Name")?,
        icon: group.string("Icon").filter(|i| !i.is_empty()),
    })
}

/// Parse an ini-style document into groups of raw (still escaped) values.
/// Only the first occurrence of a group or key is kept.
pub(crate) fn parse_groups(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut groups: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].to_string();
            if groups.contains_key(&name) {
                current = None;
            } else {
                groups.insert(name.clone(), HashMap::new());
                current = Some(name);
            }
            continue;
        }

        if let Some(group) = current.as_ref().and_then(|g| groups.get_mut(g)) {
            if let Some((key, value)) = line.split_once('=') {
                group
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }
    }

    groups
}

/// Resolve `\s`, `\n`, `\t`, `\r` and `\\`.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a `;` separated list. `\;` is a literal semicolon. Empty items are dropped.
fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&';') => {
                current.push(';');
                chars.next();
            }
            '\\' => {
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .iter()
        .map(|item| unescape(item.trim()))
        .filter(|item| !item.is_empty())
        .collect()
}
