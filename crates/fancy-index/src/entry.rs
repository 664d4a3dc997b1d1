//! Application entries and categories.

use fancy_apps::{Description, LaunchHandle};
use std::fmt;
use std::rc::Rc;

/// One resolved launchable application.
pub struct AppEntry {
    /// Path of the backing desktop file. Unique within the catalog.
    pub id: String,
    pub title: String,
    pub comment: String,
    pub icon: Option<String>,
    /// Lowercase search tokens: explicit keywords, then title and comment words.
    pub keywords: Vec<String>,
    title_lower: String,
    comment_lower: String,
    handle: Box<dyn LaunchHandle>,
}

impl AppEntry {
    pub fn new(description: Description) -> Self {
        let Description {
            id,
            title,
            comment,
            icon,
            keywords: explicit,
            handle,
        } = description;

        let title_lower = title.to_lowercase();
        let comment_lower = comment.to_lowercase();

        let mut keywords: Vec<String> = Vec::new();
        let tokens = explicit
            .iter()
            .map(|k| k.to_lowercase())
            .chain(title_lower.split(' ').map(String::from))
            .chain(comment_lower.split(' ').map(String::from));
        for token in tokens {
            let token = token.trim().to_string();
            if !token.is_empty() && !keywords.contains(&token) {
                keywords.push(token);
            }
        }

        Self {
            id,
            title,
            comment,
            icon,
            keywords,
            title_lower,
            comment_lower,
            handle,
        }
    }

    pub fn handle(&self) -> &dyn LaunchHandle {
        self.handle.as_ref()
    }

    /// `query` must already be lowercase.
    pub(crate) fn title_contains(&self, query: &str) -> bool {
        self.title_lower.contains(query)
    }

    /// Comment contains `query`, or a keyword starts with it. `query` must be lowercase.
    pub(crate) fn details_match(&self, query: &str) -> bool {
        self.comment_lower.contains(query) || self.keywords.iter().any(|k| k.starts_with(query))
    }
}

impl fmt::Debug for AppEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("comment", &self.comment)
            .field("icon", &self.icon)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

/// Position of the Favorites category.
pub const FAVORITES_CATEGORY: usize = 0;
/// Position of the virtual All Applications category.
pub const ALL_APPS_CATEGORY: usize = 1;

/// A named, ordered group of apps.
#[derive(Debug, Clone, Default)]
pub struct Category {
    /// Menu name; empty for Favorites and All Applications.
    pub name: String,
    pub title: String,
    pub icon: Option<String>,
    /// Empty for All Applications, whose members are the whole catalog.
    pub apps: Vec<Rc<AppEntry>>,
}

impl Category {
    pub(crate) fn synthetic(title: &str, icon: &str) -> Self {
        Self {
            name: String::new(),
            title: title.to_string(),
            icon: Some(icon.to_string()),
            apps: Vec::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.apps.iter().any(|app| app.id == id)
    }
}
