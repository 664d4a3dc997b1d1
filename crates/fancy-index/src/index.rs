//! The application index behind the menu.
//!
//! Owns the deduplicated catalog of apps, the categories that reference it
//! and the favorites. The catalog is kept sorted by title in a BTreeMap; a
//! cursor remembers the last position handed out so that a list view walking
//! rows in order does not re-walk the map from the start for every row.

use crate::entry::{AppEntry, Category, FAVORITES_CATEGORY};
use fancy_apps::{DescriptionResolver, MenuError, MenuNode, MenuSource};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::rc::Rc;

/// Title first, id to keep equal titles in a stable order.
type NameKey = (String, String);

/// Last position handed out by [`MenuIndex::app_at`].
#[derive(Debug, Clone)]
struct Cursor {
    position: usize,
    key: NameKey,
}

pub struct MenuIndex {
    resolver: Box<dyn DescriptionResolver>,
    /// Favorites, All Applications, then the parsed categories.
    categories: Vec<Category>,
    /// Apps indexed by id (desktop file path).
    by_id: HashMap<String, Rc<AppEntry>>,
    /// The same apps sorted by title.
    by_name: BTreeMap<NameKey, Rc<AppEntry>>,
    cursor: RefCell<Option<Cursor>>,
}

impl MenuIndex {
    /// Create an empty index. Favorites and All Applications always exist.
    pub fn new(resolver: Box<dyn DescriptionResolver>) -> Self {
        Self {
            resolver,
            categories: vec![
                Category::synthetic("Favorites", "bookmarks"),
                Category::synthetic("All Applications", "folder"),
            ],
            by_id: HashMap::new(),
            by_name: BTreeMap::new(),
            cursor: RefCell::new(None),
        }
    }

    /// Drop everything except the favorites.
    fn clear(&mut self) {
        self.categories.truncate(FAVORITES_CATEGORY + 1);
        self.categories
            .push(Category::synthetic("All Applications", "folder"));
        self.by_id.clear();
        self.by_name.clear();
        self.cursor.replace(None);
    }

    /// Rebuild categories and catalog from a menu source.
    ///
    /// Apps that fail to resolve are skipped. If the source cannot be read
    /// the index is left empty (favorites kept) and the error is returned.
    pub fn rebuild(&mut self, source: &dyn MenuSource) -> Result<(), MenuError> {
        self.clear();

        let nodes = match source.read() {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Cannot read menu: {}", e);
                return Err(e);
            }
        };
        self.add_nodes(nodes);

        info!(
            "Menu index rebuilt: {} categories, {} apps",
            self.categories.len(),
            self.by_name.len()
        );
        Ok(())
    }

    /// Walk the tree depth-first. Top level menus become categories, deeper
    /// menus hand their apps to their top level ancestor.
    fn add_nodes(&mut self, nodes: Vec<MenuNode>) {
        let mut stack: Vec<(MenuNode, Option<usize>)> =
            nodes.into_iter().rev().map(|node| (node, None)).collect();

        while let Some((node, top_level)) = stack.pop() {
            match node {
                MenuNode::Category(menu) => {
                    let target = match top_level {
                        Some(target) => target,
                        None => {
                            self.categories.push(Category {
                                title: menu.title.unwrap_or_else(|| menu.name.clone()),
                                name: menu.name,
                                icon: menu.icon,
                                apps: Vec::new(),
                            });
                            self.categories.len() - 1
                        }
                    };
                    stack.extend(
                        menu.children
                            .into_iter()
                            .rev()
                            .map(|child| (child, Some(target))),
                    );
                }
                MenuNode::AppLink(id) => {
                    // Links outside any category are not shown
                    let Some(target) = top_level else { continue };
                    if let Some(app) = self.intern(&id) {
                        self.categories[target].apps.push(app);
                    }
                }
            }
        }
    }

    /// Catalog entry for `id`, resolving and inserting it on first use.
    fn intern(&mut self, id: &str) -> Option<Rc<AppEntry>> {
        if let Some(app) = self.by_id.get(id) {
            return Some(app.clone());
        }

        let description = match self.resolver.resolve(id) {
            Ok(description) => description,
            Err(e) => {
                debug!("Skipping menu entry: {}", e);
                return None;
            }
        };
        // The link may name a desktop file id that resolves to a known path
        if let Some(app) = self.by_id.get(&description.id) {
            return Some(app.clone());
        }

        let app = Rc::new(AppEntry::new(description));
        self.by_name
            .insert((app.title.clone(), app.id.clone()), app.clone());
        self.by_id.insert(app.id.clone(), app.clone());
        Some(app)
    }

    /// Number of distinct apps in the catalog.
    pub fn total_app_count(&self) -> usize {
        self.by_name.len()
    }

    /// Number of categories, Favorites and All Applications included.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category_at(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Catalog entry by id.
    pub fn find(&self, id: &str) -> Option<&Rc<AppEntry>> {
        self.by_id.get(id)
    }

    /// The `index`-th app in title order (the All Applications view).
    ///
    /// Stepping to the next row is O(1)-ish; a jump closer to the cached
    /// position than to the start walks from the cache, anything else walks
    /// from the start.
    pub fn app_at(&self, index: usize) -> Option<&Rc<AppEntry>> {
        if index >= self.by_name.len() {
            return None;
        }

        let mut cursor = self.cursor.borrow_mut();
        let found = match cursor.as_ref() {
            Some(c) if c.position == index => self.by_name.get_key_value(&c.key),
            Some(c) if c.position + 1 == index => {
                self.by_name.range::<NameKey, _>((Excluded(&c.key), Unbounded)).next()
            }
            Some(c) if c.position.abs_diff(index) < index => {
                if index > c.position {
                    self.by_name
                        .range::<NameKey, _>((Excluded(&c.key), Unbounded))
                        .nth(index - c.position - 1)
                } else {
                    self.by_name
                        .range::<NameKey, _>(..&c.key)
                        .rev()
                        .nth(c.position - index - 1)
                }
            }
            _ => self.by_name.iter().nth(index),
        };

        let (key, app) = found?;
        *cursor = Some(Cursor {
            position: index,
            key: key.clone(),
        });
        Some(app)
    }

    /// Apps matching `query`, case-insensitively.
    ///
    /// Title matches come first, then apps whose comment contains the query
    /// or one of whose keywords starts with it. Both groups keep title order.
    pub fn matching_apps(&self, query: &str) -> Vec<Rc<AppEntry>> {
        let query = query.to_lowercase();
        let mut by_title = Vec::new();
        let mut by_details = Vec::new();

        for app in self.by_name.values() {
            if app.title_contains(&query) {
                by_title.push(app.clone());
            } else if app.details_match(&query) {
                by_details.push(app.clone());
            }
        }

        by_title.extend(by_details);
        by_title
    }

    fn favorites_mut(&mut self) -> &mut Vec<Rc<AppEntry>> {
        &mut self.categories[FAVORITES_CATEGORY].apps
    }

    pub fn favorites(&self) -> &[Rc<AppEntry>] {
        &self.categories[FAVORITES_CATEGORY].apps
    }

    /// Favorite ids in user order, for saving.
    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites().iter().map(|app| app.id.clone()).collect()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.categories[FAVORITES_CATEGORY].contains(id)
    }

    /// Append `id` to the favorites. Returns false if it already was one or
    /// cannot be resolved.
    pub fn add_favorite(&mut self, id: &str) -> bool {
        if self.is_favorite(id) {
            return false;
        }

        let app = match self.resolver.resolve(id) {
            Ok(description) => AppEntry::new(description),
            Err(e) => {
                debug!("Cannot add favorite: {}", e);
                return false;
            }
        };
        if self.is_favorite(&app.id) {
            return false;
        }

        self.favorites_mut().push(Rc::new(app));
        true
    }

    /// Returns false if `id` was not a favorite.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        let favorites = self.favorites_mut();
        let before = favorites.len();
        favorites.retain(|app| app.id != id);
        favorites.len() != before
    }

    /// Replace the favorites, in the given order. Unresolvable and repeated
    /// ids are dropped.
    pub fn set_favorites(&mut self, ids: &[String]) {
        let mut favorites: Vec<Rc<AppEntry>> = Vec::with_capacity(ids.len());
        for id in ids {
            match self.resolver.resolve(id) {
                Ok(description) => {
                    if !favorites.iter().any(|app| app.id == description.id) {
                        favorites.push(Rc::new(AppEntry::new(description)));
                    }
                }
                Err(e) => debug!("Dropping favorite: {}", e),
            }
        }
        *self.favorites_mut() = favorites;
    }
}

impl std::fmt::Debug for MenuIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuIndex")
            .field("categories", &self.categories.len())
            .field("apps", &self.by_name.len())
            .field("favorites", &self.favorites().len())
            .finish()
    }
}
