//! App list model: the apps of the selected category, or search results.

use crate::entry::{ALL_APPS_CATEGORY, AppEntry, FAVORITES_CATEGORY};
use crate::index::MenuIndex;
use crate::model::{ListModel, ModelCallback, ResetNotifier, RowData};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
enum Mode {
    #[default]
    Category,
    Search(Vec<Rc<AppEntry>>),
}

/// Presents the apps of one category of a [`MenuIndex`].
///
/// Holds only a weak reference to the index; a dropped or detached index
/// shows as an empty list.
#[derive(Debug, Default)]
pub struct AppListAdapter {
    index: Weak<RefCell<MenuIndex>>,
    current_category: usize,
    mode: Mode,
    notifier: ResetNotifier,
}

impl AppListAdapter {
    pub fn new() -> Self {
        Self {
            current_category: FAVORITES_CATEGORY,
            ..Default::default()
        }
    }

    /// Attach to an index, or detach with None.
    pub fn set_index(&mut self, index: Option<&Rc<RefCell<MenuIndex>>>) {
        self.notifier.begin();
        self.index = index.map(Rc::downgrade).unwrap_or_default();
        self.mode = Mode::Category;
        self.notifier.end();
    }

    /// Announce that the index is about to change structurally.
    pub fn begin_reset(&self) {
        self.notifier.begin();
    }

    /// Announce that the index change is complete.
    pub fn end_reset(&self) {
        self.notifier.end();
    }

    pub fn current_category(&self) -> usize {
        self.current_category
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.mode, Mode::Search(_))
    }

    /// Show `category`, leaving any search.
    pub fn set_current_category(&mut self, category: usize) {
        self.notifier.begin();
        self.select_category(category);
        self.notifier.end();
    }

    /// Switch category without notifying; the caller brackets the change.
    pub(crate) fn select_category(&mut self, category: usize) {
        self.current_category = category;
        self.mode = Mode::Category;
    }

    pub fn show_search_results(&mut self, apps: Vec<Rc<AppEntry>>) {
        self.notifier.begin();
        self.mode = Mode::Search(apps);
        self.notifier.end();
    }

    /// Back to the last selected category.
    pub fn end_search(&mut self) {
        if !self.is_searching() {
            return;
        }
        self.notifier.begin();
        self.mode = Mode::Category;
        self.notifier.end();
    }

    /// The app shown at `row`.
    pub fn entry_at(&self, row: usize) -> Option<Rc<AppEntry>> {
        let index = self.index.upgrade()?;
        let index = index.try_borrow().ok()?;
        if self.current_category >= index.category_count() {
            return None;
        }

        match &self.mode {
            Mode::Search(apps) => apps.get(row).cloned(),
            Mode::Category if self.current_category == ALL_APPS_CATEGORY => {
                index.app_at(row).cloned()
            }
            Mode::Category => index
                .category_at(self.current_category)
                .and_then(|c| c.apps.get(row).cloned()),
        }
    }
}

impl ListModel for AppListAdapter {
    fn row_count(&self) -> usize {
        let Some(index) = self.index.upgrade() else {
            return 0;
        };
        let Ok(index) = index.try_borrow() else {
            return 0;
        };
        if self.current_category >= index.category_count() {
            return 0;
        }

        match &self.mode {
            Mode::Search(apps) => apps.len(),
            Mode::Category if self.current_category == ALL_APPS_CATEGORY => {
                index.total_app_count()
            }
            Mode::Category => index
                .category_at(self.current_category)
                .map(|c| c.apps.len())
                .unwrap_or(0),
        }
    }

    fn data_at(&self, row: usize) -> Option<RowData> {
        self.entry_at(row).map(|app| RowData {
            title: app.title.clone(),
            tooltip: app.comment.clone(),
            icon: app.icon.clone(),
            edit_id: app.id.clone(),
        })
    }

    fn subscribe(&mut self, callback: ModelCallback) {
        self.notifier.subscribe(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelEvent;
    use crate::testing::utilities_menu;
    use std::cell::RefCell;

    fn attached() -> (Rc<RefCell<MenuIndex>>, AppListAdapter) {
        let (resolver, menu) = utilities_menu();
        let index = Rc::new(RefCell::new(MenuIndex::new(Box::new(resolver))));
        index.borrow_mut().rebuild(&menu).unwrap();
        let mut adapter = AppListAdapter::new();
        adapter.set_index(Some(&index));
        (index, adapter)
    }

    fn titles(adapter: &AppListAdapter) -> Vec<String> {
        (0..adapter.row_count())
            .filter_map(|row| adapter.data_at(row))
            .map(|data| data.title)
            .collect()
    }

    #[test]
    fn detached_adapter_is_empty() {
        let adapter = AppListAdapter::new();
        assert_eq!(adapter.row_count(), 0);
        assert!(adapter.data_at(0).is_none());
    }

    #[test]
    fn category_mode_rows() {
        let (index, mut adapter) = attached();
        index.borrow_mut().add_favorite("/apps/b.desktop");

        assert_eq!(titles(&adapter), vec!["Calculator"]);

        adapter.set_current_category(ALL_APPS_CATEGORY);
        assert_eq!(titles(&adapter), vec!["Calculator", "Text Editor"]);

        adapter.set_current_category(2);
        assert_eq!(titles(&adapter), vec!["Text Editor", "Calculator"]);
        let row = adapter.data_at(0).unwrap();
        assert_eq!(row.tooltip, "Edit text files");
        assert_eq!(row.edit_id, "/apps/a.desktop");
        assert_eq!(row.icon.as_deref(), Some("text editor-icon"));

        assert!(adapter.data_at(2).is_none());
    }

    #[test]
    fn out_of_range_category_is_empty() {
        let (_index, mut adapter) = attached();
        adapter.set_current_category(7);
        assert_eq!(adapter.row_count(), 0);
        assert!(adapter.entry_at(0).is_none());
    }

    #[test]
    fn search_mode_and_back() {
        let (index, mut adapter) = attached();
        adapter.set_current_category(2);

        let results = index.borrow().matching_apps("calc");
        adapter.show_search_results(results);
        assert!(adapter.is_searching());
        assert_eq!(titles(&adapter), vec!["Calculator"]);

        adapter.end_search();
        assert!(!adapter.is_searching());
        assert_eq!(adapter.current_category(), 2);
        assert_eq!(adapter.row_count(), 2);

        adapter.show_search_results(Vec::new());
        adapter.set_current_category(ALL_APPS_CATEGORY);
        assert!(!adapter.is_searching());
    }

    #[test]
    fn dropping_the_index_empties_the_list() {
        let (index, mut adapter) = attached();
        adapter.set_current_category(ALL_APPS_CATEGORY);
        assert_eq!(adapter.row_count(), 2);

        drop(index);
        assert_eq!(adapter.row_count(), 0);
        assert!(adapter.entry_at(0).is_none());
    }

    #[test]
    fn changes_are_bracketed() {
        let (_index, mut adapter) = attached();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        adapter.subscribe(Box::new(move |event| sink.borrow_mut().push(event)));

        adapter.set_current_category(2);
        adapter.end_search();
        adapter.show_search_results(Vec::new());
        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::ResetBegin,
                ModelEvent::ResetEnd,
                ModelEvent::ResetBegin,
                ModelEvent::ResetEnd,
            ]
        );
    }
}
