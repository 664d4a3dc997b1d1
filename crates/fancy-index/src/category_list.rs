//! Category list model.

use crate::index::MenuIndex;
use crate::model::{ListModel, ModelCallback, ResetNotifier, RowData};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Presents the categories of a [`MenuIndex`], Favorites and All
/// Applications first.
#[derive(Debug, Default)]
pub struct CategoryListAdapter {
    index: Weak<RefCell<MenuIndex>>,
    notifier: ResetNotifier,
}

impl CategoryListAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to an index, or detach with None.
    pub fn set_index(&mut self, index: Option<&Rc<RefCell<MenuIndex>>>) {
        self.notifier.begin();
        self.index = index.map(Rc::downgrade).unwrap_or_default();
        self.notifier.end();
    }

    pub fn begin_reset(&self) {
        self.notifier.begin();
    }

    pub fn end_reset(&self) {
        self.notifier.end();
    }
}

impl ListModel for CategoryListAdapter {
    fn row_count(&self) -> usize {
        self.index
            .upgrade()
            .and_then(|index| index.try_borrow().ok().map(|i| i.category_count()))
            .unwrap_or(0)
    }

    fn data_at(&self, row: usize) -> Option<RowData> {
        let index = self.index.upgrade()?;
        let index = index.try_borrow().ok()?;
        let category = index.category_at(row)?;
        Some(RowData {
            title: category.title.clone(),
            tooltip: category.title.clone(),
            icon: category.icon.clone(),
            edit_id: category.name.clone(),
        })
    }

    fn subscribe(&mut self, callback: ModelCallback) {
        self.notifier.subscribe(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::utilities_menu;

    #[test]
    fn lists_synthetic_and_parsed_categories() {
        let (resolver, menu) = utilities_menu();
        let index = Rc::new(RefCell::new(MenuIndex::new(Box::new(resolver))));
        index.borrow_mut().rebuild(&menu).unwrap();

        let mut adapter = CategoryListAdapter::new();
        assert_eq!(adapter.row_count(), 0);
        adapter.set_index(Some(&index));

        let titles: Vec<String> = (0..adapter.row_count())
            .filter_map(|row| adapter.data_at(row))
            .map(|row| row.title)
            .collect();
        assert_eq!(titles, vec!["Favorites", "All Applications", "Utilities"]);

        let utilities = adapter.data_at(2).unwrap();
        assert_eq!(utilities.edit_id, "Utilities");
        assert_eq!(utilities.icon.as_deref(), Some("utilities-icon"));
        assert!(adapter.data_at(3).is_none());

        adapter.set_index(None);
        assert_eq!(adapter.row_count(), 0);
    }
}
