//! fancy-index: the searchable application index behind the menu.
//!
//! Provides:
//! - `MenuIndex`, the deduplicated catalog with categories and favorites
//! - List models for the category list and the app list
//! - `LauncherController`, which ties them to a surface

mod app_list;
mod category_list;
mod controller;
mod entry;
mod index;
mod model;

#[cfg(test)]
mod testing;

pub use app_list::AppListAdapter;
pub use category_list::CategoryListAdapter;
pub use controller::{ContextAction, LauncherController, Surface};
pub use entry::{ALL_APPS_CATEGORY, AppEntry, Category, FAVORITES_CATEGORY};
pub use index::MenuIndex;
pub use model::{ListModel, ModelCallback, ModelEvent, ResetNotifier, RowData};
