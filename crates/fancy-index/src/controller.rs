//! Launcher controller: user-visible behaviour on top of the index and the
//! two list models.

use crate::app_list::AppListAdapter;
use crate::category_list::CategoryListAdapter;
use crate::entry::{ALL_APPS_CATEGORY, AppEntry, FAVORITES_CATEGORY};
use crate::index::MenuIndex;
use fancy_apps::{
    ActionInfo, Clipboard, DescriptionResolver, ExportOutcome, LaunchError, MenuError,
    MenuSource, export_to_desktop, run_command,
};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The window the menu is shown in.
pub trait Surface {
    /// Close the menu.
    fn hide(&self);

    /// Show a notice the user has to dismiss.
    fn show_warning(&self, title: &str, message: &str);

    /// Ask whether `path` may be overwritten. Declining is the default.
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Entry of the context menu of an app row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    /// Start a named sub-action instead of the default launch.
    RunAction(ActionInfo),
    AddToFavorites,
    RemoveFromFavorites,
    AddToDesktop,
    Copy,
}

impl ContextAction {
    pub fn label(&self) -> &str {
        match self {
            ContextAction::RunAction(action) => &action.name,
            ContextAction::AddToFavorites => "Add to Favorites",
            ContextAction::RemoveFromFavorites => "Remove from Favorites",
            ContextAction::AddToDesktop => "Add to Desktop",
            ContextAction::Copy => "Copy",
        }
    }
}

pub struct LauncherController {
    index: Rc<RefCell<MenuIndex>>,
    app_model: AppListAdapter,
    category_model: CategoryListAdapter,
    surface: Box<dyn Surface>,
    clipboard: Box<dyn Clipboard>,
    desktop_dir: PathBuf,
    search_text: String,
    filter_clear: bool,
}

impl LauncherController {
    pub fn new(
        resolver: Box<dyn DescriptionResolver>,
        surface: Box<dyn Surface>,
        clipboard: Box<dyn Clipboard>,
        desktop_dir: PathBuf,
    ) -> Self {
        let index = Rc::new(RefCell::new(MenuIndex::new(resolver)));
        let mut app_model = AppListAdapter::new();
        app_model.set_index(Some(&index));
        let mut category_model = CategoryListAdapter::new();
        category_model.set_index(Some(&index));

        Self {
            index,
            app_model,
            category_model,
            surface,
            clipboard,
            desktop_dir,
            search_text: String::new(),
            filter_clear: false,
        }
    }

    pub fn app_model(&self) -> &AppListAdapter {
        &self.app_model
    }

    pub fn app_model_mut(&mut self) -> &mut AppListAdapter {
        &mut self.app_model
    }

    pub fn category_model(&self) -> &CategoryListAdapter {
        &self.category_model
    }

    pub fn category_model_mut(&mut self) -> &mut CategoryListAdapter {
        &mut self.category_model
    }

    pub fn set_filter_clear(&mut self, filter_clear: bool) {
        self.filter_clear = filter_clear;
    }

    /// Reload the menu. Afterwards the search is empty and Favorites is shown.
    ///
    /// An unreadable source is reported to the user as well as returned.
    pub fn rebuild(&mut self, source: &dyn MenuSource) -> Result<(), MenuError> {
        self.app_model.begin_reset();
        self.category_model.begin_reset();

        let result = self.index.borrow_mut().rebuild(source);
        self.search_text.clear();
        self.app_model.select_category(FAVORITES_CATEGORY);

        self.category_model.end_reset();
        self.app_model.end_reset();

        if let Err(e) = &result {
            self.surface.show_warning("Parse error", &e.to_string());
        }
        result
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Filter the app list. An empty text returns to the last category.
    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        if text.is_empty() {
            self.app_model.end_search();
            return;
        }

        self.app_model.set_current_category(ALL_APPS_CATEGORY);
        let matches = self.index.borrow().matching_apps(text);
        debug!("{} apps match {:?}", matches.len(), text);
        self.app_model.show_search_results(matches);
    }

    pub fn current_category(&self) -> usize {
        self.app_model.current_category()
    }

    /// Show the category at `row` of the category list.
    pub fn activate_category(&mut self, row: usize) {
        self.search_text.clear();
        self.app_model.set_current_category(row);
    }

    /// Start the app at `row`. Returns true if it was started.
    pub fn activate_app(&mut self, row: usize) -> bool {
        let Some(app) = self.app_model.entry_at(row) else {
            return false;
        };

        info!("Starting {}", app.title);
        match app.handle().start() {
            Ok(()) => {
                self.surface.hide();
                true
            }
            Err(e) => {
                self.launch_failed(&app.title, &e);
                false
            }
        }
    }

    /// What the context menu of `row` offers; empty for an invalid row.
    pub fn context_actions(&self, row: usize) -> Vec<ContextAction> {
        let Some(app) = self.app_model.entry_at(row) else {
            return Vec::new();
        };

        let mut actions: Vec<ContextAction> = app
            .handle()
            .list_actions()
            .into_iter()
            .map(ContextAction::RunAction)
            .collect();
        if self.index.borrow().is_favorite(&app.id) {
            actions.push(ContextAction::RemoveFromFavorites);
        } else {
            actions.push(ContextAction::AddToFavorites);
        }
        actions.push(ContextAction::AddToDesktop);
        actions.push(ContextAction::Copy);
        actions
    }

    /// Run a context action on the app at `row`. Returns true on success.
    pub fn trigger(&mut self, row: usize, action: &ContextAction) -> bool {
        let Some(app) = self.app_model.entry_at(row) else {
            return false;
        };

        match action {
            ContextAction::RunAction(info) => match app.handle().activate_action(&info.id, &[]) {
                Ok(()) => {
                    self.surface.hide();
                    true
                }
                Err(e) => {
                    self.launch_failed(&info.name, &e);
                    false
                }
            },
            ContextAction::AddToFavorites => {
                self.change_favorites(|index| index.add_favorite(&app.id))
            }
            ContextAction::RemoveFromFavorites => {
                self.change_favorites(|index| index.remove_favorite(&app.id))
            }
            ContextAction::AddToDesktop => self.add_to_desktop(&app),
            ContextAction::Copy => match self.clipboard.copy_file_reference(Path::new(&app.id)) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Cannot copy {}: {}", app.id, e);
                    self.surface
                        .show_warning("Copy", &format!("Cannot copy {}: {}", app.id, e));
                    false
                }
            },
        }
    }

    /// Start a helper program such as the leave dialog or the settings center.
    pub fn run_helper(&mut self, command: &str) -> bool {
        match run_command(command) {
            Ok(()) => {
                self.surface.hide();
                true
            }
            Err(e) => {
                warn!("Cannot run {}: {}", command, e);
                self.surface.show_warning(
                    "No Executable",
                    &format!("Cannot find {} executable.", command),
                );
                false
            }
        }
    }

    /// Called each time the menu is about to be shown.
    pub fn on_show(&mut self) {
        if self.filter_clear && !self.search_text.is_empty() {
            self.set_search_text("");
        }
    }

    pub fn set_favorites(&mut self, ids: &[String]) {
        self.change_favorites(|index| {
            index.set_favorites(ids);
            true
        });
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.index.borrow().favorite_ids()
    }

    fn change_favorites<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut MenuIndex) -> bool,
    {
        self.app_model.begin_reset();
        let changed = change(&mut *self.index.borrow_mut());
        self.app_model.end_reset();
        changed
    }

    fn add_to_desktop(&self, app: &AppEntry) -> bool {
        let outcome = export_to_desktop(Path::new(&app.id), &self.desktop_dir, |path| {
            self.surface.confirm_overwrite(path)
        });
        match outcome {
            Ok(ExportOutcome::Copied(_)) => true,
            Ok(ExportOutcome::Declined(_)) => false,
            Err(e) => {
                warn!("Cannot add {} to the desktop: {}", app.id, e);
                self.surface.show_warning(
                    "Add to Desktop",
                    &format!(
                        "Cannot create a desktop icon in {}: {}",
                        self.desktop_dir.display(),
                        e
                    ),
                );
                false
            }
        }
    }

    fn launch_failed(&self, what: &str, error: &LaunchError) {
        let command = error.command().unwrap_or(what);
        warn!("Launch failed: {}", error);
        self.surface
            .show_warning("Launch failed", &format!("Cannot start {}: {}", command, error));
    }
}

impl Drop for LauncherController {
    fn drop(&mut self) {
        self.app_model.set_index(None);
        self.category_model.set_index(None);
    }
}
