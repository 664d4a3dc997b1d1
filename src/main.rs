//! FancyMenu - application menu for LXQt-style desktops
//!
//! Terminal front end: reads the XDG menu, shows categories and apps and
//! takes one command per line.

mod console;
mod settings;

use console::{Command, TerminalSurface, parse_command, render, render_actions};
use fancy_apps::{
    AppCatalog, MenuWatcher, SystemClipboard, XdgMenu, drain_changes,
    get_application_directories, get_desktop_directory,
};
use fancy_index::{ContextAction, LauncherController};
use log::{info, warn};
use settings::Settings;
use std::cell::Cell;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

const LEAVE_COMMAND: &str = "lxqt-leave";
const CONFIG_COMMAND: &str = "lxqt-config";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = Settings::default_path();
    let mut settings = Settings::load(&settings_path);
    info!("Starting FancyMenu (shortcut {})", settings.shortcut);

    let menu = match &settings.menu_file {
        Some(file) => XdgMenu::new(file.clone()),
        None => XdgMenu::find_default()?,
    }
    .with_environments(settings.environments.clone());
    info!("Using menu {}", menu.file().display());

    let mut catalog = AppCatalog::new();
    catalog.set_terminal(settings.terminal.clone());

    let hidden = Rc::new(Cell::new(false));
    let mut controller = LauncherController::new(
        Box::new(catalog),
        Box::new(TerminalSurface::new(hidden.clone())),
        Box::new(SystemClipboard),
        get_desktop_directory(),
    );
    controller.set_filter_clear(settings.filter_clear);
    controller.set_favorites(&settings.favorites);
    // Parse errors were already shown
    let _ = controller.rebuild(&menu);
    if !settings.filter_clear && !settings.last_filter.is_empty() {
        controller.set_search_text(&settings.last_filter);
    }

    let watcher = match MenuWatcher::start(menu.file(), &get_application_directories()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Menu changes will not be picked up: {}", e);
            None
        }
    };
    let mut changes = watcher.as_ref().map(|w| w.subscribe());

    let stdin = io::stdin();
    loop {
        if hidden.get() {
            println!("Menu closed. Press Enter to open it again, :q to quit.");
        } else {
            print!("{}", render(&controller));
        }
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        if let Some(rx) = changes.as_mut() {
            if drain_changes(rx) {
                info!("Menu changed, rebuilding");
                let _ = controller.rebuild(&menu);
            }
        }

        let command = parse_command(&line);
        if hidden.get() {
            if command == Command::Quit {
                break;
            }
            hidden.set(false);
            controller.on_show();
            continue;
        }

        match command {
            Command::Search(text) => controller.set_search_text(&text),
            Command::Category(row) => controller.activate_category(row),
            Command::Run(row) => {
                if !controller.activate_app(row) {
                    println!("Nothing started.");
                }
            }
            Command::Actions(row) => {
                let actions = controller.context_actions(row);
                if actions.is_empty() {
                    println!("No app in row {}.", row + 1);
                } else {
                    print!("{}", render_actions(&actions));
                }
            }
            Command::Trigger { row, action } => {
                let actions = controller.context_actions(row);
                let Some(action) = actions.get(action) else {
                    println!("No such action.");
                    continue;
                };
                controller.trigger(row, action);
                if matches!(
                    action,
                    ContextAction::AddToFavorites | ContextAction::RemoveFromFavorites
                ) {
                    settings.favorites = controller.favorite_ids();
                    save(&settings, &settings_path);
                }
            }
            Command::Leave => {
                controller.run_helper(LEAVE_COMMAND);
            }
            Command::Config => {
                controller.run_helper(CONFIG_COMMAND);
            }
            Command::Quit => break,
            Command::Invalid(line) => {
                println!(
                    "Unknown command {:?}. Commands: :c N, :r N, :a N, :x N K, :leave, :config, :q",
                    line
                );
            }
        }
    }

    settings.favorites = controller.favorite_ids();
    settings.last_filter = controller.search_text().to_string();
    save(&settings, &settings_path);
    info!("FancyMenu stopped.");
    Ok(())
}

fn save(settings: &Settings, path: &std::path::Path) {
    if let Err(e) = settings.save(path) {
        warn!("Cannot save settings to {}: {}", path.display(), e);
    }
}
