//! Line-oriented terminal surface for the launcher.

use fancy_index::{ContextAction, LauncherController, ListModel, Surface};
use std::cell::Cell;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

/// One line of user input. Row and category numbers are already zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text; empty clears the search.
    Search(String),
    Category(usize),
    Run(usize),
    Actions(usize),
    Trigger { row: usize, action: usize },
    Leave,
    Config,
    Quit,
    Invalid(String),
}

/// Parse a line typed at the prompt. Numbers are shown and typed one-based.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Search(line.to_string());
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let numbers: Vec<Option<usize>> = words.map(parse_number).collect();

    match (name, numbers.as_slice()) {
        ("c", [Some(n)]) => Command::Category(*n),
        ("r", [Some(n)]) => Command::Run(*n),
        ("a", [Some(n)]) => Command::Actions(*n),
        ("x", [Some(row), Some(action)]) => Command::Trigger {
            row: *row,
            action: *action,
        },
        ("leave", []) => Command::Leave,
        ("config", []) => Command::Config,
        ("q", []) => Command::Quit,
        _ => Command::Invalid(line.to_string()),
    }
}

fn parse_number(word: &str) -> Option<usize> {
    word.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

/// "y" or "yes" confirms; anything else declines.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Text view of the category list, the search text and the app list.
pub fn render(controller: &LauncherController) -> String {
    let mut out = String::new();
    let categories = controller.category_model();
    let current = controller.current_category();
    let searching = controller.app_model().is_searching();

    let _ = writeln!(out, "Categories:");
    for row in 0..categories.row_count() {
        if let Some(data) = categories.data_at(row) {
            let marker = if row == current && !searching { '*' } else { ' ' };
            let _ = writeln!(out, " {} {:>2}. {}", marker, row + 1, data.title);
        }
    }

    if searching {
        let _ = writeln!(out, "Search: {}", controller.search_text());
    }

    let apps = controller.app_model();
    let _ = writeln!(out, "Apps:");
    if apps.row_count() == 0 {
        let _ = writeln!(out, "   (none)");
    }
    for row in 0..apps.row_count() {
        if let Some(data) = apps.data_at(row) {
            if data.tooltip.is_empty() {
                let _ = writeln!(out, "   {:>2}. {}", row + 1, data.title);
            } else {
                let _ = writeln!(out, "   {:>2}. {} - {}", row + 1, data.title, data.tooltip);
            }
        }
    }
    out
}

/// Numbered list of context actions.
pub fn render_actions(actions: &[ContextAction]) -> String {
    let mut out = String::new();
    for (i, action) in actions.iter().enumerate() {
        let _ = writeln!(out, "   {:>2}. {}", i + 1, action.label());
    }
    out
}

/// Surface that prints to the terminal and asks on stdin.
pub struct TerminalSurface {
    hidden: Rc<Cell<bool>>,
}

impl TerminalSurface {
    /// `hidden` is set when the menu closes.
    pub fn new(hidden: Rc<Cell<bool>>) -> Self {
        Self { hidden }
    }
}

impl Surface for TerminalSurface {
    fn hide(&self) {
        self.hidden.set(true);
    }

    fn show_warning(&self, title: &str, message: &str) {
        eprintln!("[{}] {}", title, message);
    }

    fn confirm_overwrite(&self, path: &Path) -> bool {
        print!("{} already exists. Overwrite? [y/N] ", path.display());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}
