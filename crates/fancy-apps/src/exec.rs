//! Exec line expansion and detached process start.

use crate::desktop_entry::DesktopFile;
use crate::error::LaunchError;
use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// A named sub-action offered by a launch handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInfo {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

/// Capability to start an application or one of its sub-actions.
pub trait LaunchHandle {
    /// Start the application detached.
    fn start(&self) -> Result<(), LaunchError>;

    /// Named sub-actions, in declared order.
    fn list_actions(&self) -> Vec<ActionInfo>;

    /// Start the sub-action `id` with optional file/URL arguments.
    fn activate_action(&self, id: &str, args: &[String]) -> Result<(), LaunchError>;
}

impl LaunchHandle for DesktopFile {
    fn start(&self) -> Result<(), LaunchError> {
        let argv = self.expand_exec(&self.exec, &[])?;
        spawn_detached(&argv, self.working_dir.as_deref())
    }

    fn list_actions(&self) -> Vec<ActionInfo> {
        self.actions
            .iter()
            .map(|a| ActionInfo {
                id: a.id.clone(),
                name: a.name.clone(),
                icon: a.icon.clone().or_else(|| self.icon.clone()),
            })
            .collect()
    }

    fn activate_action(&self, id: &str, args: &[String]) -> Result<(), LaunchError> {
        let action = self
            .action(id)
            .ok_or_else(|| LaunchError::UnknownAction(id.to_string()))?;
        let argv = self.expand_exec(&action.exec, args)?;
        spawn_detached(&argv, self.working_dir.as_deref())
    }
}

impl DesktopFile {
    /// Turn an Exec value into argv, substituting field codes.
    pub fn expand_exec(&self, exec: &str, args: &[String]) -> Result<Vec<String>, LaunchError> {
        let mut argv = Vec::new();

        for token in split_exec(exec) {
            match token.as_str() {
                "%f" | "%u" => argv.extend(args.first().cloned()),
                "%F" | "%U" => argv.extend(args.iter().cloned()),
                "%i" => {
                    if let Some(icon) = &self.icon {
                        argv.push("--icon".to_string());
                        argv.push(icon.clone());
                    }
                }
                _ => {
                    let expanded = self.expand_inline_codes(&token);
                    if !expanded.is_empty() || !token.contains('%') {
                        argv.push(expanded);
                    }
                }
            }
        }

        if argv.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }

        if self.terminal {
            let terminal = match &self.terminal_command {
                Some(command) => split_exec(command),
                None => vec![std::env::var("TERMINAL").unwrap_or_else(|_| "xterm".to_string())],
            };
            let mut wrapped = terminal;
            wrapped.push("-e".to_string());
            wrapped.extend(argv);
            argv = wrapped;
        }

        Ok(argv)
    }

    fn expand_inline_codes(&self, token: &str) -> String {
        let mut out = String::with_capacity(token.len());
        let mut chars = token.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('c') => out.push_str(&self.name),
                Some('k') => out.push_str(&self.path.to_string_lossy()),
                // Deprecated or misplaced codes are dropped
                _ => {}
            }
        }
        out
    }
}

/// Split an Exec value into arguments.
/// Double quotes group words; inside them a backslash escapes the next char.
pub fn split_exec(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            _ => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args
}

/// Start a program with null stdio and reap it in the background.
pub fn spawn_detached(argv: &[String], working_dir: Option<&Path>) -> Result<(), LaunchError> {
    let (program, rest) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

    let mut command = Command::new(program);
    command
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    match command.spawn() {
        Ok(mut child) => {
            debug!("Started {} (pid {})", program, child.id());
            std::thread::spawn(move || {
                let _ = child.wait();
            });
            Ok(())
        }
        Err(source) => {
            let command = argv.join(" ");
            warn!("Failed to start {}: {}", command, source);
            Err(LaunchError::Spawn { command, source })
        }
    }
}

/// Start a helper program given as a plain command line.
pub fn run_command(command_line: &str) -> Result<(), LaunchError> {
    spawn_detached(&split_exec(command_line), None)
}
