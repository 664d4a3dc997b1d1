//! Menu change notifications.
//!
//! Watches the menu file and the application dirs with notify and turns any
//! change into a single broadcast [`MenuEvent`]. Receivers drain the channel
//! on their own thread and rebuild from there.

use log::{debug, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Broadcast channel capacity. Only the latest change matters.
const CHANNEL_CAPACITY: usize = 16;

/// Events emitted when the menu content changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Changed,
}

/// Keeps the notify watcher alive; dropping it stops notifications.
pub struct MenuWatcher {
    _watcher: RecommendedWatcher,
    event_tx: broadcast::Sender<MenuEvent>,
}

impl MenuWatcher {
    /// Watch the menu file and every existing directory in `app_dirs`.
    pub fn start(menu_file: &Path, app_dirs: &[PathBuf]) -> notify::Result<Self> {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let sender = tx.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(&event.kind) => {
                debug!("Menu change: {:?}", event.paths);
                // No receivers is fine
                let _ = sender.send(MenuEvent::Changed);
            }
            Ok(_) => {}
            Err(e) => warn!("Menu watch error: {}", e),
        })?;

        watcher.watch(menu_file, RecursiveMode::NonRecursive)?;
        let mut watched = 1;

        for dir in app_dirs.iter().filter(|d| d.is_dir()) {
            match watcher.watch(dir, RecursiveMode::Recursive) {
                Ok(()) => watched += 1,
                Err(e) => warn!("Cannot watch {}: {}", dir.display(), e),
            }
        }

        info!("Watching {} menu paths for changes", watched);
        Ok(Self {
            _watcher: watcher,
            event_tx: tx,
        })
    }

    /// Subscribe to menu changes.
    pub fn subscribe(&self) -> broadcast::Receiver<MenuEvent> {
        self.event_tx.subscribe()
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Drain all pending events. Returns true if at least one change arrived.
/// Handles Lagged by continuing to drain.
pub fn drain_changes(rx: &mut broadcast::Receiver<MenuEvent>) -> bool {
    let mut changed = false;
    loop {
        match rx.try_recv() {
            Ok(MenuEvent::Changed) => changed = true,
            Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
            Err(broadcast::error::TryRecvError::Empty) => break,
            Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }
    changed
}
