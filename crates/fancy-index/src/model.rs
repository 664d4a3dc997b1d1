//! List-view binding protocol.
//!
//! A view asks a model for its row count and for the data of single rows.
//! Models announce structural changes with a reset bracket: after
//! [`ModelEvent::ResetBegin`] the view must not query the model until
//! [`ModelEvent::ResetEnd`] arrives.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    ResetBegin,
    ResetEnd,
}

/// Callback invoked on model resets.
pub type ModelCallback = Box<dyn Fn(ModelEvent)>;

/// What a view shows for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowData {
    pub title: String,
    pub tooltip: String,
    pub icon: Option<String>,
    /// Identifier used for editing / drag and drop (desktop file path or menu name).
    pub edit_id: String,
}

pub trait ListModel {
    fn row_count(&self) -> usize;

    /// None for rows outside `0..row_count()`.
    fn data_at(&self, row: usize) -> Option<RowData>;

    /// Register a reset listener.
    fn subscribe(&mut self, callback: ModelCallback);
}

/// Fans reset notifications out to the subscribed views.
#[derive(Default)]
pub struct ResetNotifier {
    callbacks: Vec<ModelCallback>,
}

impl ResetNotifier {
    pub fn subscribe(&mut self, callback: ModelCallback) {
        self.callbacks.push(callback);
    }

    pub fn begin(&self) {
        self.emit(ModelEvent::ResetBegin);
    }

    pub fn end(&self) {
        self.emit(ModelEvent::ResetEnd);
    }

    fn emit(&self, event: ModelEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }
}

impl fmt::Debug for ResetNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetNotifier")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
