//! Spinning status indicator with guaranteed release.
//!
//! A [`StatusBarEntry`] owns one host status item. It is disposed exactly
//! once: explicitly through [`StatusBarEntry::dispose`] or, failing that, when
//! the entry is dropped (error return, panic unwinding, cancelled future).
//! [`Status`] handles given out to the wrapped action share the entry's slot,
//! so an action that outlives its scope can no longer touch the UI.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kide_types::{Host, Status, StatusItem};

/// Codicon prefix the host renders as a spinning sync icon.
pub const SPINNER_PREFIX: &str = "$(sync~spin)";

struct Slot {
    prefix: String,
    /// `None` once disposed.
    item: Option<Box<dyn StatusItem>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn update_slot(slot: &Mutex<Slot>, message: &str) {
    let mut slot = lock(slot);
    let text = format!("{} {message}", slot.prefix);
    if let Some(item) = slot.item.as_mut() {
        item.set_text(&text);
    }
}

pub struct StatusBarEntry {
    slot: Arc<Mutex<Slot>>,
}

impl StatusBarEntry {
    /// Create a hidden entry whose text starts as just `prefix`.
    pub fn new(host: &dyn Host, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let mut item = host.create_status_item();
        item.set_text(&prefix);
        Self {
            slot: Arc::new(Mutex::new(Slot {
                prefix,
                item: Some(item),
            })),
        }
    }

    pub fn show(&self) {
        if let Some(item) = lock(&self.slot).item.as_mut() {
            item.show();
        }
    }

    /// A shareable status capability tied to this entry.
    #[must_use]
    pub fn handle(&self) -> Arc<dyn Status> {
        Arc::new(StatusHandle {
            slot: Arc::clone(&self.slot),
        })
    }

    /// Release the host item. Returns `false` if it was already released.
    pub fn dispose(&self) -> bool {
        match lock(&self.slot).item.take() {
            Some(mut item) => {
                item.dispose();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        lock(&self.slot).item.is_none()
    }
}

impl Status for StatusBarEntry {
    fn update(&self, message: &str) {
        update_slot(&self.slot, message);
    }
}

impl Drop for StatusBarEntry {
    fn drop(&mut self) {
        self.dispose();
    }
}

struct StatusHandle {
    slot: Arc<Mutex<Slot>>,
}

impl Status for StatusHandle {
    fn update(&self, message: &str) {
        update_slot(&self.slot, message);
    }
}

/// Run `action` with a visible spinner that disappears as soon as the action
/// settles, whatever its outcome.
pub async fn with_spinning_status<F, Fut>(host: &dyn Host, action: F) -> Fut::Output
where
    F: FnOnce(Arc<dyn Status>) -> Fut,
    Fut: Future,
{
    let entry = StatusBarEntry::new(host, SPINNER_PREFIX);
    entry.show();
    let output = action(entry.handle()).await;
    entry.dispose();
    output
}
