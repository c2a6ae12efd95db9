use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

/// Snapshot of one actionable control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub label: String,
    pub busy: bool,
    pub disabled: bool,
    original_label: Option<String>,
}

/// A button or link that triggers actions. Clones share state.
///
/// A busy control accepts no new action until the in-flight one settles.
#[derive(Debug, Clone)]
pub struct Control {
    inner: Arc<Mutex<ControlState>>,
}

impl Control {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControlState {
                label: label.into(),
                busy: false,
                disabled: false,
                original_label: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ControlState {
        self.lock().clone()
    }

    pub fn label(&self) -> String {
        self.lock().label.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn is_disabled(&self) -> bool {
        self.lock().disabled
    }

    /// Marks the control busy and shows `progress_label` in place of its label.
    ///
    /// Returns `None` when the control is already busy. The control goes back to
    /// idle when the returned guard is dropped.
    pub fn show_busy(&self, progress_label: &str) -> Option<BusyGuard> {
        let mut state = self.lock();
        if state.busy {
            return None;
        }
        state.busy = true;
        state.disabled = true;
        if state.original_label.is_none() {
            state.original_label = Some(state.label.clone());
        }
        state.label = progress_label.to_string();
        debug!(label = %progress_label, "Control busy");

        Some(BusyGuard {
            control: self.clone(),
        })
    }

    fn show_idle(&self) {
        let mut state = self.lock();
        if let Some(original) = state.original_label.take() {
            state.label = original;
        }
        state.busy = false;
        state.disabled = false;
        debug!(label = %state.label, "Control idle");
    }
}

/// Keeps a [`Control`] busy for as long as it lives.
#[derive(Debug)]
pub struct BusyGuard {
    control: Control,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.control.show_idle();
    }
}
