//! The visible surface the controller writes to.

use parking_lot::Mutex;
use std::sync::Arc;

/// The controls of the page, handed to the controller at construction time.
///
/// The label and the log are write-only from the controller's point of view; the amount input is
/// the only thing it reads.
pub trait Page: Send + Sync {
    /// Updates the label of the connect control.
    fn set_label(&self, text: &str);

    /// Returns the current contents of the amount input.
    fn amount(&self) -> String;

    /// Appends a line to the log.
    fn log(&self, line: &str);
}

impl<P: Page + ?Sized> Page for Arc<P> {
    fn set_label(&self, text: &str) {
        (**self).set_label(text)
    }

    fn amount(&self) -> String {
        (**self).amount()
    }

    fn log(&self, line: &str) {
        (**self).log(line)
    }
}

/// A [`Page`] that keeps everything in memory.
///
/// Useful for embedding the controller somewhere without a screen, and for asserting on what
/// would have been shown.
#[derive(Debug, Default)]
pub struct MemoryPage {
    label: Mutex<String>,
    amount: Mutex<String>,
    lines: Mutex<Vec<String>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount input, as if the user typed `amount`.
    pub fn set_amount(&self, amount: impl Into<String>) {
        *self.amount.lock() = amount.into();
    }

    pub fn label(&self) -> String {
        self.label.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Page for MemoryPage {
    fn set_label(&self, text: &str) {
        *self.label.lock() = text.to_string();
    }

    fn amount(&self) -> String {
        self.amount.lock().clone()
    }

    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
