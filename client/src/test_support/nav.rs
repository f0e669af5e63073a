//! Recording navigation sink.

use std::sync::Mutex;

use crate::domain::ports::{Navigator, RedirectTarget};

/// Navigator that records every redirect for assertions.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<RedirectTarget>>,
}

impl RecordingNavigator {
    /// Redirects observed so far, in order.
    pub fn redirects(&self) -> Vec<RedirectTarget> {
        self.redirects.lock().expect("navigator mutex").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, target: RedirectTarget) {
        self.redirects.lock().expect("navigator mutex").push(target);
    }
}
