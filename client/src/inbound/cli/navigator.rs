//! Navigator for a terminal session.

use std::sync::Mutex;

use tracing::info;

use crate::domain::ports::{Destination, Navigator};

/// Logs every navigation and remembers where the user ended up.
///
/// A terminal has no screens to switch, so the final destination is printed
/// by the caller as a hint for the next command.
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    current: Mutex<Option<Destination>>,
}

impl ConsoleNavigator {
    /// Create a navigator that has not moved yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest destination, if any navigation happened.
    pub fn current(&self) -> Option<Destination> {
        self.current.lock().ok().and_then(|current| *current)
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: Destination) {
        info!(%destination, "navigate");
        if let Ok(mut current) = self.current.lock() {
            *current = Some(destination);
        }
    }
}
