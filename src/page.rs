use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Input element holding the latitude
pub const LATITUDE_ID: &str = "latitude";
/// Input element holding the longitude
pub const LONGITUDE_ID: &str = "longitude";
/// Display element receiving the resolved timezone name
pub const TIMEZONE_ID: &str = "timezone";

/// The page surrounding the updater: input fields it reads and the display it writes.
pub trait Page: Send + Sync {
    /// Current value of an input element, empty when the element has no value.
    fn value(&self, id: &str) -> String;

    /// Replace the text content of a display element.
    fn set_text(&self, id: &str, text: &str);
}

/// In-memory page used by the command line front end.
#[derive(Debug, Default)]
pub struct MemoryPage {
    values: Mutex<HashMap<String, String>>,
    texts: Mutex<HashMap<String, String>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of an input element, as a user typing into it would.
    pub fn set_value(&self, id: &str, value: &str) {
        lock(&self.values).insert(id.to_string(), value.to_string());
    }

    /// Text content of a display element, empty if it was never written.
    pub fn text(&self, id: &str) -> String {
        lock(&self.texts).get(id).cloned().unwrap_or_default()
    }
}

impl Page for MemoryPage {
    fn value(&self, id: &str) -> String {
        lock(&self.values).get(id).cloned().unwrap_or_default()
    }

    fn set_text(&self, id: &str, text: &str) {
        lock(&self.texts).insert(id.to_string(), text.to_string());
    }
}

// a panic while holding the lock cannot leave a map half-written
fn lock(map: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}
