#[cfg(feature = "parse-cfg")]
pub mod options_file;

use crate::notifications::Project;
use std::collections::HashMap;

/// Per-project key-value option storage owned by the host.
///
/// Plugins namespace their keys with their configuration key, e.g. `twilio_sms:sms_to`.
pub trait OptionStore: Send + Sync {
    /// Return the stored value for `key`, if any.
    fn get(&self, project: &Project, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, project: &Project, key: &str, value: String);
}

/// [`OptionStore`] backed by a [`HashMap`], keyed by project slug.
#[derive(Debug, Default, Clone)]
pub struct MemoryOptionStore {
    options: HashMap<(String, String), String>,
}

impl MemoryOptionStore {
    /// Create a new empty `MemoryOptionStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of stored options across all projects.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Return `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, project: &Project, key: &str) -> Option<String> {
        self.options.get(&(project.slug().to_string(), key.to_string())).cloned()
    }

    fn set(&mut self, project: &Project, key: &str, value: String) {
        self.options.insert((project.slug().to_string(), key.to_string()), value);
    }
}
