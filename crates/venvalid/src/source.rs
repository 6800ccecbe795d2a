//! Raw value sources.
//!
//! The resolver reads raw strings through [`EnvSource`]. Any map of strings
//! works; [`ProcessEnv`] snapshots the process environment so the values
//! cannot change while a spec is being resolved.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Lookup of raw variable values by name.
pub trait EnvSource {
    /// Raw value for `name`, or `None` when the variable is absent.
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: BuildHasher> EnvSource for HashMap<&str, &str, S> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).copied()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl EnvSource for [(&str, &str)] {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> EnvSource for [(&str, &str); N] {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.as_slice().lookup(name)
    }
}

impl EnvSource for Vec<(String, String)> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Point-in-time copy of the process environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    vars: HashMap<String, String>,
}

impl ProcessEnv {
    /// Snapshot the current process environment.
    ///
    /// A value that is not valid UTF-8 is kept with its invalid bytes
    /// replaced by U+FFFD, so the variable still counts as present. Entries
    /// whose name is not valid UTF-8 cannot be looked up and are skipped.
    pub fn capture() -> Self {
        let mut vars = HashMap::new();
        for (key, value) in std::env::vars_os() {
            let Ok(key) = key.into_string() else {
                tracing::trace!("skipping environment variable with non-UTF-8 name");
                continue;
            };
            let value = match value.into_string() {
                Ok(value) => value,
                Err(raw) => {
                    tracing::warn!(var = %key, "environment variable has a non-UTF-8 value");
                    raw.to_string_lossy().into_owned()
                }
            };
            vars.insert(key, value);
        }
        tracing::trace!(count = vars.len(), "captured process environment");
        ProcessEnv { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.vars.lookup(name)
    }
}
