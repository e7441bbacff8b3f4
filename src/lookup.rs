use std::collections::{BTreeMap, HashMap};
use std::env;

/// A read-only source of named string values
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;

    /// Try `prefix + key` first, then `key`. An empty prefix is no prefix.
    fn lookup_prefixed(&self, prefix: Option<&str>, key: &str) -> Option<String> {
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            if let Some(value) = self.lookup(&format!("{prefix}{key}")) {
                return Some(value);
            }
        }
        self.lookup(key)
    }
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl<S: std::hash::BuildHasher> Lookup for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}
