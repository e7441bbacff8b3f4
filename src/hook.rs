use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Observer for loads and reads. Calls are synchronous and their results ignored.
pub trait Hook: Send + Sync {
    /// After an env file was applied
    fn on_load(&self, source: &str, keys: usize);

    /// After each getter read
    fn on_get(&self, key: &str, found: bool, elapsed: Duration);
}

static HOOK: RwLock<Option<Arc<dyn Hook>>> = RwLock::new(None);

/// Install the process-wide hook, replacing any previous one
pub fn set_hook(hook: Arc<dyn Hook>) {
    let mut slot = HOOK.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(hook);
}

pub fn clear_hook() {
    let mut slot = HOOK.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

fn current() -> Option<Arc<dyn Hook>> {
    HOOK.read().unwrap_or_else(|e| e.into_inner()).clone()
}

pub(crate) fn call_on_load(source: &str, keys: usize) {
    if let Some(hook) = current() {
        hook.on_load(source, keys);
    }
}

pub(crate) fn call_on_get(key: &str, found: bool, elapsed: Duration) {
    if let Some(hook) = current() {
        hook.on_get(key, found, elapsed);
    }
}
