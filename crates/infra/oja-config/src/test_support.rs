//! Test-only helpers for process-global state.

/// Sets or removes an environment variable and restores it on drop.
///
/// Only use inside `#[serial(env)]` tests.
pub struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &'static str, val: &str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers are serialized via #[serial(env)]
        unsafe { std::env::set_var(key, val) };
        Self { key, prev }
    }

    pub fn remove(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers are serialized via #[serial(env)]
        unsafe { std::env::remove_var(key) };
        Self { key, prev }
    }

    /// Clears every variable the loader reads.
    pub fn clear_all() -> Vec<Self> {
        crate::loader::ENV_KEYS.iter().map(|&k| Self::remove(k)).collect()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            // SAFETY: callers are serialized via #[serial(env)]
            Some(v) => unsafe { std::env::set_var(self.key, v) },
            // SAFETY: callers are serialized via #[serial(env)]
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}
