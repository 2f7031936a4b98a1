//! Once-only "apply and persist" gate.
//!
//! [`ApplyOnce`] runs a fallible action at most once, however many call sites
//! or threads reach it. Callers arriving while the first run is in progress
//! block until it finishes; every caller then sees the same result.
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::{empty, ApplyOnce};
//!
//! static SAVE: ApplyOnce = ApplyOnce::new();
//!
//! let dir = std::env::temp_dir().join("ini_doc_persist_example");
//! std::fs::create_dir_all(&dir).unwrap();
//! let path = dir.join("app.ini");
//!
//! let mut doc = empty();
//! doc.section_mut("").new_key("mode", "fast").unwrap();
//!
//! SAVE.run(|| doc.save_to(&path)).unwrap();
//! SAVE.run(|| panic!("never runs twice")).unwrap();
//! assert!(SAVE.is_done());
//! ```

use crate::Result;
use once_cell::sync::OnceCell;

/// Runs an action at most once and remembers its outcome.
#[derive(Debug, Default)]
pub struct ApplyOnce {
    outcome: OnceCell<Result<()>>,
}

impl ApplyOnce {
    #[must_use]
    pub const fn new() -> Self {
        ApplyOnce {
            outcome: OnceCell::new(),
        }
    }

    /// Runs `action` on the first call; later calls return the first outcome.
    pub fn run<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        self.outcome.get_or_init(action).clone()
    }

    /// `true` once the action has completed, successfully or not.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.outcome.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_runs_once_across_threads() {
        let gate = Arc::new(ApplyOnce::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    gate.run(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(gate.is_done());
    }

    #[test]
    fn test_failure_is_remembered() {
        let gate = ApplyOnce::new();
        assert!(!gate.is_done());
        let first = gate.run(|| Err(Error::custom("disk full")));
        assert_eq!(first, Err(Error::custom("disk full")));
        assert_eq!(gate.run(|| Ok(())), first);
    }
}
