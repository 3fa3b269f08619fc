//! Fallible one-time initialization for process-wide bridge state

use std::sync::{Mutex, OnceLock, PoisonError};

/// Cell that runs a fallible initializer at most once successfully
///
/// Initializers are serialized. A failed initializer leaves the cell empty so
/// a later call can retry; once a value is stored, initializers never run
/// again.
pub(crate) struct InitCell<T> {
    value: OnceLock<T>,
    init: Mutex<()>,
}

#[cfg_attr(not(target_os = "android"), allow(dead_code))]
impl<T> InitCell<T> {
    pub(crate) const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the stored value, running `init` only while the cell is empty
    pub(crate) fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = init()?;
        Ok(self.value.get_or_init(|| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc, Barrier,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn failed_init_can_retry() {
        let cell = InitCell::<u32>::new();
        let side_effects = AtomicUsize::new(0);

        let first: Result<&u32, &str> = cell.get_or_try_init(|| Err("activity unavailable"));
        assert_eq!(first, Err("activity unavailable"));
        assert!(cell.get().is_none());

        for _ in 0..2 {
            let value = cell.get_or_try_init(|| {
                side_effects.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(7)
            });
            assert_eq!(value, Ok(&7));
        }
        assert_eq!(side_effects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn racing_callers_initialize_once() {
        let cell = Arc::new(InitCell::<usize>::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (cell, runs, barrier) = (cell.clone(), runs.clone(), barrier.clone());
                std::thread::spawn(move || {
                    barrier.wait();
                    *cell
                        .get_or_try_init(|| {
                            runs.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(i)
                        })
                        .unwrap()
                })
            })
            .collect();

        let seen: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(seen.iter().all(|v| *v == seen[0]));
    }
}
