use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// Process wide home of a loaded model.
///
/// The first successful load is cached for the lifetime of the registry. Concurrent
/// first callers block on the single in-flight load instead of starting their own,
/// and a failed load leaves the registry empty so the next caller tries again.
pub struct ModelRegistry<M> {
    model: OnceCell<Arc<M>>,
    loads: AtomicUsize,
}

impl<M> ModelRegistry<M> {
    pub const fn new() -> Self {
        Self {
            model: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn get_or_load<F, E>(&self, load: F) -> Result<Arc<M>, E>
    where
        F: FnOnce() -> Result<M, E>,
    {
        self.model
            .get_or_try_init(|| {
                let model = load()?;
                self.loads.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(model))
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Number of successful loads, never more than one.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl<M> Default for ModelRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
