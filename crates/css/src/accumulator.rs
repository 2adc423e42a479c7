use std::sync::{Arc, Mutex, PoisonError};

/// Holds the style rules produced while rendering.
///
/// `render` returns every rule added since the last `reset`.
pub trait StyleAccumulator {
    fn render(&self) -> String;

    fn reset(&mut self);

    /// Render and reset in one step, so a rule can never land in two
    /// snapshots.
    fn drain(&mut self) -> String {
        let css = self.render();
        self.reset();
        css
    }
}

/// Shared access to one accumulator: the renderer adds rules through it while
/// the stream side drains them between chunks.
#[derive(Debug, Default)]
pub struct SheetHandle<A> {
    inner: Arc<Mutex<A>>,
}

impl<A> Clone for SheetHandle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: StyleAccumulator> SheetHandle<A> {
    pub fn new(accumulator: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(accumulator)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        // A panic while holding the lock leaves rules in a usable state, so
        // poisoning is ignored.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn render(&self) -> String {
        self.with(|acc| acc.render())
    }

    pub fn drain(&self) -> String {
        self.with(|acc| acc.drain())
    }
}
