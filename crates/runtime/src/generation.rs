use std::cell::Cell;
use std::rc::Rc;

/// Issues cascade tokens from a single monotonically increasing counter.
///
/// There is no real cancellation on the browser event loop: an in-flight
/// fetch always completes. Instead every unit of async work carries the token
/// it was started under and checks [`CascadeToken::is_current`] before it
/// touches shared state. Issuing a new token makes all older ones stale.
#[derive(Debug, Clone, Default)]
pub struct GenerationSource {
    current: Rc<Cell<u64>>,
}

impl GenerationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> CascadeToken {
        let generation = self.current.get().wrapping_add(1);
        self.current.set(generation);
        CascadeToken {
            generation,
            source: Rc::clone(&self.current),
        }
    }

    /// Makes every outstanding token stale without handing out a new one.
    pub fn invalidate(&self) {
        let _ = self.issue();
    }

    pub fn current_generation(&self) -> u64 {
        self.current.get()
    }
}

/// Opaque generation handle for one cascade.
#[derive(Debug, Clone)]
pub struct CascadeToken {
    generation: u64,
    source: Rc<Cell<u64>>,
}

impl CascadeToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.source.get() == self.generation
    }

    pub fn is_stale(&self) -> bool {
        !self.is_current()
    }
}

impl PartialEq for CascadeToken {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && Rc::ptr_eq(&self.source, &other.source)
    }
}

impl Eq for CascadeToken {}
