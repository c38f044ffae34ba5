use std::collections::VecDeque;

/// A recovered failure worth surfacing, tagged with the cascade generation
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub generation: u64,
    pub kind: &'static str,
    pub message: String,
}

const DEFAULT_CAPACITY: usize = 64;

/// Bounded, append-only record of diagnostics.
///
/// Every entry is also forwarded to `tracing` at warn level. The log keeps
/// the most recent `capacity` entries so a long browsing session does not
/// grow it without bound.
#[derive(Debug)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, generation: u64, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(generation, kind, "{message}");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic {
            generation,
            kind,
            message,
        });
    }

    /// Oldest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }
}
