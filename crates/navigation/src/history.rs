use std::cell::RefCell;
use std::rc::Rc;

use routing::Location;
use serde::{Deserialize, Serialize};

/// Whether an outbound URL change adds a history entry or rewrites the
/// current one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    Push,
    #[default]
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("history update failed: {0}")]
pub struct HistoryError(pub String);

/// The slice of the browser History API the synchronizer drives.
///
/// Neither method fires popstate; the host calls
/// `StateSynchronizer::handle_popstate` for back/forward itself.
pub trait History {
    fn location(&self) -> Location;
    fn push_state(&self, url: &str) -> Result<(), HistoryError>;
    fn replace_state(&self, url: &str) -> Result<(), HistoryError>;
}

impl<H: History + ?Sized> History for Rc<H> {
    fn location(&self) -> Location {
        (**self).location()
    }

    fn push_state(&self, url: &str) -> Result<(), HistoryError> {
        (**self).push_state(url)
    }

    fn replace_state(&self, url: &str) -> Result<(), HistoryError> {
        (**self).replace_state(url)
    }
}

#[derive(Debug, Default)]
struct MemoryHistoryState {
    entries: Vec<String>,
    index: usize,
    calls: Vec<(HistoryMode, String)>,
}

/// In-memory session history with browser-like push, replace, back and
/// forward. Clones share the same session.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    state: Rc<RefCell<MemoryHistoryState>>,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryHistoryState {
                entries: vec![initial_url.to_string()],
                index: 0,
                calls: Vec::new(),
            })),
        }
    }

    pub fn url(&self) -> String {
        let state = self.state.borrow();
        state.entries[state.index].clone()
    }

    /// Moves one entry back. Returns `false` at the start of the session.
    pub fn back(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.index == 0 {
            return false;
        }
        state.index -= 1;
        true
    }

    pub fn forward(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.index + 1 >= state.entries.len() {
            return false;
        }
        state.index += 1;
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.state.borrow().entries.clone()
    }

    /// Every push/replace made through the [`History`] trait, in order.
    pub fn calls(&self) -> Vec<(HistoryMode, String)> {
        self.state.borrow().calls.clone()
    }

    pub fn push_count(&self) -> usize {
        self.count(HistoryMode::Push)
    }

    pub fn replace_count(&self) -> usize {
        self.count(HistoryMode::Replace)
    }

    fn count(&self, mode: HistoryMode) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|(m, _)| *m == mode)
            .count()
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        Location::parse(&self.url())
    }

    fn push_state(&self, url: &str) -> Result<(), HistoryError> {
        let mut state = self.state.borrow_mut();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(url.to_string());
        state.index = keep;
        state.calls.push((HistoryMode::Push, url.to_string()));
        Ok(())
    }

    fn replace_state(&self, url: &str) -> Result<(), HistoryError> {
        let mut state = self.state.borrow_mut();
        let index = state.index;
        state.entries[index] = url.to_string();
        state.calls.push((HistoryMode::Replace, url.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{History, HistoryMode, MemoryHistory};
    use pretty_assertions::assert_eq;

    #[test]
    fn push_drops_forward_entries() {
        let h = MemoryHistory::new("/");
        h.push_state("/catalog/a").unwrap();
        h.push_state("/catalog/b").unwrap();
        assert!(h.back());
        h.push_state("/catalog/c").unwrap();
        assert_eq!(h.entries(), vec!["/", "/catalog/a", "/catalog/c"]);
        assert!(!h.forward());
    }

    #[test]
    fn replace_rewrites_current_entry() {
        let h = MemoryHistory::new("/catalog/copernicus");
        h.replace_state("/catalog/cdse").unwrap();
        assert_eq!(h.entries(), vec!["/catalog/cdse"]);
        assert_eq!(h.location().path, "/catalog/cdse");
        assert_eq!(h.calls(), vec![(HistoryMode::Replace, "/catalog/cdse".to_string())]);
    }

    #[test]
    fn back_and_forward_move_the_cursor() {
        let h = MemoryHistory::new("/");
        h.push_state("/catalog/a").unwrap();
        assert!(h.back());
        assert_eq!(h.url(), "/");
        assert!(!h.back());
        assert!(h.forward());
        assert_eq!(h.url(), "/catalog/a");
        assert_eq!(h.push_count(), 1);
        assert_eq!(h.replace_count(), 0);
    }
}
