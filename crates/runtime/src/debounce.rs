/// Identifies one `push` into a [`Debouncer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebounceTicket(u64);

/// Trailing-edge debouncer that does not know about time.
///
/// Each `push` replaces the pending value and returns a fresh ticket; the
/// caller arms a timer per ticket. When a timer fires, only the ticket of the
/// most recent push yields the value. Earlier timers find a newer ticket and
/// yield nothing, so a burst of N pushes inside the quiet period produces
/// exactly one value.
#[derive(Debug)]
pub struct Debouncer<T> {
    next_ticket: u64,
    pending: Option<(DebounceTicket, T)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self {
            next_ticket: 0,
            pending: None,
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> DebounceTicket {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = DebounceTicket(self.next_ticket);
        self.pending = Some((ticket, value));
        ticket
    }

    /// Takes the pending value if `ticket` is still the latest one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> Option<T> {
        match &self.pending {
            Some((latest, _)) if *latest == ticket => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;

    #[test]
    fn only_latest_ticket_fires() {
        let mut d = Debouncer::new();
        let tickets: Vec<_> = (0..10).map(|i| d.push(i)).collect();

        let fired: Vec<_> = tickets.iter().filter_map(|t| d.fire(*t)).collect();
        assert_eq!(fired, vec![9]);
        assert!(d.pending().is_none());
    }

    #[test]
    fn fire_is_one_shot() {
        let mut d = Debouncer::new();
        let t = d.push("a");
        assert_eq!(d.fire(t), Some("a"));
        assert_eq!(d.fire(t), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let mut d = Debouncer::new();
        let t = d.push(1);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.fire(t), None);
    }
}
