use std::cell::RefCell;
use std::rc::Rc;

/// One-shot timer capability.
///
/// In the browser this is `setTimeout`; natively and in tests it is a
/// [`ManualTimer`] whose clock only moves when told to.
pub trait Timer {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
}

struct Scheduled {
    due_ms: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualTimerState {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Scheduled>,
}

/// Deterministic timer driven by [`ManualTimer::advance`].
///
/// Callbacks run in `(due_ms, schedule order)` order. A callback may schedule
/// further callbacks; those run in the same `advance` call if they fall due
/// before its end.
#[derive(Clone, Default)]
pub struct ManualTimer {
    state: Rc<RefCell<ManualTimerState>>,
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("ManualTimer")
            .field("now_ms", &s.now_ms)
            .field("pending", &s.pending.len())
            .finish()
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Moves the clock forward by `ms`, returning how many callbacks ran.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.state.borrow().now_ms.saturating_add(ms);
        let mut ran = 0usize;
        loop {
            // Release the borrow before running the callback; it may schedule.
            let next = {
                let mut s = self.state.borrow_mut();
                let idx = s
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target)
                    .min_by(|(_, a), (_, b)| a.due_ms.cmp(&b.due_ms).then_with(|| a.seq.cmp(&b.seq)))
                    .map(|(idx, _)| idx);
                let Some(idx) = idx else {
                    break;
                };
                let item = s.pending.swap_remove(idx);
                s.now_ms = s.now_ms.max(item.due_ms);
                item
            };
            (next.callback)();
            ran += 1;
        }
        self.state.borrow_mut().now_ms = target;
        ran
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let mut s = self.state.borrow_mut();
        let seq = s.next_seq;
        s.next_seq = s.next_seq.wrapping_add(1);
        let due_ms = s.now_ms.saturating_add(u64::from(delay_ms));
        s.pending.push(Scheduled {
            due_ms,
            seq,
            callback,
        });
    }
}
