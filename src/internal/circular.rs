//! Cycle detection for in-progress constructions.

use std::cell::RefCell;

// Thread-local construction stack. Every frame is a definition currently being
// built on this thread, so no lock is shared across threads.
thread_local! {
    static CONSTRUCTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Frame {
    container: u64,
    index: usize,
}

/// Guard for one frame of the thread-local construction stack.
///
/// Frames are keyed by container id as well as definition index, so two
/// containers used from the same thread never see each other's frames.
pub(crate) struct ConstructionGuard {
    frame: Frame,
}

impl ConstructionGuard {
    /// Pushes `index` unless it is already being constructed.
    ///
    /// On re-entry the error carries the cycle as definition indices, starting
    /// and ending with `index`.
    pub(crate) fn enter(container: u64, index: usize) -> Result<Self, Vec<usize>> {
        let frame = Frame { container, index };
        CONSTRUCTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|f| *f == frame) {
                let mut cycle: Vec<usize> = stack[start..]
                    .iter()
                    .filter(|f| f.container == container)
                    .map(|f| f.index)
                    .collect();
                cycle.push(index);
                return Err(cycle);
            }
            stack.push(frame);
            Ok(())
        })?;

        Ok(Self { frame })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            // Guards drop in LIFO order, including during unwinding.
            if let Some(last) = stack.pop() {
                debug_assert!(last == self.frame);
            }
        });
    }
}
