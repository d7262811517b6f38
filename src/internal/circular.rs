//! Circular dependency and depth detection for nested instantiation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::Entry;

/// Stack of entries whose factories are currently running.
///
/// Only factory invocations push frames; cache hits never do. Identity is
/// the entry itself (`Rc::ptr_eq`), not its key, so an overlay entry and the
/// permanent entry it shadows are distinct frames. Each frame holds its entry
/// alive until the guard pops it.
pub(crate) struct ResolutionStack {
    frames: RefCell<Vec<Rc<Entry>>>,
    max_depth: usize,
    detect_cycles: bool,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize, detect_cycles: bool) -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
            max_depth,
            detect_cycles,
        }
    }

    /// Pushes `entry`, failing if it is already on the stack or the stack is
    /// full. The frame pops when the returned guard drops.
    pub(crate) fn enter(&self, entry: &Rc<Entry>) -> DiResult<StackGuard<'_>> {
        let mut frames = self.frames.borrow_mut();

        if self.detect_cycles && frames.iter().any(|frame| Rc::ptr_eq(frame, entry)) {
            let mut path: Vec<Key> = frames.iter().map(|frame| frame.key().clone()).collect();
            path.push(entry.key().clone());
            return Err(DiError::Circular(path));
        }

        if frames.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.max_depth));
        }

        frames.push(entry.clone());
        Ok(StackGuard { stack: self })
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

/// Pops the frame pushed by [`ResolutionStack::enter`], including on unwind.
pub(crate) struct StackGuard<'a> {
    stack: &'a ResolutionStack,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        // Release the borrow before the entry itself can drop
        let frame = self.stack.frames.borrow_mut().pop();
        drop(frame);
    }
}
