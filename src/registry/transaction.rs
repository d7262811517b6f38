//! Override transactions scoped to a single `resolve`/`create` call.

use crate::registration::EntrySet;
use crate::registry::Registry;

/// Keeps the override overlay open for the duration of one call.
///
/// If no transaction was open when the scope started, the scope opened one
/// and rolls it back on drop. If one was already open, the scope saved the
/// overlay and restores it on drop, leaving the outer transaction open with
/// exactly the entries it had before. Drop runs on every exit path,
/// including errors and unwinding panics, so an override call can never leak
/// its registrations.
pub(crate) struct OverrideScope<'a> {
    registry: &'a Registry,
    saved_overlay: Option<EntrySet>,
}

impl<'a> OverrideScope<'a> {
    pub(crate) fn open(registry: &'a Registry) -> Self {
        let saved_overlay = if registry.is_in_transaction() {
            Some(registry.snapshot_overlay())
        } else {
            registry.begin_transaction();
            None
        };
        Self {
            registry,
            saved_overlay,
        }
    }
}

impl Drop for OverrideScope<'_> {
    fn drop(&mut self) {
        // A factory may have closed the transaction itself; nothing to undo
        // in that case.
        if !self.registry.is_in_transaction() {
            return;
        }
        match self.saved_overlay.take() {
            None => self.registry.rollback_transaction(),
            Some(saved) => self.registry.restore_overlay(saved),
        }
    }
}
