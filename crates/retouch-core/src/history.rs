//! Snapshot-based undo/redo of filter chains.
//!
//! The manager owns the *active* chain plus two stacks of snapshots:
//! - undo: chains that were active before each committed edit
//! - redo: chains that were undone and can be re-applied
//!
//! Every forward edit goes through
//! [`record_and_mutate`](HistoryManager::record_and_mutate), which
//! snapshots the active chain and clears the redo stack (a new
//! timeline branch). Undo and redo on an empty stack are silent no-ops.
//!
//! History is unbounded unless a limit is configured, in which case the
//! oldest undo snapshots are dropped first.

use crate::chain::FilterChain;
use crate::types::EditError;

/// Active chain plus undo/redo snapshot stacks.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    active: FilterChain,
    undo_stack: Vec<FilterChain>,
    redo_stack: Vec<FilterChain>,
    limit: Option<usize>,
}

impl HistoryManager {
    /// Create a manager with an empty active chain.
    ///
    /// `limit` caps the undo stack depth; `None` keeps every snapshot.
    #[must_use]
    pub const fn new(limit: Option<usize>) -> Self {
        Self {
            active: FilterChain::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// The live chain.
    #[must_use]
    pub const fn active(&self) -> &FilterChain {
        &self.active
    }

    /// Number of snapshots available to undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of snapshots available to redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Returns `true` if [`undo`](Self::undo) would change the active chain.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if [`redo`](Self::redo) would change the active chain.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Apply `mutation` as one undoable edit.
    ///
    /// The mutation runs against a copy of the active chain. If it
    /// succeeds, the previous chain is pushed onto the undo stack, the
    /// redo stack is cleared, and the copy becomes active. If it fails,
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// Propagates whatever error `mutation` returns.
    pub fn record_and_mutate<T, F>(&mut self, mutation: F) -> Result<T, EditError>
    where
        F: FnOnce(&mut FilterChain) -> Result<T, EditError>,
    {
        let mut next = self.active.clone();
        let output = mutation(&mut next)?;
        self.commit(next);
        Ok(output)
    }

    /// Apply an infallible `mutation` as one undoable edit.
    ///
    /// Same bookkeeping as [`record_and_mutate`](Self::record_and_mutate).
    pub fn record<F>(&mut self, mutation: F)
    where
        F: FnOnce(&mut FilterChain),
    {
        let mut next = self.active.clone();
        mutation(&mut next);
        self.commit(next);
    }

    fn commit(&mut self, next: FilterChain) {
        let previous = std::mem::replace(&mut self.active, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }

        tracing::debug!(
            chain_len = self.active.len(),
            undo_depth = self.undo_stack.len(),
            "History entry pushed"
        );
    }

    /// Restore the most recent undo snapshot.
    ///
    /// The current chain moves onto the redo stack. Returns `false`
    /// without changing anything if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.active, previous);
        self.redo_stack.push(current);

        tracing::debug!(
            undo_remaining = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "Undo"
        );
        true
    }

    /// Re-apply the most recently undone snapshot.
    ///
    /// The current chain moves onto the undo stack. Returns `false`
    /// without changing anything if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.active, next);
        self.undo_stack.push(current);

        tracing::debug!(
            undo_depth = self.undo_stack.len(),
            redo_remaining = self.redo_stack.len(),
            "Redo"
        );
        true
    }
}
