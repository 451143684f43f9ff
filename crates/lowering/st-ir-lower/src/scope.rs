//! Owner stack used while lowering
//!
//! Every declaration built during lowering takes the top of this stack as
//! its owner. Routines never push and pop by hand; they go through
//! [`crate::LoweringContext::with_scope`], which restores the stack on every
//! exit path.

use crate::error::{LowerError, LowerResult};
use st_ir::IrParent;

/// Strictly nested stack of current owners
#[derive(Debug, Default)]
pub struct ScopeStack {
    owners: Vec<IrParent>,
}

impl ScopeStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `owner` the current owner
    pub fn push(&mut self, owner: IrParent) {
        self.owners.push(owner);
    }

    /// Drop the current owner, returning it
    pub fn pop(&mut self) -> Option<IrParent> {
        self.owners.pop()
    }

    /// Owner that newly built declarations attach to
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::EmptyScope`] when the stack is empty.
    pub fn current_owner(&self) -> LowerResult<IrParent> {
        self.owners.last().copied().ok_or(LowerError::EmptyScope)
    }

    /// Number of owners on the stack
    pub fn depth(&self) -> usize {
        self.owners.len()
    }

    /// Whether no owner is pushed
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
