//! Symbol issuance and binding
//!
//! Issuance is process-wide: every pass of a module draws ids from one
//! [`SymbolAllocator`], so symbols stay unique even when files are lowered
//! in parallel. Binding is per pass: a [`SymbolTable`] records which
//! declaration of the file under construction each symbol names.

use crate::error::{LowerError, LowerResult};
use rustc_hash::FxHashMap;
use st_ir::{DeclId, Symbol, SymbolKind};
use std::collections::hash_map::Entry;
use std::mem;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic source of globally unique symbol ids
#[derive(Debug, Default)]
pub struct SymbolAllocator {
    issued: AtomicU64,
}

impl SymbolAllocator {
    /// Create an allocator that has issued nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh symbol
    pub fn issue(&self, kind: SymbolKind) -> Symbol {
        let raw = self.issued.fetch_add(1, Ordering::Relaxed);
        Symbol::new(NonZeroU64::MIN.saturating_add(raw), kind)
    }

    /// Number of symbols issued so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

/// Symbol bindings of one lowering pass
#[derive(Debug)]
pub struct SymbolTable {
    allocator: Arc<SymbolAllocator>,
    bindings: FxHashMap<Symbol, DeclId>,
}

impl SymbolTable {
    /// Create an empty table drawing ids from `allocator`
    pub fn new(allocator: Arc<SymbolAllocator>) -> Self {
        Self {
            allocator,
            bindings: FxHashMap::default(),
        }
    }

    /// Issue a fresh, not yet bound symbol
    pub fn issue(&self, kind: SymbolKind) -> Symbol {
        self.allocator.issue(kind)
    }

    /// Bind `symbol` to `decl`; a symbol is never rebound
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::SymbolAlreadyBound`] when `symbol` already has a
    /// declaration.
    pub fn bind(&mut self, symbol: Symbol, decl: DeclId) -> LowerResult<()> {
        match self.bindings.entry(symbol) {
            Entry::Occupied(_) => Err(LowerError::SymbolAlreadyBound { symbol }),
            Entry::Vacant(slot) => {
                slot.insert(decl);
                Ok(())
            }
        }
    }

    /// Declaration bound to `symbol`
    pub fn lookup(&self, symbol: Symbol) -> Option<DeclId> {
        self.bindings.get(&symbol).copied()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Move the bindings out, leaving the table empty
    pub fn take_bindings(&mut self) -> FxHashMap<Symbol, DeclId> {
        mem::take(&mut self.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use la_arena::{Idx, RawIdx};
    use rustc_hash::FxHashSet;
    use std::thread;

    fn decl(raw: u32) -> DeclId {
        Idx::from_raw(RawIdx::from(raw))
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let allocator = SymbolAllocator::new();
        let first = allocator.issue(SymbolKind::File);
        let second = allocator.issue(SymbolKind::Property);
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(second.kind(), SymbolKind::Property);
        assert_eq!(allocator.issued(), 2);
    }

    #[test]
    fn test_rebinding_is_rejected() {
        let mut table = SymbolTable::new(Arc::new(SymbolAllocator::new()));
        let symbol = table.issue(SymbolKind::Field);
        table.bind(symbol, decl(0)).unwrap();
        assert!(matches!(
            table.bind(symbol, decl(1)),
            Err(LowerError::SymbolAlreadyBound { .. })
        ));
        assert_eq!(table.lookup(symbol), Some(decl(0)));
    }

    #[test]
    fn test_concurrent_issuance_is_unique() {
        let allocator = Arc::new(SymbolAllocator::new());
        let ids: Vec<u64> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let shared = Arc::clone(&allocator);
                    scope.spawn(move || {
                        (0..500)
                            .map(|_| shared.issue(SymbolKind::Function).id())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });
        let unique: FxHashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 4000);
        assert_eq!(allocator.issued(), 4000);
    }
}
