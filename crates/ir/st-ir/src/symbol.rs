//! Symbols: unique handles naming IR declarations

use derive_more::Display;
use std::num::NonZeroU64;

/// What kind of declaration a symbol is bound to
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum SymbolKind {
    /// [`crate::IrFile`]
    #[display("file")]
    File,
    /// [`crate::IrProperty`]
    #[display("property")]
    Property,
    /// [`crate::IrField`]
    #[display("field")]
    Field,
    /// [`crate::IrFunction`]
    #[display("function")]
    Function,
    /// [`crate::IrValueParameter`]
    #[display("value parameter")]
    ValueParameter,
}

/// A unique, stable handle bound to exactly one IR declaration
///
/// Identity is the numeric id alone; ids are never reused while the
/// allocator that issued them is alive.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display("{kind}#{id}")]
pub struct Symbol {
    id: NonZeroU64,
    kind: SymbolKind,
}

impl Symbol {
    /// Wrap an id issued by a symbol allocator
    pub fn new(id: NonZeroU64, kind: SymbolKind) -> Self {
        Self { id, kind }
    }

    /// Numeric id
    pub fn id(self) -> u64 {
        self.id.get()
    }

    /// Declaration kind
    pub fn kind(self) -> SymbolKind {
        self.kind
    }
}
