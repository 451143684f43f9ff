//! Structural checks over a lowered IR file
//!
//! The lowering stage promises that every declaration is linked to exactly
//! one owner, that owner chains end at the file, and that cross-references
//! agree with the ownership slots. [`verify_file`] checks those promises
//! after the fact and reports every violation it finds.

use crate::{DeclId, IrDeclaration, IrFile, IrParent, Symbol, SymbolKind};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// A broken structural invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Parent link names a declaration that is not in the file
    #[error("declaration {child:?} names missing parent {parent:?}")]
    DanglingParent {
        /// Declaration holding the link
        child: DeclId,
        /// The missing parent
        parent: DeclId,
    },

    /// Following parent links never reaches the file
    #[error("owner chain of {decl:?} does not reach the file")]
    OwnerCycle {
        /// Declaration whose chain loops
        decl: DeclId,
    },

    /// A declaration claims to be owned by another file
    #[error("declaration {decl:?} is owned by foreign file {symbol}")]
    ForeignFile {
        /// Offending declaration
        decl: DeclId,
        /// The other file's symbol
        symbol: Symbol,
    },

    /// A top-level declaration is not owned by the file
    #[error("top-level declaration {decl:?} is not owned by the file")]
    DetachedTopLevel {
        /// Offending declaration
        decl: DeclId,
    },

    /// A slot points at a declaration of the wrong kind
    #[error("slot of {owner:?} refers to {found:?}, which is not a {expected}")]
    WrongSlotKind {
        /// Declaration holding the slot
        owner: DeclId,
        /// Declaration in the slot
        found: DeclId,
        /// Kind the slot requires
        expected: SymbolKind,
    },

    /// A backing field or accessor is not owned by its property's parent
    #[error("{member:?} is not owned by the parent of property {property:?}")]
    MisplacedPropertyMember {
        /// The property
        property: DeclId,
        /// Its field or accessor
        member: DeclId,
    },

    /// A backing field or accessor does not point back to its property
    #[error("{member:?} does not point back to property {property:?}")]
    BrokenBackReference {
        /// The property
        property: DeclId,
        /// Its field or accessor
        member: DeclId,
    },

    /// A value parameter is owned by something other than its function
    #[error("value parameter {parameter:?} is not owned by function {function:?}")]
    MisplacedParameter {
        /// The function listing the parameter
        function: DeclId,
        /// The parameter
        parameter: DeclId,
    },

    /// Two declarations share one symbol
    #[error("symbol {symbol} is shared by more than one declaration")]
    DuplicateSymbol {
        /// The shared symbol
        symbol: Symbol,
    },

    /// A declaration's symbol is not bound back to it
    #[error("symbol {symbol} is not bound to declaration {decl:?}")]
    UnboundSymbol {
        /// The symbol
        symbol: Symbol,
        /// The declaration carrying it
        decl: DeclId,
    },
}

/// Check every structural invariant of `file`
///
/// # Errors
///
/// Returns every violation found, in traversal order.
pub fn verify_file(file: &IrFile) -> Result<(), Vec<VerifyError>> {
    let mut errors = Vec::new();
    let present: FxHashSet<DeclId> = file.arena.iter().map(|(id, _)| id).collect();

    check_symbols(file, &mut errors);

    for &id in &file.declarations {
        if file.declaration(id).parent() != IrParent::File(file.symbol) {
            errors.push(VerifyError::DetachedTopLevel { decl: id });
        }
    }

    for (id, declaration) in file.arena.iter() {
        check_owner_chain(file, &present, id, &mut errors);
        match declaration {
            IrDeclaration::Property(property) => {
                let members = [
                    (property.backing_field, SymbolKind::Field),
                    (property.getter, SymbolKind::Function),
                    (property.setter, SymbolKind::Function),
                ];
                for (member, expected) in members {
                    let Some(member) = member else { continue };
                    check_property_member(file, id, property.parent, member, expected, &mut errors);
                }
            }
            IrDeclaration::Function(function) => {
                for &parameter in &function.value_parameters {
                    match file.declaration(parameter) {
                        IrDeclaration::ValueParameter(value)
                            if value.parent == IrParent::Declaration(id) => {}
                        IrDeclaration::ValueParameter(_) => {
                            errors.push(VerifyError::MisplacedParameter {
                                function: id,
                                parameter,
                            });
                        }
                        IrDeclaration::Property(_)
                        | IrDeclaration::Field(_)
                        | IrDeclaration::Function(_) => {
                            errors.push(VerifyError::WrongSlotKind {
                                owner: id,
                                found: parameter,
                                expected: SymbolKind::ValueParameter,
                            });
                        }
                    }
                }
            }
            IrDeclaration::Field(_) | IrDeclaration::ValueParameter(_) => {}
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_symbols(file: &IrFile, errors: &mut Vec<VerifyError>) {
    let mut seen = FxHashSet::default();
    seen.insert(file.symbol);
    for (id, declaration) in file.arena.iter() {
        let symbol = declaration.symbol();
        if !seen.insert(symbol) {
            errors.push(VerifyError::DuplicateSymbol { symbol });
        }
        if file.resolve_symbol(symbol) != Some(id) {
            errors.push(VerifyError::UnboundSymbol { symbol, decl: id });
        }
    }
}

fn check_owner_chain(
    file: &IrFile,
    present: &FxHashSet<DeclId>,
    start: DeclId,
    errors: &mut Vec<VerifyError>,
) {
    let mut current = start;
    // A chain longer than the arena must revisit some declaration
    for _ in 0..=file.arena.len() {
        match file.declaration(current).parent() {
            IrParent::File(symbol) if symbol == file.symbol => return,
            IrParent::File(symbol) => {
                errors.push(VerifyError::ForeignFile {
                    decl: start,
                    symbol,
                });
                return;
            }
            IrParent::Declaration(parent) if !present.contains(&parent) => {
                errors.push(VerifyError::DanglingParent {
                    child: current,
                    parent,
                });
                return;
            }
            IrParent::Declaration(parent) => current = parent,
        }
    }
    errors.push(VerifyError::OwnerCycle { decl: start });
}

fn check_property_member(
    file: &IrFile,
    property: DeclId,
    property_parent: IrParent,
    member: DeclId,
    expected: SymbolKind,
    errors: &mut Vec<VerifyError>,
) {
    let declaration = file.declaration(member);
    let back_reference = match (declaration, expected) {
        (IrDeclaration::Field(field), SymbolKind::Field) => field.corresponding_property,
        (IrDeclaration::Function(function), SymbolKind::Function) => {
            function.corresponding_property
        }
        _ => {
            errors.push(VerifyError::WrongSlotKind {
                owner: property,
                found: member,
                expected,
            });
            return;
        }
    };
    if declaration.parent() != property_parent {
        errors.push(VerifyError::MisplacedPropertyMember { property, member });
    }
    if back_reference != Some(property) {
        errors.push(VerifyError::BrokenBackReference { property, member });
    }
}
