//! Lowered IR tree
//!
//! The IR tree is what code generation consumes. All declarations of one
//! file live in a single arena owned by the [`IrFile`]; structural
//! ownership is expressed with [`IrParent`] links and slot ids, while
//! cross-references such as a backing field's originating property are
//! plain [`DeclId`]s that never own anything.

pub mod dump;
pub mod symbol;
pub mod types;
pub mod verify;

use derive_more::Display;
use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;
use st_descriptors::{ConstantValue, FqName, Modality, PackageFragmentDescriptor, Visibility};
use st_intern::Name;
use st_span::{FileId, FileSpan};

pub use symbol::{Symbol, SymbolKind};
pub use types::{IrClassifier, IrType, IrTypeArgument};

/// Index of a declaration in its file's arena
pub type DeclId = Idx<IrDeclaration>;

/// The structural owner of an IR declaration
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum IrParent {
    /// Owned directly by the file with this symbol
    File(Symbol),
    /// Owned by another declaration (value parameters by their function)
    Declaration(DeclId),
}

impl IrParent {
    /// Whether the owner is a file
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Why a declaration exists
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum DeclarationOrigin {
    /// Written in source
    #[display("DEFINED")]
    Defined,
    /// Synthesized storage behind a property
    #[display("PROPERTY_BACKING_FIELD")]
    PropertyBackingField,
}

/// Root of the IR tree for one source file
#[derive(Debug, Clone)]
pub struct IrFile {
    /// Symbol bound to this file
    pub symbol: Symbol,
    /// Source file identity
    pub file_id: FileId,
    /// File name
    pub name: String,
    /// Package of the file
    pub fq_name: FqName,
    /// Package fragment the file contributes to
    pub package_fragment: PackageFragmentDescriptor,
    /// Top-level declarations in source order
    pub declarations: Vec<DeclId>,
    /// File annotations in source order
    pub annotations: Vec<IrCall>,
    /// Storage for every declaration of the file
    pub arena: Arena<IrDeclaration>,
    /// Symbol → declaration bindings issued while lowering this file
    pub bindings: FxHashMap<Symbol, DeclId>,
    /// Whole-file span
    pub span: FileSpan,
}

impl IrFile {
    /// Declaration stored at `id`
    pub fn declaration(&self, id: DeclId) -> &IrDeclaration {
        &self.arena[id]
    }

    /// Declaration bound to `symbol`
    pub fn resolve_symbol(&self, symbol: Symbol) -> Option<DeclId> {
        self.bindings.get(&symbol).copied()
    }

    /// Property stored at `id`, if it is one
    pub fn property(&self, id: DeclId) -> Option<&IrProperty> {
        match &self.arena[id] {
            IrDeclaration::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Field stored at `id`, if it is one
    pub fn field(&self, id: DeclId) -> Option<&IrField> {
        match &self.arena[id] {
            IrDeclaration::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Function stored at `id`, if it is one
    pub fn function(&self, id: DeclId) -> Option<&IrFunction> {
        match &self.arena[id] {
            IrDeclaration::Function(function) => Some(function),
            _ => None,
        }
    }

    /// First top-level property called `name`
    pub fn find_property(&self, name: Name) -> Option<(DeclId, &IrProperty)> {
        self.declarations.iter().find_map(|&id| {
            self.property(id)
                .filter(|property| property.name == name)
                .map(|property| (id, property))
        })
    }

    /// Number of declarations owned (directly or transitively) by this file
    pub fn declaration_count(&self) -> usize {
        self.arena.len()
    }
}

/// Any IR declaration
#[derive(Debug, Clone, PartialEq)]
pub enum IrDeclaration {
    /// Property
    Property(IrProperty),
    /// Field
    Field(IrField),
    /// Function or accessor
    Function(IrFunction),
    /// Value parameter
    ValueParameter(IrValueParameter),
}

impl IrDeclaration {
    /// Bound symbol
    pub fn symbol(&self) -> Symbol {
        match self {
            Self::Property(property) => property.symbol,
            Self::Field(field) => field.symbol,
            Self::Function(function) => function.symbol,
            Self::ValueParameter(parameter) => parameter.symbol,
        }
    }

    /// Structural owner
    pub fn parent(&self) -> IrParent {
        match self {
            Self::Property(property) => property.parent,
            Self::Field(field) => field.parent,
            Self::Function(function) => function.parent,
            Self::ValueParameter(parameter) => parameter.parent,
        }
    }

    /// Declared name
    pub fn name(&self) -> Name {
        match self {
            Self::Property(property) => property.name,
            Self::Field(field) => field.name,
            Self::Function(function) => function.name,
            Self::ValueParameter(parameter) => parameter.name,
        }
    }

    /// Originating source location
    pub fn span(&self) -> FileSpan {
        match self {
            Self::Property(property) => property.span,
            Self::Field(field) => field.span,
            Self::Function(function) => function.span,
            Self::ValueParameter(parameter) => parameter.span,
        }
    }

    /// Annotations in source order
    pub fn annotations(&self) -> &[IrCall] {
        match self {
            Self::Property(property) => &property.annotations,
            Self::Field(field) => &field.annotations,
            Self::Function(function) => &function.annotations,
            Self::ValueParameter(parameter) => &parameter.annotations,
        }
    }
}

/// A property
#[derive(Debug, Clone, PartialEq)]
pub struct IrProperty {
    /// Bound symbol
    pub symbol: Symbol,
    /// Structural owner
    pub parent: IrParent,
    /// Why the property exists
    pub origin: DeclarationOrigin,
    /// Property name
    pub name: Name,
    /// Visibility
    pub visibility: Visibility,
    /// Modality
    pub modality: Modality,
    /// Declared with `var`
    pub is_var: bool,
    /// Declared `const`
    pub is_const: bool,
    /// Declared `lateinit`
    pub is_lateinit: bool,
    /// Declared with a `by` delegate
    pub is_delegated: bool,
    /// Declared `external`
    pub is_external: bool,
    /// Synthesized backing field; owned by [`Self::parent`], not by the property
    pub backing_field: Option<DeclId>,
    /// User-written getter
    pub getter: Option<DeclId>,
    /// User-written setter
    pub setter: Option<DeclId>,
    /// Annotations in source order
    pub annotations: Vec<IrCall>,
    /// Source location
    pub span: FileSpan,
}

/// A storage field
#[derive(Debug, Clone, PartialEq)]
pub struct IrField {
    /// Bound symbol
    pub symbol: Symbol,
    /// Structural owner
    pub parent: IrParent,
    /// Why the field exists
    pub origin: DeclarationOrigin,
    /// Field name
    pub name: Name,
    /// Visibility
    pub visibility: Visibility,
    /// Assigned only once
    pub is_final: bool,
    /// Declared `external`
    pub is_external: bool,
    /// Lives outside any instance (owned by a file)
    pub is_static: bool,
    /// Field type
    pub ty: IrType,
    /// Initializer; populated by a later stage
    pub initializer: Option<IrExpressionBody>,
    /// Property this field stores, if it is a backing field
    pub corresponding_property: Option<DeclId>,
    /// Annotations in source order
    pub annotations: Vec<IrCall>,
    /// Source location
    pub span: FileSpan,
}

/// A function or property accessor
#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    /// Bound symbol
    pub symbol: Symbol,
    /// Structural owner
    pub parent: IrParent,
    /// Why the function exists
    pub origin: DeclarationOrigin,
    /// Function name; `<get-x>` / `<set-x>` for accessors
    pub name: Name,
    /// Visibility
    pub visibility: Visibility,
    /// Modality
    pub modality: Modality,
    /// Return type
    pub return_type: IrType,
    /// Value parameters, owned by this function
    pub value_parameters: Vec<DeclId>,
    /// Declared `external`
    pub is_external: bool,
    /// Declared `inline`
    pub is_inline: bool,
    /// Property this function is an accessor of
    pub corresponding_property: Option<DeclId>,
    /// Annotations in source order
    pub annotations: Vec<IrCall>,
    /// Source location
    pub span: FileSpan,
}

/// A value parameter
#[derive(Debug, Clone, PartialEq)]
pub struct IrValueParameter {
    /// Bound symbol
    pub symbol: Symbol,
    /// Owning function
    pub parent: IrParent,
    /// Parameter name
    pub name: Name,
    /// Position in the owner's parameter list
    pub index: u32,
    /// Parameter type
    pub ty: IrType,
    /// Declares a default argument
    pub has_default_value: bool,
    /// Declared `vararg`
    pub is_vararg: bool,
    /// Annotations in source order
    pub annotations: Vec<IrCall>,
    /// Source location
    pub span: FileSpan,
}

/// IR expressions produced by this stage
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpression {
    /// Literal constant
    Const(IrConst),
    /// Array of arguments (annotation array literals)
    Vararg {
        /// Elements in source order
        elements: Vec<IrExpression>,
        /// Source location
        span: FileSpan,
    },
}

/// A literal constant
#[derive(Debug, Clone, PartialEq)]
pub struct IrConst {
    /// Literal value
    pub value: ConstantValue,
    /// Source location
    pub span: FileSpan,
}

/// A call; annotations are calls of the annotation class constructor
#[derive(Debug, Clone, PartialEq)]
pub struct IrCall {
    /// Called class (for annotations) or function
    pub callee: FqName,
    /// Result type
    pub ty: IrType,
    /// Arguments in source order
    pub arguments: Vec<IrExpression>,
    /// Source location
    pub span: FileSpan,
}

/// Expression body of a field initializer
#[derive(Debug, Clone, PartialEq)]
pub struct IrExpressionBody {
    /// The initializing expression
    pub expression: IrExpression,
    /// Source location
    pub span: FileSpan,
}
