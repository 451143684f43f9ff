//! Resolved source tree
//!
//! This is the read-only input of IR lowering: every node has already been
//! through name and type resolution, so visibilities, modalities and types
//! are filled in (or their absence is an upstream defect). Nothing in this
//! crate mutates a tree once it is built.

pub mod build;
pub mod types;

use derive_more::Display;
use st_descriptors::{ConstantValue, FqName, Modality, Visibility};
use st_intern::Name;
use st_span::{FileId, Span};

pub use types::{ConeType, ConeTypeProjection, TypeRef};

/// A resolved source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// File identity within the module
    pub file_id: FileId,
    /// File name as shown to users (`Main.kt`)
    pub name: String,
    /// Package declared by the file header
    pub package_fq_name: FqName,
    /// Top-level declarations in source order
    pub declarations: Vec<SourceDeclaration>,
    /// File annotations (`@file:JvmName(...)`) in source order
    pub annotations: Vec<SourceAnnotationCall>,
    /// Whole-file span
    pub span: Span,
}

/// A top-level or member declaration
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDeclaration {
    /// `val` / `var`
    Property(SourceProperty),
    /// `fun`
    Function(SourceFunction),
    /// `class`, `interface`, `object`
    Class(SourceClass),
    /// `typealias`
    TypeAlias(SourceTypeAlias),
}

impl SourceDeclaration {
    /// View this declaration as a generic tree element
    pub fn as_element(&self) -> SourceElement<'_> {
        match self {
            Self::Property(property) => SourceElement::Property(property),
            Self::Function(function) => SourceElement::Function(function),
            Self::Class(class) => SourceElement::Class(class),
            Self::TypeAlias(alias) => SourceElement::TypeAlias(alias),
        }
    }

    /// Declared name
    pub fn name(&self) -> Name {
        match self {
            Self::Property(property) => property.name,
            Self::Function(function) => function.name,
            Self::Class(class) => class.name,
            Self::TypeAlias(alias) => alias.name,
        }
    }
}

/// A property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProperty {
    /// Property name
    pub name: Name,
    /// Resolved visibility
    pub visibility: Visibility,
    /// Resolved modality; always filled in by a healthy resolver
    pub modality: Option<Modality>,
    /// Declared with `var`
    pub is_var: bool,
    /// Declared `const`
    pub is_const: bool,
    /// Declared `lateinit`
    pub is_lateinit: bool,
    /// Declared `external`
    pub is_external: bool,
    /// Declared or inferred property type
    pub return_type: TypeRef,
    /// `= expr` initializer
    pub initializer: Option<SourceExpression>,
    /// `by expr` delegate
    pub delegate: Option<SourceExpression>,
    /// Getter; a default one is synthesized upstream when none is written
    pub getter: SourceAccessor,
    /// Setter; present for `var` properties only
    pub setter: Option<SourceAccessor>,
    /// Annotations in source order
    pub annotations: Vec<SourceAnnotationCall>,
    /// Declaration span
    pub span: Span,
}

impl SourceProperty {
    /// Declared with `val`
    pub fn is_val(&self) -> bool {
        !self.is_var
    }
}

/// Which side of a property an accessor implements
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum AccessorKind {
    /// `get()`
    #[display("get")]
    Getter,
    /// `set(value)`
    #[display("set")]
    Setter,
}

/// A property accessor
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAccessor {
    /// Name of the property this accessor belongs to
    pub property_name: Name,
    /// Getter or setter
    pub kind: AccessorKind,
    /// Synthesized by the front-end rather than written by the user
    pub is_default: bool,
    /// Resolved visibility
    pub visibility: Visibility,
    /// Resolved modality
    pub modality: Option<Modality>,
    /// Accessor return type (`Unit` for setters)
    pub return_type: TypeRef,
    /// Value parameters (`value` for setters)
    pub value_parameters: Vec<SourceValueParameter>,
    /// Annotations in source order
    pub annotations: Vec<SourceAnnotationCall>,
    /// Accessor span; the property span for default accessors
    pub span: Span,
}

/// A function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFunction {
    /// Function name
    pub name: Name,
    /// Resolved visibility
    pub visibility: Visibility,
    /// Resolved modality
    pub modality: Option<Modality>,
    /// Declared or inferred return type
    pub return_type: TypeRef,
    /// Value parameters in declaration order
    pub value_parameters: Vec<SourceValueParameter>,
    /// Declared `external`
    pub is_external: bool,
    /// Declared `inline`
    pub is_inline: bool,
    /// Annotations in source order
    pub annotations: Vec<SourceAnnotationCall>,
    /// Declaration span
    pub span: Span,
}

/// A value parameter of a function or setter
#[derive(Debug, Clone, PartialEq)]
pub struct SourceValueParameter {
    /// Parameter name
    pub name: Name,
    /// Declared parameter type
    pub return_type: TypeRef,
    /// Declares a default argument
    pub has_default_value: bool,
    /// Declared `vararg`
    pub is_vararg: bool,
    /// Annotations in source order
    pub annotations: Vec<SourceAnnotationCall>,
    /// Parameter span
    pub span: Span,
}

/// An annotation usage such as `@Deprecated("use y")`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAnnotationCall {
    /// Resolved annotation class type
    pub annotation_type: TypeRef,
    /// Arguments in source order
    pub arguments: Vec<SourceExpression>,
    /// Annotation span
    pub span: Span,
}

/// Expressions that can appear in declarations (initializers, delegates, annotation arguments)
#[derive(Debug, Clone, PartialEq)]
pub enum SourceExpression {
    /// Literal constant
    Const {
        /// Literal value
        value: ConstantValue,
        /// Literal span
        span: Span,
    },
    /// Array literal `[a, b]`
    ArrayOf {
        /// Elements in source order
        elements: Vec<SourceExpression>,
        /// Literal span
        span: Span,
    },
    /// Reference to a property or object (`a.b`)
    QualifiedAccess {
        /// Referenced name
        callee: Name,
        /// Access span
        span: Span,
    },
    /// Call expression (`f(x)`)
    FunctionCall {
        /// Called function
        callee: Name,
        /// Arguments in source order
        arguments: Vec<SourceExpression>,
        /// Call span
        span: Span,
    },
    /// Lambda literal
    Lambda {
        /// Lambda span
        span: Span,
    },
}

impl SourceExpression {
    /// Expression span
    pub fn span(&self) -> Span {
        match self {
            Self::Const { span, .. }
            | Self::ArrayOf { span, .. }
            | Self::QualifiedAccess { span, .. }
            | Self::FunctionCall { span, .. }
            | Self::Lambda { span } => *span,
        }
    }

    /// Node kind tag of this expression
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Const { .. } => NodeKind::Const,
            Self::ArrayOf { .. } => NodeKind::ArrayOf,
            Self::QualifiedAccess { .. } => NodeKind::QualifiedAccess,
            Self::FunctionCall { .. } => NodeKind::FunctionCall,
            Self::Lambda { .. } => NodeKind::Lambda,
        }
    }
}

/// Kind of class-like declaration
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum ClassKind {
    /// `class`
    #[display("class")]
    Class,
    /// `interface`
    #[display("interface")]
    Interface,
    /// `object`
    #[display("object")]
    Object,
    /// `enum class`
    #[display("enum class")]
    EnumClass,
}

/// A class-like declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SourceClass {
    /// Class name
    pub name: Name,
    /// Class, interface, object or enum
    pub class_kind: ClassKind,
    /// Member declarations in source order
    pub declarations: Vec<SourceDeclaration>,
    /// Declaration span
    pub span: Span,
}

/// A type alias declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTypeAlias {
    /// Alias name
    pub name: Name,
    /// Aliased type
    pub expanded_type: TypeRef,
    /// Declaration span
    pub span: Span,
}

/// Tag naming each kind of source node
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum NodeKind {
    /// [`SourceFile`]
    #[display("file")]
    File,
    /// [`SourceProperty`]
    #[display("property")]
    Property,
    /// [`SourceAccessor`]
    #[display("property accessor")]
    Accessor,
    /// [`SourceFunction`]
    #[display("function")]
    Function,
    /// [`SourceValueParameter`]
    #[display("value parameter")]
    ValueParameter,
    /// [`SourceAnnotationCall`]
    #[display("annotation call")]
    AnnotationCall,
    /// [`SourceExpression::Const`]
    #[display("constant expression")]
    Const,
    /// [`SourceExpression::ArrayOf`]
    #[display("array literal")]
    ArrayOf,
    /// [`SourceExpression::QualifiedAccess`]
    #[display("qualified access")]
    QualifiedAccess,
    /// [`SourceExpression::FunctionCall`]
    #[display("function call")]
    FunctionCall,
    /// [`SourceExpression::Lambda`]
    #[display("lambda")]
    Lambda,
    /// [`SourceClass`]
    #[display("class")]
    Class,
    /// [`SourceTypeAlias`]
    #[display("type alias")]
    TypeAlias,
}

/// Borrowed view over any node of the source tree
#[derive(Debug, Clone, Copy)]
pub enum SourceElement<'tree> {
    /// A file
    File(&'tree SourceFile),
    /// A property
    Property(&'tree SourceProperty),
    /// A getter or setter
    Accessor(&'tree SourceAccessor),
    /// A function
    Function(&'tree SourceFunction),
    /// A value parameter
    ValueParameter(&'tree SourceValueParameter),
    /// An annotation usage
    AnnotationCall(&'tree SourceAnnotationCall),
    /// An expression
    Expression(&'tree SourceExpression),
    /// A class-like declaration
    Class(&'tree SourceClass),
    /// A type alias
    TypeAlias(&'tree SourceTypeAlias),
}

impl SourceElement<'_> {
    /// Node kind tag
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Property(_) => NodeKind::Property,
            Self::Accessor(_) => NodeKind::Accessor,
            Self::Function(_) => NodeKind::Function,
            Self::ValueParameter(_) => NodeKind::ValueParameter,
            Self::AnnotationCall(_) => NodeKind::AnnotationCall,
            Self::Expression(expression) => expression.kind(),
            Self::Class(_) => NodeKind::Class,
            Self::TypeAlias(_) => NodeKind::TypeAlias,
        }
    }

    /// Span of the node
    pub fn span(&self) -> Span {
        match self {
            Self::File(file) => file.span,
            Self::Property(property) => property.span,
            Self::Accessor(accessor) => accessor.span,
            Self::Function(function) => function.span,
            Self::ValueParameter(parameter) => parameter.span,
            Self::AnnotationCall(call) => call.span,
            Self::Expression(expression) => expression.span(),
            Self::Class(class) => class.span,
            Self::TypeAlias(alias) => alias.span,
        }
    }
}
