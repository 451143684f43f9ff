//! Descriptor vocabulary shared by the source tree and the IR tree
//!
//! This crate exists so that `st-tree` and `st-ir` can agree on names,
//! visibilities and constants without depending on each other.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use st_intern::{Interner, Name};
use std::fmt;

/// A fully-qualified, dot separated name such as `kotlin.collections.List`
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FqName {
    segments: Vec<Name>,
}

impl FqName {
    /// The root (default) package
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from already interned segments
    pub fn from_segments(segments: Vec<Name>) -> Self {
        Self { segments }
    }

    /// Intern a dotted path; the empty string is the root package
    pub fn parse(interner: &Interner, dotted: &str) -> Self {
        let segments = dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| interner.intern(segment))
            .collect();
        Self { segments }
    }

    /// Name of a member nested under `self`
    #[must_use]
    pub fn child(&self, name: Name) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }

    /// Enclosing name, or `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Last segment
    pub fn short_name(&self) -> Option<Name> {
        self.segments.last().copied()
    }

    /// Interned segments, outermost first
    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    /// Whether this is the root package
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dotted text of this name
    pub fn render(&self, interner: &Interner) -> String {
        self.segments
            .iter()
            .map(|segment| interner.resolve(*segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Declaration visibility as filled in by the resolver
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible everywhere
    #[display("public")]
    Public,
    /// Visible in subclasses
    #[display("protected")]
    Protected,
    /// Visible inside the module
    #[display("internal")]
    Internal,
    /// Visible inside the declaring scope
    #[display("private")]
    Private,
    /// Local declaration
    #[display("local")]
    Local,
}

/// Inheritance modality
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Modality {
    /// Cannot be overridden
    #[display("FINAL")]
    Final,
    /// Closed hierarchy
    #[display("SEALED")]
    Sealed,
    /// May be overridden
    #[display("OPEN")]
    Open,
    /// Must be overridden
    #[display("ABSTRACT")]
    Abstract,
}

/// Use-site variance of a type argument
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Variance {
    /// No projection
    #[display("")]
    Invariant,
    /// Contravariant (`in T`)
    #[display("in")]
    In,
    /// Covariant (`out T`)
    #[display("out")]
    Out,
}

/// A compile-time constant literal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Character literal
    Char(char),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String literal
    String(String),
}

impl ConstantValue {
    /// Short kind tag used by IR dumps (`Int`, `String`, ...)
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Char(_) => "Char",
            Self::Byte(_) => "Byte",
            Self::Short(_) => "Short",
            Self::Int(_) => "Int",
            Self::Long(_) => "Long",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("null"),
            Self::Boolean(value) => write!(formatter, "{value}"),
            Self::Char(value) => write!(formatter, "'{value}'"),
            Self::Byte(value) => write!(formatter, "{value}"),
            Self::Short(value) => write!(formatter, "{value}"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Long(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
            Self::Double(value) => write!(formatter, "{value}"),
            Self::String(value) => write!(formatter, "\"{value}\""),
        }
    }
}

/// One fragment of a package contributed by a module
///
/// A package may be split across several fragments; lowering anchors each
/// IR file to exactly one of them.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PackageFragmentDescriptor {
    /// Name of the contributing module
    pub module: Name,
    /// Package the fragment belongs to
    pub fq_name: FqName,
    /// Position of the fragment within its package
    pub index: u32,
}
