//! Resolved type references carried by source declarations

use st_descriptors::{FqName, Variance};
use st_intern::Name;
use st_span::Span;

/// A type reference as left by the resolver
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Declared or inferred type, fully resolved
    Resolved {
        /// The resolved type
        ty: ConeType,
        /// Location of the type annotation, or of the declaration if inferred
        span: Span,
    },
    /// Inference never ran for this declaration
    Implicit {
        /// Location of the declaration
        span: Span,
    },
    /// Resolution failed upstream
    Error {
        /// Resolver's explanation
        reason: String,
        /// Location of the type annotation
        span: Span,
    },
}

impl TypeRef {
    /// The resolved type, if resolution succeeded
    pub fn resolved(&self) -> Option<&ConeType> {
        match self {
            Self::Resolved { ty, .. } => Some(ty),
            Self::Implicit { .. } | Self::Error { .. } => None,
        }
    }

    /// Source location of this reference
    pub fn span(&self) -> Span {
        match self {
            Self::Resolved { span, .. } | Self::Implicit { span } | Self::Error { span, .. } => {
                *span
            }
        }
    }
}

/// A resolved type
#[derive(Debug, Clone, PartialEq)]
pub enum ConeType {
    /// Reference to a class-like declaration
    Class {
        /// Fully-qualified class name
        class_id: FqName,
        /// Type arguments, in declaration order
        arguments: Vec<ConeTypeProjection>,
        /// Marked nullable (`T?`)
        nullable: bool,
    },
    /// Reference to a type parameter in scope
    TypeParameter {
        /// Parameter name
        name: Name,
        /// Marked nullable (`T?`)
        nullable: bool,
    },
}

impl ConeType {
    /// Non-nullable class type without arguments
    pub fn class(class_id: FqName) -> Self {
        Self::Class {
            class_id,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// Same type with nullability set to `nullable`
    #[must_use]
    pub fn with_nullability(self, nullable: bool) -> Self {
        match self {
            Self::Class {
                class_id,
                arguments,
                ..
            } => Self::Class {
                class_id,
                arguments,
                nullable,
            },
            Self::TypeParameter { name, .. } => Self::TypeParameter { name, nullable },
        }
    }
}

/// A type argument at use site
#[derive(Debug, Clone, PartialEq)]
pub enum ConeTypeProjection {
    /// `*`
    Star,
    /// A concrete argument with its variance
    Type {
        /// Use-site variance
        variance: Variance,
        /// Argument type
        ty: ConeType,
    },
}
