//! Fluent builders for resolved source trees
//!
//! Front-ends hand fully resolved trees to the lowering stage; tests and
//! fixtures use these builders to produce the same shape without running a
//! resolver. Defaults mirror what a resolver fills in for an unannotated
//! declaration: public, final, with default accessors.

use crate::{
    AccessorKind, ClassKind, ConeType, SourceAccessor, SourceAnnotationCall, SourceClass,
    SourceDeclaration, SourceExpression, SourceFile, SourceFunction, SourceProperty,
    SourceTypeAlias, SourceValueParameter, TypeRef,
};
use st_descriptors::{ConstantValue, FqName, Modality, Visibility};
use st_intern::{Interner, Name};
use st_span::{FileId, Span};
use std::iter;

/// Non-nullable class type for a dotted class name
pub fn class_type(interner: &Interner, class_id: &str) -> ConeType {
    ConeType::class(FqName::parse(interner, class_id))
}

/// Resolved type reference located at `span`
pub fn resolved(ty: ConeType, span: Span) -> TypeRef {
    TypeRef::Resolved { ty, span }
}

/// Literal constant expression
pub fn constant(value: ConstantValue, span: Span) -> SourceExpression {
    SourceExpression::Const { value, span }
}

/// Annotation usage of `class_id` with the given arguments
pub fn annotation(
    interner: &Interner,
    class_id: &str,
    arguments: Vec<SourceExpression>,
    span: Span,
) -> SourceAnnotationCall {
    SourceAnnotationCall {
        annotation_type: resolved(class_type(interner, class_id), span),
        arguments,
        span,
    }
}

/// Builder for [`SourceFile`]
pub struct FileBuilder {
    file: SourceFile,
}

impl FileBuilder {
    /// Start an empty file in `package` (dotted, empty for the root package)
    pub fn new(interner: &Interner, file_id: FileId, name: &str, package: &str) -> Self {
        Self {
            file: SourceFile {
                file_id,
                name: name.to_string(),
                package_fq_name: FqName::parse(interner, package),
                declarations: Vec::new(),
                annotations: Vec::new(),
                span: Span::default(),
            },
        }
    }

    /// Append a property
    #[must_use]
    pub fn property(self, property: SourceProperty) -> Self {
        self.declaration(SourceDeclaration::Property(property))
    }

    /// Append a function
    #[must_use]
    pub fn function(self, function: SourceFunction) -> Self {
        self.declaration(SourceDeclaration::Function(function))
    }

    /// Append any declaration
    #[must_use]
    pub fn declaration(mut self, declaration: SourceDeclaration) -> Self {
        self.file.declarations.push(declaration);
        self
    }

    /// Append a file annotation
    #[must_use]
    pub fn annotation(mut self, call: SourceAnnotationCall) -> Self {
        self.file.annotations.push(call);
        self
    }

    /// Finish the file; its span covers every declaration
    pub fn build(mut self) -> SourceFile {
        self.file.span = self
            .file
            .declarations
            .iter()
            .map(|declaration| declaration.as_element().span())
            .chain(self.file.annotations.iter().map(|call| call.span))
            .fold(Span::default(), Span::cover);
        self.file
    }
}

/// Builder for [`SourceProperty`]
pub struct PropertyBuilder {
    property: SourceProperty,
    unit_type: ConeType,
    value_name: Name,
}

impl PropertyBuilder {
    /// Read-only property with a default getter
    pub fn val(interner: &Interner, name: &str, ty: ConeType) -> Self {
        Self::new(interner, name, ty, false)
    }

    /// Mutable property with default getter and setter
    pub fn var(interner: &Interner, name: &str, ty: ConeType) -> Self {
        Self::new(interner, name, ty, true)
    }

    fn new(interner: &Interner, name: &str, ty: ConeType, is_var: bool) -> Self {
        let name = interner.intern(name);
        let unit_type = class_type(interner, "kotlin.Unit");
        let value_name = interner.intern("value");
        let getter = default_accessor(name, AccessorKind::Getter, resolved(ty.clone(), Span::default()));
        let mut builder = Self {
            property: SourceProperty {
                name,
                visibility: Visibility::Public,
                modality: Some(Modality::Final),
                is_var,
                is_const: false,
                is_lateinit: false,
                is_external: false,
                return_type: resolved(ty, Span::default()),
                initializer: None,
                delegate: None,
                getter,
                setter: None,
                annotations: Vec::new(),
                span: Span::default(),
            },
            unit_type,
            value_name,
        };
        if is_var {
            builder.property.setter = Some(builder.default_setter());
        }
        builder
    }

    fn default_setter(&self) -> SourceAccessor {
        let mut setter = default_accessor(
            self.property.name,
            AccessorKind::Setter,
            resolved(self.unit_type.clone(), Span::default()),
        );
        setter.value_parameters.push(SourceValueParameter {
            name: self.value_name,
            return_type: self.property.return_type.clone(),
            has_default_value: false,
            is_vararg: false,
            annotations: Vec::new(),
            span: Span::default(),
        });
        setter
    }

    /// Declaration span
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.property.span = span;
        self
    }

    /// Resolved visibility
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.property.visibility = visibility;
        self.property.getter.visibility = visibility;
        if let Some(setter) = &mut self.property.setter {
            setter.visibility = visibility;
        }
        self
    }

    /// Resolved modality; `None` models a resolver that skipped the property
    #[must_use]
    pub fn modality(mut self, modality: Option<Modality>) -> Self {
        self.property.modality = modality;
        self
    }

    /// Replace the declared type
    #[must_use]
    pub fn return_type(mut self, return_type: TypeRef) -> Self {
        self.property.return_type = return_type;
        self
    }

    /// Mark `const`
    #[must_use]
    pub fn constant(mut self) -> Self {
        self.property.is_const = true;
        self
    }

    /// Mark `lateinit`
    #[must_use]
    pub fn lateinit(mut self) -> Self {
        self.property.is_lateinit = true;
        self
    }

    /// Mark `external`
    #[must_use]
    pub fn external(mut self) -> Self {
        self.property.is_external = true;
        self
    }

    /// Add an `= expr` initializer
    #[must_use]
    pub fn initializer(mut self, expression: SourceExpression) -> Self {
        self.property.initializer = Some(expression);
        self
    }

    /// Add a `by expr` delegate
    #[must_use]
    pub fn delegate(mut self, expression: SourceExpression) -> Self {
        self.property.delegate = Some(expression);
        self
    }

    /// Replace the default getter with a user-written one at `span`
    #[must_use]
    pub fn custom_getter(mut self, span: Span) -> Self {
        self.property.getter.is_default = false;
        self.property.getter.span = span;
        self
    }

    /// Replace the default setter with a user-written one at `span`
    ///
    /// A `val` gains a setter slot only through this call, which models a
    /// malformed tree; the lowering does not reject it.
    #[must_use]
    pub fn custom_setter(mut self, span: Span) -> Self {
        let mut setter = self
            .property
            .setter
            .take()
            .unwrap_or_else(|| self.default_setter());
        setter.is_default = false;
        setter.span = span;
        self.property.setter = Some(setter);
        self
    }

    /// Annotate the getter
    #[must_use]
    pub fn getter_annotation(mut self, call: SourceAnnotationCall) -> Self {
        self.property.getter.annotations.push(call);
        self
    }

    /// Annotate the property
    #[must_use]
    pub fn annotation(mut self, call: SourceAnnotationCall) -> Self {
        self.property.annotations.push(call);
        self
    }

    /// Finish the property; default accessors take the property's span
    pub fn build(mut self) -> SourceProperty {
        let span = self.property.span;
        let modality = self.property.modality;
        let accessors =
            iter::once(&mut self.property.getter).chain(self.property.setter.as_mut());
        for accessor in accessors {
            accessor.modality = modality;
            if accessor.is_default {
                accessor.span = span;
            }
        }
        self.property
    }
}

fn default_accessor(property_name: Name, kind: AccessorKind, return_type: TypeRef) -> SourceAccessor {
    SourceAccessor {
        property_name,
        kind,
        is_default: true,
        visibility: Visibility::Public,
        modality: Some(Modality::Final),
        return_type,
        value_parameters: Vec::new(),
        annotations: Vec::new(),
        span: Span::default(),
    }
}

/// Builder for [`SourceFunction`]
pub struct FunctionBuilder<'int> {
    interner: &'int Interner,
    function: SourceFunction,
}

impl<'int> FunctionBuilder<'int> {
    /// Public final function returning `return_type`
    pub fn new(interner: &'int Interner, name: &str, return_type: ConeType) -> Self {
        Self {
            interner,
            function: SourceFunction {
                name: interner.intern(name),
                visibility: Visibility::Public,
                modality: Some(Modality::Final),
                return_type: resolved(return_type, Span::default()),
                value_parameters: Vec::new(),
                is_external: false,
                is_inline: false,
                annotations: Vec::new(),
                span: Span::default(),
            },
        }
    }

    /// Append a value parameter
    #[must_use]
    pub fn parameter(mut self, name: &str, ty: ConeType, span: Span) -> Self {
        self.function.value_parameters.push(SourceValueParameter {
            name: self.interner.intern(name),
            return_type: resolved(ty, span),
            has_default_value: false,
            is_vararg: false,
            annotations: Vec::new(),
            span,
        });
        self
    }

    /// Declaration span
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.function.span = span;
        self
    }

    /// Resolved visibility
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.function.visibility = visibility;
        self
    }

    /// Resolved modality
    #[must_use]
    pub fn modality(mut self, modality: Option<Modality>) -> Self {
        self.function.modality = modality;
        self
    }

    /// Mark `inline`
    #[must_use]
    pub fn inline(mut self) -> Self {
        self.function.is_inline = true;
        self
    }

    /// Mark `external`
    #[must_use]
    pub fn external(mut self) -> Self {
        self.function.is_external = true;
        self
    }

    /// Annotate the function
    #[must_use]
    pub fn annotation(mut self, call: SourceAnnotationCall) -> Self {
        self.function.annotations.push(call);
        self
    }

    /// Finish the function
    pub fn build(self) -> SourceFunction {
        self.function
    }
}

/// An empty class declaration
pub fn class(interner: &Interner, name: &str, class_kind: ClassKind, span: Span) -> SourceDeclaration {
    SourceDeclaration::Class(SourceClass {
        name: interner.intern(name),
        class_kind,
        declarations: Vec::new(),
        span,
    })
}

/// A type alias declaration
pub fn type_alias(interner: &Interner, name: &str, expanded: ConeType, span: Span) -> SourceDeclaration {
    SourceDeclaration::TypeAlias(SourceTypeAlias {
        name: interner.intern(name),
        expanded_type: resolved(expanded, span),
        span,
    })
}
