//! Translation of resolved source types into IR types

use crate::error::{LowerError, LowerResult};
use st_ir::{IrClassifier, IrType, IrTypeArgument};
use st_span::{FileId, FileSpan};
use st_tree::{ConeType, ConeTypeProjection, TypeRef};

/// Translate the type of the declaration called `owner`
///
/// Anything but a resolved type means the resolver skipped this declaration.
///
/// # Errors
///
/// Returns [`LowerError::UnresolvedType`] for an unresolved or erroneous
/// type reference, including one nested in a type argument.
pub fn translate_type_ref(type_ref: &TypeRef, owner: &str, file: FileId) -> LowerResult<IrType> {
    match type_ref {
        TypeRef::Resolved { ty, .. } => Ok(translate_cone_type(ty)),
        TypeRef::Implicit { span } => Err(LowerError::UnresolvedType {
            name: owner.to_string(),
            reason: "type was never inferred".to_string(),
            span: FileSpan::new(file, *span),
        }),
        TypeRef::Error { reason, span } => Err(LowerError::UnresolvedType {
            name: owner.to_string(),
            reason: reason.clone(),
            span: FileSpan::new(file, *span),
        }),
    }
}

/// Translate a resolved type
pub fn translate_cone_type(ty: &ConeType) -> IrType {
    match ty {
        ConeType::Class {
            class_id,
            arguments,
            nullable,
        } => IrType {
            classifier: IrClassifier::Class(class_id.clone()),
            arguments: arguments.iter().map(translate_projection).collect(),
            nullable: *nullable,
        },
        ConeType::TypeParameter { name, nullable } => IrType {
            classifier: IrClassifier::TypeParameter(*name),
            arguments: Vec::new(),
            nullable: *nullable,
        },
    }
}

fn translate_projection(projection: &ConeTypeProjection) -> IrTypeArgument {
    match projection {
        ConeTypeProjection::Star => IrTypeArgument::Star,
        ConeTypeProjection::Type { variance, ty } => IrTypeArgument::Projection {
            variance: *variance,
            ty: translate_cone_type(ty),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_descriptors::{FqName, Variance};
    use st_intern::Interner;
    use st_span::Span;
    use st_tree::build::class_type;

    #[test]
    fn test_generic_nullable_type() {
        let interner = Interner::new();
        let list = ConeType::Class {
            class_id: FqName::parse(&interner, "kotlin.collections.List"),
            arguments: vec![
                ConeTypeProjection::Type {
                    variance: Variance::Out,
                    ty: class_type(&interner, "kotlin.String"),
                },
                ConeTypeProjection::Star,
            ],
            nullable: true,
        };
        let ir = translate_cone_type(&list);
        assert_eq!(
            ir.render(&interner),
            "kotlin.collections.List<out kotlin.String, *>?"
        );
    }

    #[test]
    fn test_type_parameter() {
        let interner = Interner::new();
        let name = interner.intern("T");
        let ir = translate_cone_type(&ConeType::TypeParameter {
            name,
            nullable: false,
        });
        assert_eq!(ir.classifier, IrClassifier::TypeParameter(name));
    }

    #[test]
    fn test_error_type_is_rejected_with_reason() {
        let type_ref = TypeRef::Error {
            reason: "unresolved reference: Foo".to_string(),
            span: Span::new(4, 7),
        };
        let error = translate_type_ref(&type_ref, "x", FileId(2)).unwrap_err();
        match error {
            LowerError::UnresolvedType { name, reason, span } => {
                assert_eq!(name, "x");
                assert_eq!(reason, "unresolved reference: Foo");
                assert_eq!(span, FileSpan::new(FileId(2), Span::new(4, 7)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_implicit_type_is_rejected() {
        let type_ref = TypeRef::Implicit {
            span: Span::new(0, 1),
        };
        assert!(matches!(
            translate_type_ref(&type_ref, "y", FileId(0)),
            Err(LowerError::UnresolvedType { .. })
        ));
    }
}
