//! Declarations implied by the source but not written in it

use crate::error::LowerResult;
use crate::lower::LoweringContext;
use crate::types::translate_type_ref;
use st_ir::{DeclId, DeclarationOrigin, IrDeclaration, IrField, IrParent, SymbolKind};
use st_tree::SourceProperty;
use tracing::debug;

/// Build the backing field of a property that has an initializer
///
/// The field is owned by `parent` (the property's own owner), points back
/// to `property_id`, and copies visibility, name and the external flag
/// from the lowered property. Its initializer is filled in by a later
/// stage.
///
/// # Errors
///
/// Returns [`LowerError::UnresolvedType`](crate::LowerError::UnresolvedType)
/// for an unresolved property type.
pub fn backing_field(
    ctx: &mut LoweringContext,
    source: &SourceProperty,
    property_id: DeclId,
    parent: IrParent,
) -> LowerResult<DeclId> {
    let property = ctx.property(property_id)?;
    let name = property.name;
    let visibility = property.visibility;
    let is_external = property.is_external;
    let span = property.span;
    let ty = translate_type_ref(
        &source.return_type,
        ctx.interner.resolve(name),
        ctx.file_id(),
    )?;

    let field = ctx.declare(SymbolKind::Field, |symbol| {
        IrDeclaration::Field(IrField {
            symbol,
            parent,
            origin: DeclarationOrigin::PropertyBackingField,
            name,
            visibility,
            is_final: !source.is_var,
            is_external,
            is_static: parent.is_file(),
            ty,
            initializer: None,
            corresponding_property: Some(property_id),
            annotations: Vec::new(),
            span,
        })
    })?;
    debug!(
        property = ctx.interner.resolve(name),
        static_field = parent.is_file(),
        "synthesized backing field"
    );
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::{lower_function, lower_property, lower_source_file};
    use crate::package::ModuleDescriptor;
    use crate::symbols::SymbolAllocator;
    use st_descriptors::{ConstantValue, FqName, Visibility};
    use st_intern::Interner;
    use st_ir::{IrClassifier, Symbol};
    use st_span::{FileId, Span};
    use st_tree::build::{FileBuilder, FunctionBuilder, PropertyBuilder, class_type, constant};
    use std::num::NonZeroU64;
    use std::sync::Arc;

    #[test]
    fn test_field_mirrors_property() {
        let interner = Interner::new();
        let property = PropertyBuilder::var(&interner, "count", class_type(&interner, "kotlin.Int"))
            .visibility(Visibility::Internal)
            .external()
            .initializer(constant(ConstantValue::Int(0), Span::new(14, 15)))
            .span(Span::new(0, 15))
            .build();
        let file = FileBuilder::new(&interner, FileId(1), "count.kt", "demo")
            .property(property)
            .build();
        let module = ModuleDescriptor::from_files(interner.intern("main"), [&file]);
        let ir = lower_source_file(
            &interner,
            &module,
            Arc::new(SymbolAllocator::new()),
            &file,
        )
        .unwrap();

        let (property_id, property) = ir.find_property(interner.intern("count")).unwrap();
        let field = ir.field(property.backing_field.unwrap()).unwrap();
        assert_eq!(field.origin, DeclarationOrigin::PropertyBackingField);
        assert_eq!(field.parent, IrParent::File(ir.symbol));
        assert_eq!(field.corresponding_property, Some(property_id));
        assert_eq!(field.visibility, Visibility::Internal);
        assert_eq!(field.span, property.span);
        assert!(!field.is_final);
        assert!(field.is_external);
        assert!(field.is_static);
        assert!(field.initializer.is_none());
        assert_eq!(
            field.ty.classifier,
            IrClassifier::Class(FqName::parse(&interner, "kotlin.Int"))
        );
    }

    #[test]
    fn test_field_under_declaration_owner_is_not_static() {
        let interner = Interner::new();
        let module = ModuleDescriptor::new(interner.intern("main"));
        let mut ctx = LoweringContext::new(&interner, &module, Arc::new(SymbolAllocator::new()));
        let function =
            FunctionBuilder::new(&interner, "outer", class_type(&interner, "kotlin.Unit")).build();
        let property = PropertyBuilder::val(&interner, "x", class_type(&interner, "kotlin.Int"))
            .initializer(constant(ConstantValue::Int(5), Span::new(12, 13)))
            .span(Span::new(0, 13))
            .build();
        let file_owner = IrParent::File(Symbol::new(NonZeroU64::MIN, SymbolKind::File));

        let mut lowered = None;
        ctx.with_scope(file_owner, |file_scope| {
            let function_id = lower_function(file_scope, &function)?;
            let owner = IrParent::Declaration(function_id);
            file_scope.with_scope(owner, |function_scope| {
                assert_eq!(function_scope.scope_depth(), 2);
                lowered = Some((function_id, lower_property(function_scope, &property)?));
                Ok(())
            })?;
            assert_eq!(file_scope.scope_depth(), 1);
            Ok(())
        })
        .unwrap();
        assert_eq!(ctx.scope_depth(), 0);

        let (function_id, property_id) = lowered.unwrap();
        let IrDeclaration::Property(ir_property) = ctx.declaration(property_id) else {
            panic!("expected a property");
        };
        assert_eq!(ir_property.parent, IrParent::Declaration(function_id));
        let IrDeclaration::Field(field) = ctx.declaration(ir_property.backing_field.unwrap())
        else {
            panic!("expected a field");
        };
        assert_eq!(field.parent, IrParent::Declaration(function_id));
        assert_eq!(field.corresponding_property, Some(property_id));
        assert!(!field.is_static);
        assert!(field.is_final);
    }
}
