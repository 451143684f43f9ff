//! End-to-end lowering scenarios over single files

use expect_test::expect;
use integration_tests::TestFixture;
use st_descriptors::{ConstantValue, FqName, Modality, Variance, Visibility};
use st_ir::verify::verify_file;
use st_ir::{DeclarationOrigin, IrDeclaration, IrParent, Symbol, SymbolKind};
use st_ir_lower::lower::lower_property;
use st_ir_lower::{LowerError, LoweringContext, ModuleDescriptor, lower_source_file};
use st_span::{FileId, Span};
use st_tree::build::{
    FileBuilder, FunctionBuilder, PropertyBuilder, annotation, class, constant, type_alias,
};
use st_tree::{ClassKind, ConeType, ConeTypeProjection, NodeKind, SourceExpression, TypeRef};
use std::num::NonZeroU64;
use std::sync::Arc;

#[test]
fn test_read_only_property_with_initializer() {
    let fixture = TestFixture::new();
    let ir = fixture.lower(&fixture.scenario_a()).unwrap();

    assert_eq!(ir.declarations.len(), 1);
    let (property_id, property) = ir.find_property(fixture.interner.intern("x")).unwrap();
    assert_eq!(property.parent, IrParent::File(ir.symbol));
    assert!(property.getter.is_none());
    assert!(property.setter.is_none());

    let field = ir.field(property.backing_field.unwrap()).unwrap();
    assert!(field.is_final);
    assert!(field.is_static);
    assert_eq!(field.parent, property.parent);
    assert_eq!(field.corresponding_property, Some(property_id));
    assert_eq!(field.ty.render(&fixture.interner), "kotlin.Int");
    assert_eq!(verify_file(&ir), Ok(()));

    expect![[r#"
        FILE fqName:demo fileName:a.kt
          PROPERTY name:x visibility:public modality:FINAL [val]
            FIELD PROPERTY_BACKING_FIELD name:x type:kotlin.Int visibility:public [final,static]
    "#]]
    .assert_eq(&fixture.dump(&ir));
}

#[test]
fn test_mutable_property_with_written_getter() {
    let fixture = TestFixture::new();
    let ir = fixture.lower(&fixture.scenario_b()).unwrap();

    let (property_id, property) = ir.find_property(fixture.interner.intern("y")).unwrap();
    assert!(property.is_var);
    assert!(property.backing_field.is_none());
    assert!(property.setter.is_none());

    let getter = ir.function(property.getter.unwrap()).unwrap();
    assert_eq!(fixture.interner.resolve(getter.name), "<get-y>");
    assert_eq!(getter.parent, property.parent);
    assert_eq!(getter.corresponding_property, Some(property_id));
    assert_eq!(getter.return_type.render(&fixture.interner), "kotlin.String");
    assert!(getter.value_parameters.is_empty());
    assert_eq!(verify_file(&ir), Ok(()));
}

#[test]
fn test_unsupported_declaration_fails_the_whole_file() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::val(&fixture.interner, "before", fixture.int())
        .initializer(constant(ConstantValue::Int(1), Span::new(17, 18)))
        .span(Span::new(0, 18))
        .build();
    let file = fixture
        .file(2, "c.kt")
        .property(property)
        .declaration(class(&fixture.interner, "Widget", ClassKind::Class, Span::new(20, 42)))
        .build();

    match fixture.lower(&file) {
        Err(LowerError::UnsupportedNode { kind, span }) => {
            assert_eq!(kind, NodeKind::Class);
            assert_eq!(span.file, FileId(2));
            assert_eq!(span.span, Span::new(20, 42));
        }
        other => panic!("expected a coverage gap, got {other:?}"),
    }
}

#[test]
fn test_type_alias_is_a_coverage_gap() {
    let fixture = TestFixture::new();
    let file = fixture
        .file(3, "alias.kt")
        .declaration(type_alias(&fixture.interner, "Id", fixture.int(), Span::new(0, 18)))
        .build();
    let error = fixture.lower(&file).unwrap_err();
    assert!(matches!(
        error,
        LowerError::UnsupportedNode {
            kind: NodeKind::TypeAlias,
            ..
        }
    ));
    assert!(error.to_string().contains("type alias"));
}

#[test]
fn test_property_attaches_to_the_pushed_file() {
    let fixture = TestFixture::new();
    let module = ModuleDescriptor::new(fixture.interner.intern("main"));
    let mut ctx = LoweringContext::new(&fixture.interner, &module, Arc::clone(&fixture.allocator));
    let file_owner = IrParent::File(Symbol::new(NonZeroU64::MIN, SymbolKind::File));
    let good = PropertyBuilder::val(&fixture.interner, "x", fixture.int())
        .initializer(constant(ConstantValue::Int(5), Span::new(13, 14)))
        .build();
    let bad = PropertyBuilder::var(&fixture.interner, "y", fixture.int())
        .modality(None)
        .build();

    let depth_before = ctx.scope_depth();
    let owner = ctx
        .with_scope(file_owner, |scoped| {
            let property_id = lower_property(scoped, &good)?;
            assert_eq!(scoped.declaration(property_id).parent(), file_owner);
            assert_eq!(scoped.scope_depth(), 1);

            assert!(matches!(
                lower_property(scoped, &bad),
                Err(LowerError::MissingModality { .. })
            ));
            assert_eq!(scoped.scope_depth(), 1);
            Ok(())
        })
        .unwrap();
    assert_eq!(owner, file_owner);
    assert_eq!(ctx.scope_depth(), depth_before);
}

#[test]
fn test_property_without_initializer_has_no_field() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::val(&fixture.interner, "pending", fixture.int())
        .lateinit()
        .build();
    let file = fixture.file(4, "pending.kt").property(property).build();
    let ir = fixture.lower(&file).unwrap();

    let (_, property) = ir.find_property(fixture.interner.intern("pending")).unwrap();
    assert!(property.backing_field.is_none());
    assert!(property.is_lateinit);
    assert_eq!(ir.declaration_count(), 1);
}

#[test]
fn test_default_accessors_are_not_lowered() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::var(&fixture.interner, "total", fixture.int())
        .initializer(constant(ConstantValue::Int(0), Span::new(16, 17)))
        .build();
    let file = fixture.file(5, "total.kt").property(property).build();
    let ir = fixture.lower(&file).unwrap();

    let (_, property) = ir.find_property(fixture.interner.intern("total")).unwrap();
    assert!(property.getter.is_none());
    assert!(property.setter.is_none());
    assert!(!ir.field(property.backing_field.unwrap()).unwrap().is_final);
    // property and backing field only
    assert_eq!(ir.declaration_count(), 2);
}

#[test]
fn test_setter_slot_is_built_from_the_setter() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::var(&fixture.interner, "name", fixture.string())
        .custom_setter(Span::new(20, 55))
        .span(Span::new(0, 55))
        .build();
    let file = fixture.file(6, "name.kt").property(property).build();
    let ir = fixture.lower(&file).unwrap();

    let (property_id, property) = ir.find_property(fixture.interner.intern("name")).unwrap();
    assert!(property.getter.is_none());
    let setter_id = property.setter.unwrap();
    let setter = ir.function(setter_id).unwrap();
    assert_eq!(fixture.interner.resolve(setter.name), "<set-name>");
    assert_eq!(setter.corresponding_property, Some(property_id));
    assert_eq!(setter.return_type.render(&fixture.interner), "kotlin.Unit");
    assert_eq!(setter.span.span, Span::new(20, 55));

    let [parameter_id] = setter.value_parameters.as_slice() else {
        panic!("setter should take exactly one parameter");
    };
    let IrDeclaration::ValueParameter(parameter) = ir.declaration(*parameter_id) else {
        panic!("setter parameter should be a value parameter");
    };
    assert_eq!(parameter.parent, IrParent::Declaration(setter_id));
    assert_eq!(fixture.interner.resolve(parameter.name), "value");
    assert_eq!(parameter.ty.render(&fixture.interner), "kotlin.String");
    assert_eq!(verify_file(&ir), Ok(()));
}

#[test]
fn test_missing_property_modality_is_reported() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::val(&fixture.interner, "broken", fixture.int())
        .modality(None)
        .span(Span::new(4, 20))
        .build();
    let file = fixture.file(7, "broken.kt").property(property).build();

    match fixture.lower(&file) {
        Err(error @ LowerError::MissingModality { .. }) => {
            assert!(error.is_precondition_violation());
            assert_eq!(
                error.to_string(),
                "declaration `broken` at #7@4..20 has no resolved modality"
            );
        }
        other => panic!("expected missing modality, got {other:?}"),
    }
}

#[test]
fn test_missing_accessor_modality_is_reported() {
    let fixture = TestFixture::new();
    let mut property = PropertyBuilder::val(&fixture.interner, "shown", fixture.int())
        .custom_getter(Span::new(15, 30))
        .build();
    property.getter.modality = None;
    let file = fixture.file(8, "shown.kt").property(property).build();

    match fixture.lower(&file) {
        Err(LowerError::MissingModality { name, .. }) => assert_eq!(name, "<get-shown>"),
        other => panic!("expected missing modality, got {other:?}"),
    }
}

#[test]
fn test_unresolved_property_type_is_reported() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::val(&fixture.interner, "mystery", fixture.int())
        .return_type(TypeRef::Error {
            reason: "unresolved reference: Mystery".to_string(),
            span: Span::new(13, 20),
        })
        .initializer(constant(ConstantValue::Null, Span::new(23, 27)))
        .build();
    let file = fixture.file(9, "mystery.kt").property(property).build();

    match fixture.lower(&file) {
        Err(LowerError::UnresolvedType { name, reason, .. }) => {
            assert_eq!(name, "mystery");
            assert_eq!(reason, "unresolved reference: Mystery");
        }
        other => panic!("expected an unresolved type, got {other:?}"),
    }
}

#[test]
fn test_file_without_package_fragment_is_rejected() {
    let fixture = TestFixture::new();
    let file = fixture.scenario_a();
    let empty = ModuleDescriptor::new(fixture.interner.intern("main"));

    let error = lower_source_file(
        &fixture.interner,
        &empty,
        Arc::clone(&fixture.allocator),
        &file,
    )
    .unwrap_err();
    assert!(matches!(
        &error,
        LowerError::MissingPackageFragment { package, file } if package == "demo" && file == "a.kt"
    ));
}

#[test]
fn test_file_is_anchored_to_its_fragment() {
    let fixture = TestFixture::new();
    let file = fixture.scenario_a();
    let ir = fixture.lower(&file).unwrap();
    assert_eq!(ir.package_fragment.fq_name, file.package_fq_name);
    assert_eq!(ir.package_fragment.index, 0);
    assert_eq!(ir.fq_name, file.package_fq_name);
    assert_eq!(ir.file_id, FileId(0));
}

#[test]
fn test_unsupported_annotation_argument_fails() {
    let fixture = TestFixture::new();
    let property = PropertyBuilder::val(&fixture.interner, "tagged", fixture.int())
        .annotation(annotation(
            &fixture.interner,
            "demo.Tag",
            vec![SourceExpression::QualifiedAccess {
                callee: fixture.interner.intern("DEFAULT"),
                span: Span::new(5, 12),
            }],
            Span::new(0, 13),
        ))
        .build();
    let file = fixture.file(10, "tagged.kt").property(property).build();
    assert!(matches!(
        fixture.lower(&file),
        Err(LowerError::UnsupportedNode {
            kind: NodeKind::QualifiedAccess,
            ..
        })
    ));
}

#[test]
fn test_every_declaration_kind_in_one_file() {
    let fixture = TestFixture::new();
    let interner = &fixture.interner;
    let nullable_string = fixture.string().with_nullability(true);
    let list_of_strings = ConeType::Class {
        class_id: FqName::parse(interner, "kotlin.collections.List"),
        arguments: vec![ConeTypeProjection::Type {
            variance: Variance::Out,
            ty: fixture.string(),
        }],
        nullable: false,
    };

    let limit = PropertyBuilder::val(interner, "LIMIT", fixture.int())
        .constant()
        .initializer(constant(ConstantValue::Int(10), Span::new(40, 42)))
        .span(Span::new(24, 42))
        .build();
    let name = PropertyBuilder::var(interner, "name", nullable_string)
        .visibility(Visibility::Internal)
        .initializer(constant(ConstantValue::Null, Span::new(70, 74)))
        .custom_getter(Span::new(75, 110))
        .getter_annotation(annotation(
            interner,
            "kotlin.Deprecated",
            vec![constant(ConstantValue::String("old".to_string()), Span::new(88, 93))],
            Span::new(75, 94),
        ))
        .custom_setter(Span::new(111, 150))
        .span(Span::new(44, 150))
        .build();
    let service = PropertyBuilder::var(interner, "service", fixture.string())
        .lateinit()
        .span(Span::new(152, 180))
        .build();
    let lazy_value = PropertyBuilder::val(interner, "lazyValue", fixture.int())
        .delegate(SourceExpression::Lambda {
            span: Span::new(205, 215),
        })
        .span(Span::new(182, 215))
        .build();
    let describe = FunctionBuilder::new(interner, "describe", fixture.string())
        .parameter("items", list_of_strings, Span::new(240, 260))
        .inline()
        .modality(Some(Modality::Final))
        .annotation(annotation(
            interner,
            "kotlin.Suppress",
            vec![SourceExpression::ArrayOf {
                elements: vec![constant(
                    ConstantValue::String("unused".to_string()),
                    Span::new(227, 235),
                )],
                span: Span::new(226, 236),
            }],
            Span::new(217, 237),
        ))
        .span(Span::new(217, 290))
        .build();

    let file = FileBuilder::new(interner, FileId(11), "sample.kt", "org.sample")
        .annotation(annotation(
            interner,
            "kotlin.jvm.JvmName",
            vec![constant(ConstantValue::String("SampleKt".to_string()), Span::new(15, 25))],
            Span::new(0, 26),
        ))
        .property(limit)
        .property(name)
        .property(service)
        .property(lazy_value)
        .function(describe)
        .build();

    let ir = fixture.lower(&file).unwrap();
    assert_eq!(verify_file(&ir), Ok(()));
    assert!(
        ir.arena
            .iter()
            .filter_map(|(_, declaration)| match declaration {
                IrDeclaration::Field(field) => Some(field.origin),
                _ => None,
            })
            .all(|origin| origin == DeclarationOrigin::PropertyBackingField)
    );

    expect![[r#"
        FILE fqName:org.sample fileName:sample.kt
          ANNOTATION kotlin.jvm.JvmName
            CONST String value="SampleKt"
          PROPERTY name:LIMIT visibility:public modality:FINAL [val,const]
            FIELD PROPERTY_BACKING_FIELD name:LIMIT type:kotlin.Int visibility:public [final,static]
          PROPERTY name:name visibility:internal modality:FINAL [var]
            FIELD PROPERTY_BACKING_FIELD name:name type:kotlin.String? visibility:internal [static]
            FUN name:<get-name> visibility:internal modality:FINAL returnType:kotlin.String?
              ANNOTATION kotlin.Deprecated
                CONST String value="old"
            FUN name:<set-name> visibility:internal modality:FINAL returnType:kotlin.Unit
              VALUE_PARAMETER name:value index:0 type:kotlin.String?
          PROPERTY name:service visibility:public modality:FINAL [var,lateinit]
          PROPERTY name:lazyValue visibility:public modality:FINAL [val,delegated]
          FUN name:describe visibility:public modality:FINAL returnType:kotlin.String [inline]
            ANNOTATION kotlin.Suppress
              VARARG
                CONST String value="unused"
            VALUE_PARAMETER name:items index:0 type:kotlin.collections.List<out kotlin.String>
    "#]]
    .assert_eq(&fixture.dump(&ir));
}
