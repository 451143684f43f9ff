//! Source tree → IR lowering
//!
//! One [`LoweringContext`] drives one pass over one file at a time. Each
//! source node kind maps to a construction routine below; the routines read
//! their owner from the scope stack and route child construction through
//! [`LoweringContext::with_scope`].

use crate::driver::CancellationFlag;
use crate::error::{LowerError, LowerResult};
use crate::package::PackageFragmentProvider;
use crate::scope::ScopeStack;
use crate::symbols::{SymbolAllocator, SymbolTable};
use crate::synth;
use crate::types::translate_type_ref;
use la_arena::Arena;
use rustc_hash::FxHashMap;
use st_descriptors::{Modality, Visibility};
use st_intern::{Interner, Name};
use st_ir::{
    DeclId, DeclarationOrigin, IrCall, IrClassifier, IrConst, IrDeclaration, IrExpression,
    IrFile, IrFunction, IrParent, IrProperty, IrType, IrValueParameter, Symbol, SymbolKind,
};
use st_span::{FileId, FileSpan, Span};
use st_tree::{
    NodeKind, SourceAccessor, SourceAnnotationCall, SourceDeclaration, SourceElement,
    SourceExpression, SourceFile, SourceFunction, SourceProperty, SourceValueParameter,
};
use std::mem;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// State of one lowering pass
pub struct LoweringContext<'ctx> {
    /// Name interner shared with the source tree
    pub interner: &'ctx Interner,
    packages: &'ctx dyn PackageFragmentProvider,
    cancellation: Option<&'ctx CancellationFlag>,
    file_id: FileId,
    scopes: ScopeStack,
    symbols: SymbolTable,
    arena: Arena<IrDeclaration>,
}

/// Result of lowering an arbitrary source element
#[derive(Debug, Clone)]
pub enum IrElement {
    /// A whole file
    File(Box<IrFile>),
    /// A declaration in the file under construction
    Declaration(DeclId),
    /// An annotation call
    Annotation(IrCall),
    /// An expression
    Expression(IrExpression),
}

/// Shape shared by accessors and top-level functions
struct FunctionHeader {
    name: Name,
    visibility: Visibility,
    modality: Modality,
    return_type: IrType,
    is_external: bool,
    is_inline: bool,
    corresponding_property: Option<DeclId>,
    span: FileSpan,
}

impl<'ctx> LoweringContext<'ctx> {
    /// Create a context that issues symbols from `allocator`
    pub fn new(
        interner: &'ctx Interner,
        packages: &'ctx dyn PackageFragmentProvider,
        allocator: Arc<SymbolAllocator>,
    ) -> Self {
        Self {
            interner,
            packages,
            cancellation: None,
            file_id: FileId(0),
            scopes: ScopeStack::new(),
            symbols: SymbolTable::new(allocator),
            arena: Arena::new(),
        }
    }

    /// Poll `flag` before every top-level declaration
    #[must_use]
    pub fn with_cancellation(mut self, flag: &'ctx CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Run `body` with `owner` as the current owner, then restore the stack
    ///
    /// The owner is popped whether `body` succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `body`.
    pub fn with_scope<F>(&mut self, owner: IrParent, body: F) -> LowerResult<IrParent>
    where
        F: FnOnce(&mut Self) -> LowerResult<()>,
    {
        self.scopes.push(owner);
        let result = body(self);
        self.scopes.pop();
        result.map(|()| owner)
    }

    /// Owner that the next declaration attaches to
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::EmptyScope`] when no owner is pushed.
    pub fn current_owner(&self) -> LowerResult<IrParent> {
        self.scopes.current_owner()
    }

    /// Number of owners currently pushed
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Declarations built so far in the current pass
    pub fn arena(&self) -> &Arena<IrDeclaration> {
        &self.arena
    }

    /// Declaration built at `id` in the current pass
    pub fn declaration(&self, id: DeclId) -> &IrDeclaration {
        &self.arena[id]
    }

    /// Declaration bound to `symbol` in the current pass
    pub fn lookup(&self, symbol: Symbol) -> Option<DeclId> {
        self.symbols.lookup(symbol)
    }

    /// Issue a symbol that names no declaration of this file
    pub(crate) fn issue_symbol(&self, kind: SymbolKind) -> Symbol {
        self.symbols.issue(kind)
    }

    /// Allocate a declaration with a fresh symbol already bound to it
    pub(crate) fn declare<F>(&mut self, kind: SymbolKind, build: F) -> LowerResult<DeclId>
    where
        F: FnOnce(Symbol) -> IrDeclaration,
    {
        let symbol = self.symbols.issue(kind);
        let id = self.arena.alloc(build(symbol));
        self.symbols.bind(symbol, id)?;
        Ok(id)
    }

    pub(crate) fn property_mut(&mut self, id: DeclId) -> LowerResult<&mut IrProperty> {
        match &mut self.arena[id] {
            IrDeclaration::Property(property) => Ok(property),
            other => Err(LowerError::KindMismatch {
                expected: SymbolKind::Property,
                found: other.symbol().kind(),
            }),
        }
    }

    pub(crate) fn function_mut(&mut self, id: DeclId) -> LowerResult<&mut IrFunction> {
        match &mut self.arena[id] {
            IrDeclaration::Function(function) => Ok(function),
            other => Err(LowerError::KindMismatch {
                expected: SymbolKind::Function,
                found: other.symbol().kind(),
            }),
        }
    }

    pub(crate) fn property(&self, id: DeclId) -> LowerResult<&IrProperty> {
        match &self.arena[id] {
            IrDeclaration::Property(property) => Ok(property),
            other => Err(LowerError::KindMismatch {
                expected: SymbolKind::Property,
                found: other.symbol().kind(),
            }),
        }
    }

    pub(crate) fn file_id(&self) -> FileId {
        self.file_id
    }

    pub(crate) fn file_span(&self, span: Span) -> FileSpan {
        FileSpan::new(self.file_id, span)
    }

    fn name_of(&self, name: Name) -> String {
        self.interner.resolve(name).to_string()
    }

    fn check_cancelled(&self, file: &SourceFile) -> LowerResult<()> {
        if self.cancellation.is_some_and(CancellationFlag::is_cancelled) {
            warn!(file = %file.name, "lowering cancelled");
            return Err(LowerError::Cancelled {
                file: file.name.clone(),
            });
        }
        Ok(())
    }

    /// Start a fresh pass over the file `file_id`
    fn begin_file(&mut self, file_id: FileId) {
        self.file_id = file_id;
        self.scopes = ScopeStack::new();
        self.arena = Arena::new();
        self.symbols.take_bindings();
    }
}

/// Lower `file` with a fresh context
///
/// # Errors
///
/// Returns the first error met while lowering the file.
pub fn lower_source_file(
    interner: &Interner,
    packages: &dyn PackageFragmentProvider,
    allocator: Arc<SymbolAllocator>,
    file: &SourceFile,
) -> LowerResult<IrFile> {
    let mut ctx = LoweringContext::new(interner, packages, allocator);
    lower_file(&mut ctx, file)
}

/// Lower any source element
///
/// A file element starts a fresh pass; every other element attaches to the
/// current owner of the pass in progress.
///
/// # Errors
///
/// Returns [`LowerError::UnsupportedNode`] for classes and type aliases, and
/// otherwise the error of the routine for the element's kind.
pub fn lower_element(
    ctx: &mut LoweringContext,
    element: SourceElement<'_>,
) -> LowerResult<IrElement> {
    match element {
        SourceElement::File(file) => {
            lower_file(ctx, file).map(|ir_file| IrElement::File(Box::new(ir_file)))
        }
        SourceElement::Property(property) => {
            lower_property(ctx, property).map(IrElement::Declaration)
        }
        SourceElement::Accessor(accessor) => {
            lower_accessor(ctx, accessor, None).map(IrElement::Declaration)
        }
        SourceElement::Function(function) => {
            lower_function(ctx, function).map(IrElement::Declaration)
        }
        // A parameter outside any parameter list is the first of its own
        SourceElement::ValueParameter(parameter) => {
            lower_value_parameter(ctx, parameter, 0).map(IrElement::Declaration)
        }
        SourceElement::AnnotationCall(call) => {
            lower_annotation_call(ctx, call).map(IrElement::Annotation)
        }
        SourceElement::Expression(expression) => {
            lower_expression(ctx, expression).map(IrElement::Expression)
        }
        SourceElement::Class(_) | SourceElement::TypeAlias(_) => {
            Err(LowerError::UnsupportedNode {
                kind: element.kind(),
                span: ctx.file_span(element.span()),
            })
        }
    }
}

/// Lower a whole file
///
/// On failure nothing built for the file survives: the arena and the
/// bindings of the pass are dropped before the error is returned.
///
/// # Errors
///
/// Returns [`LowerError::MissingPackageFragment`] when the module has no
/// fragment for the file's package, [`LowerError::Cancelled`] when the pass
/// is cancelled, or the first error of a declaration or annotation.
pub fn lower_file(ctx: &mut LoweringContext, file: &SourceFile) -> LowerResult<IrFile> {
    debug!(
        file = %file.name,
        declarations = file.declarations.len(),
        "lowering file"
    );
    ctx.begin_file(file.file_id);
    let outcome = build_file(ctx, file);
    let arena = mem::take(&mut ctx.arena);
    let bindings = ctx.symbols.take_bindings();
    let mut ir_file = outcome?;
    debug!(
        file = %file.name,
        ir_declarations = arena.len(),
        "file lowered"
    );
    ir_file.arena = arena;
    ir_file.bindings = bindings;
    Ok(ir_file)
}

fn build_file(ctx: &mut LoweringContext, file: &SourceFile) -> LowerResult<IrFile> {
    ctx.check_cancelled(file)?;
    let package_fragment =
        ctx.packages
            .package_fragment_for(file)
            .ok_or_else(|| LowerError::MissingPackageFragment {
                package: if file.package_fq_name.is_root() {
                    "<root>".to_string()
                } else {
                    file.package_fq_name.render(ctx.interner)
                },
                file: file.name.clone(),
            })?;
    let symbol = ctx.issue_symbol(SymbolKind::File);

    let mut declarations = Vec::with_capacity(file.declarations.len());
    let mut annotations = Vec::with_capacity(file.annotations.len());
    ctx.with_scope(IrParent::File(symbol), |scoped| {
        for declaration in &file.declarations {
            scoped.check_cancelled(file)?;
            declarations.push(lower_declaration(scoped, declaration)?);
        }
        annotations.extend(lower_annotations(scoped, &file.annotations)?);
        Ok(())
    })?;

    Ok(IrFile {
        symbol,
        file_id: file.file_id,
        name: file.name.clone(),
        fq_name: file.package_fq_name.clone(),
        package_fragment,
        declarations,
        annotations,
        arena: Arena::new(),
        bindings: FxHashMap::default(),
        span: ctx.file_span(file.span),
    })
}

/// Lower a declaration nested directly in the current owner
///
/// # Errors
///
/// Returns [`LowerError::UnsupportedNode`] for classes and type aliases, and
/// otherwise the error of the property or function routine.
pub fn lower_declaration(
    ctx: &mut LoweringContext,
    declaration: &SourceDeclaration,
) -> LowerResult<DeclId> {
    trace!(name = ctx.interner.resolve(declaration.name()), "lowering declaration");
    match declaration {
        SourceDeclaration::Property(property) => lower_property(ctx, property),
        SourceDeclaration::Function(function) => lower_function(ctx, function),
        SourceDeclaration::Class(class) => Err(LowerError::UnsupportedNode {
            kind: NodeKind::Class,
            span: ctx.file_span(class.span),
        }),
        SourceDeclaration::TypeAlias(alias) => Err(LowerError::UnsupportedNode {
            kind: NodeKind::TypeAlias,
            span: ctx.file_span(alias.span),
        }),
    }
}

/// Lower a property together with its backing field and written accessors
///
/// # Errors
///
/// Returns [`LowerError::MissingModality`] when the property has no modality,
/// [`LowerError::EmptyScope`] without an owner, or the first error of its
/// type, field, accessors or annotations.
pub fn lower_property(
    ctx: &mut LoweringContext,
    property: &SourceProperty,
) -> LowerResult<DeclId> {
    let parent = ctx.current_owner()?;
    let span = ctx.file_span(property.span);
    let modality = property
        .modality
        .ok_or_else(|| LowerError::MissingModality {
            name: ctx.name_of(property.name),
            span,
        })?;

    let property_id = ctx.declare(SymbolKind::Property, |symbol| {
        IrDeclaration::Property(IrProperty {
            symbol,
            parent,
            origin: DeclarationOrigin::Defined,
            name: property.name,
            visibility: property.visibility,
            modality,
            is_var: property.is_var,
            is_const: property.is_const,
            is_lateinit: property.is_lateinit,
            is_delegated: property.delegate.is_some(),
            is_external: property.is_external,
            backing_field: None,
            getter: None,
            setter: None,
            annotations: Vec::new(),
            span,
        })
    })?;

    if property.initializer.is_some() {
        let field = synth::backing_field(ctx, property, property_id, parent)?;
        ctx.property_mut(property_id)?.backing_field = Some(field);
    }

    if !property.getter.is_default {
        let getter = lower_accessor(ctx, &property.getter, Some(property_id))?;
        ctx.property_mut(property_id)?.getter = Some(getter);
    }

    if let Some(setter) = property.setter.as_ref().filter(|setter| !setter.is_default) {
        let setter = lower_accessor(ctx, setter, Some(property_id))?;
        ctx.property_mut(property_id)?.setter = Some(setter);
    }

    let annotations = lower_annotations(ctx, &property.annotations)?;
    ctx.property_mut(property_id)?.annotations = annotations;
    Ok(property_id)
}

/// Lower a user-written getter or setter
///
/// `property` is the already lowered property the accessor belongs to; the
/// accessor inherits its external flag and points back to it.
///
/// # Errors
///
/// Returns [`LowerError::MissingModality`] when the accessor has no modality,
/// [`LowerError::EmptyScope`] without an owner, or a type or parameter error.
pub fn lower_accessor(
    ctx: &mut LoweringContext,
    accessor: &SourceAccessor,
    property: Option<DeclId>,
) -> LowerResult<DeclId> {
    let property_name = ctx.name_of(accessor.property_name);
    let span = ctx.file_span(accessor.span);
    let modality = accessor
        .modality
        .ok_or_else(|| LowerError::MissingModality {
            name: format!("<{}-{property_name}>", accessor.kind),
            span,
        })?;
    let is_external = match property {
        Some(id) => ctx.property(id)?.is_external,
        None => false,
    };
    let header = FunctionHeader {
        name: ctx
            .interner
            .intern(&format!("<{}-{property_name}>", accessor.kind)),
        visibility: accessor.visibility,
        modality,
        return_type: translate_type_ref(&accessor.return_type, &property_name, ctx.file_id())?,
        is_external,
        is_inline: false,
        corresponding_property: property,
        span,
    };
    build_function(ctx, header, &accessor.value_parameters, &accessor.annotations)
}

/// Lower a function declaration
///
/// # Errors
///
/// Returns [`LowerError::MissingModality`] when the function has no modality,
/// [`LowerError::EmptyScope`] without an owner, or a type or parameter error.
pub fn lower_function(
    ctx: &mut LoweringContext,
    function: &SourceFunction,
) -> LowerResult<DeclId> {
    let name = ctx.name_of(function.name);
    let span = ctx.file_span(function.span);
    let modality = function
        .modality
        .ok_or_else(|| LowerError::MissingModality {
            name: name.clone(),
            span,
        })?;
    let header = FunctionHeader {
        name: function.name,
        visibility: function.visibility,
        modality,
        return_type: translate_type_ref(&function.return_type, &name, ctx.file_id())?,
        is_external: function.is_external,
        is_inline: function.is_inline,
        corresponding_property: None,
        span,
    };
    build_function(ctx, header, &function.value_parameters, &function.annotations)
}

fn build_function(
    ctx: &mut LoweringContext,
    header: FunctionHeader,
    parameters: &[SourceValueParameter],
    annotations: &[SourceAnnotationCall],
) -> LowerResult<DeclId> {
    let parent = ctx.current_owner()?;
    let function_id = ctx.declare(SymbolKind::Function, |symbol| {
        IrDeclaration::Function(IrFunction {
            symbol,
            parent,
            origin: DeclarationOrigin::Defined,
            name: header.name,
            visibility: header.visibility,
            modality: header.modality,
            return_type: header.return_type,
            value_parameters: Vec::with_capacity(parameters.len()),
            is_external: header.is_external,
            is_inline: header.is_inline,
            corresponding_property: header.corresponding_property,
            annotations: Vec::new(),
            span: header.span,
        })
    })?;

    ctx.with_scope(IrParent::Declaration(function_id), |scoped| {
        for (index, parameter) in parameters.iter().enumerate() {
            let index = parameter_index(scoped, header.name, index)?;
            let parameter = lower_value_parameter(scoped, parameter, index)?;
            scoped.function_mut(function_id)?.value_parameters.push(parameter);
        }
        Ok(())
    })?;

    let annotations = lower_annotations(ctx, annotations)?;
    ctx.function_mut(function_id)?.annotations = annotations;
    Ok(function_id)
}

/// Position of a parameter as stored in the IR
fn parameter_index(ctx: &LoweringContext, function: Name, index: usize) -> LowerResult<u32> {
    u32::try_from(index).map_err(|_| LowerError::TooManyParameters {
        function: ctx.name_of(function),
        count: index.saturating_add(1),
    })
}

/// Lower the `index`th value parameter of the current owner
///
/// # Errors
///
/// Returns [`LowerError::EmptyScope`] without an owner, or a type or
/// annotation error.
pub fn lower_value_parameter(
    ctx: &mut LoweringContext,
    parameter: &SourceValueParameter,
    index: u32,
) -> LowerResult<DeclId> {
    let parent = ctx.current_owner()?;
    let name = ctx.name_of(parameter.name);
    let ty = translate_type_ref(&parameter.return_type, &name, ctx.file_id())?;
    let annotations = lower_annotations(ctx, &parameter.annotations)?;
    let span = ctx.file_span(parameter.span);
    ctx.declare(SymbolKind::ValueParameter, |symbol| {
        IrDeclaration::ValueParameter(IrValueParameter {
            symbol,
            parent,
            name: parameter.name,
            index,
            ty,
            has_default_value: parameter.has_default_value,
            is_vararg: parameter.is_vararg,
            annotations,
            span,
        })
    })
}

fn lower_annotations(
    ctx: &mut LoweringContext,
    calls: &[SourceAnnotationCall],
) -> LowerResult<Vec<IrCall>> {
    calls
        .iter()
        .map(|call| lower_annotation_call(ctx, call))
        .collect()
}

/// Lower an annotation usage to a call of the annotation's constructor
///
/// # Errors
///
/// Returns [`LowerError::UnresolvedType`] when the annotation type is not a
/// class, or the error of an argument.
pub fn lower_annotation_call(
    ctx: &mut LoweringContext,
    call: &SourceAnnotationCall,
) -> LowerResult<IrCall> {
    let span = ctx.file_span(call.span);
    let ty = translate_type_ref(&call.annotation_type, "annotation", ctx.file_id())?;
    let IrClassifier::Class(callee) = &ty.classifier else {
        return Err(LowerError::UnresolvedType {
            name: "annotation".to_string(),
            reason: "annotation type is not a class".to_string(),
            span,
        });
    };
    let callee = callee.clone();
    let arguments = call
        .arguments
        .iter()
        .map(|argument| lower_expression(ctx, argument))
        .collect::<LowerResult<Vec<_>>>()?;
    Ok(IrCall {
        callee,
        ty,
        arguments,
        span,
    })
}

/// Lower an expression appearing in a declaration header
///
/// # Errors
///
/// Returns [`LowerError::UnsupportedNode`] for accesses, calls and lambdas.
pub fn lower_expression(
    ctx: &mut LoweringContext,
    expression: &SourceExpression,
) -> LowerResult<IrExpression> {
    match expression {
        SourceExpression::Const { value, span } => Ok(IrExpression::Const(IrConst {
            value: value.clone(),
            span: ctx.file_span(*span),
        })),
        SourceExpression::ArrayOf { elements, span } => {
            let elements = elements
                .iter()
                .map(|element| lower_expression(ctx, element))
                .collect::<LowerResult<Vec<_>>>()?;
            Ok(IrExpression::Vararg {
                elements,
                span: ctx.file_span(*span),
            })
        }
        SourceExpression::QualifiedAccess { span, .. }
        | SourceExpression::FunctionCall { span, .. }
        | SourceExpression::Lambda { span } => Err(LowerError::UnsupportedNode {
            kind: expression.kind(),
            span: ctx.file_span(*span),
        }),
    }
}
