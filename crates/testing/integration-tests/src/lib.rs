//! Integration test utilities for the lowering pipeline

use st_descriptors::ConstantValue;
use st_intern::Interner;
use st_ir::IrFile;
use st_ir::dump::render_file;
use st_ir_lower::{LowerResult, ModuleDescriptor, SymbolAllocator, lower_source_file};
use st_span::{FileId, Span};
use st_tree::build::{FileBuilder, PropertyBuilder, class_type, constant};
use st_tree::{ConeType, SourceFile};
use std::sync::Arc;

/// Test fixture helper
///
/// Holds the interner every tree of a test is built with and the symbol
/// allocator every pass of the test draws from.
pub struct TestFixture {
    /// Shared interner
    pub interner: Interner,
    /// Shared symbol allocator
    pub allocator: Arc<SymbolAllocator>,
}

impl TestFixture {
    /// Creates a new test fixture
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            allocator: Arc::new(SymbolAllocator::new()),
        }
    }

    /// `kotlin.Int`
    pub fn int(&self) -> ConeType {
        class_type(&self.interner, "kotlin.Int")
    }

    /// `kotlin.String`
    pub fn string(&self) -> ConeType {
        class_type(&self.interner, "kotlin.String")
    }

    /// Starts a file in package `demo`
    pub fn file(&self, index: u32, name: &str) -> FileBuilder {
        FileBuilder::new(&self.interner, FileId(index), name, "demo")
    }

    /// Module with a fragment for every package of `files`
    pub fn module<'files>(&self, files: impl IntoIterator<Item = &'files SourceFile>) -> ModuleDescriptor {
        ModuleDescriptor::from_files(self.interner.intern("main"), files)
    }

    /// Lowers `file` in a module made of that file alone
    ///
    /// # Errors
    ///
    /// Returns the lowering error of the file
    pub fn lower(&self, file: &SourceFile) -> LowerResult<IrFile> {
        let module = self.module([file]);
        lower_source_file(&self.interner, &module, Arc::clone(&self.allocator), file)
    }

    /// Textual dump of `file`
    pub fn dump(&self, file: &IrFile) -> String {
        render_file(file, &self.interner)
    }

    /// `val x: Int = 5` alone in `a.kt`
    pub fn scenario_a(&self) -> SourceFile {
        let property = PropertyBuilder::val(&self.interner, "x", self.int())
            .initializer(constant(ConstantValue::Int(5), Span::new(13, 14)))
            .span(Span::new(0, 14))
            .build();
        self.file(0, "a.kt").property(property).build()
    }

    /// `var y: String` with a written getter, alone in `b.kt`
    pub fn scenario_b(&self) -> SourceFile {
        let property = PropertyBuilder::var(&self.interner, "y", self.string())
            .custom_getter(Span::new(18, 37))
            .span(Span::new(0, 37))
            .build();
        self.file(1, "b.kt").property(property).build()
    }

    /// A file exercising every node kind the lowering supports
    pub fn numbered_file(&self, index: u32) -> SourceFile {
        let start = index * 100;
        let counter = PropertyBuilder::var(&self.interner, "counter", self.int())
            .initializer(constant(ConstantValue::Int(0), Span::new(start + 20, start + 21)))
            .custom_setter(Span::new(start + 22, start + 60))
            .span(Span::new(start, start + 60))
            .build();
        let label = PropertyBuilder::val(&self.interner, "label", self.string())
            .custom_getter(Span::new(start + 80, start + 99))
            .span(Span::new(start + 61, start + 99))
            .build();
        self.file(index, &format!("file{index}.kt"))
            .property(counter)
            .property(label)
            .build()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
