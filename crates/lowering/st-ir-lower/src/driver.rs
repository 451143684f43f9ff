//! Module-level lowering
//!
//! Each file gets its own pass with its own scope stack. All passes of a
//! module share one [`SymbolAllocator`], so symbols are unique across the
//! whole module even when files are lowered in parallel.

use crate::config::LoweringConfig;
use crate::error::{LowerError, LowerResult};
use crate::lower::{LoweringContext, lower_file};
use crate::package::PackageFragmentProvider;
use crate::symbols::SymbolAllocator;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use st_intern::Interner;
use st_ir::IrFile;
use st_ir::verify::verify_file;
use st_tree::SourceFile;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Shared flag that aborts lowering of every file not yet finished
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lowers the files of one module
pub struct ModuleLowering<'int> {
    interner: &'int Interner,
    allocator: Arc<SymbolAllocator>,
    config: LoweringConfig,
    cancellation: CancellationFlag,
}

impl<'int> ModuleLowering<'int> {
    /// Create a driver with a fresh symbol allocator
    pub fn new(interner: &'int Interner, config: LoweringConfig) -> Self {
        Self {
            interner,
            allocator: Arc::new(SymbolAllocator::new()),
            config,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Issue symbols from `allocator` instead of a private one
    #[must_use]
    pub fn with_allocator(mut self, allocator: Arc<SymbolAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Handle that cancels this driver's work
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Symbol allocator shared by all passes
    pub fn allocator(&self) -> &Arc<SymbolAllocator> {
        &self.allocator
    }

    /// Active configuration
    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    /// Lower every file, returning one result per file in input order
    ///
    /// A failing file never affects the others. The outer error only
    /// reports that the worker pool could not be started.
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::ThreadPool`] when the worker pool cannot be built.
    pub fn lower<P>(
        &self,
        files: &[SourceFile],
        packages: &P,
    ) -> LowerResult<Vec<LowerResult<IrFile>>>
    where
        P: PackageFragmentProvider + Sync,
    {
        info!(
            files = files.len(),
            parallel = self.config.parallel,
            "lowering module"
        );

        let results: Vec<LowerResult<IrFile>> = if self.config.parallel && files.len() > 1 {
            let mut builder = ThreadPoolBuilder::new();
            if let Some(threads) = self.config.threads {
                builder = builder.num_threads(threads);
            }
            let pool = builder.build()?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|file| self.lower_one(file, packages))
                    .collect()
            })
        } else {
            files.iter().map(|file| self.lower_one(file, packages)).collect()
        };

        let failed = results.iter().filter(|result| result.is_err()).count();
        info!(
            files = files.len(),
            failed,
            symbols = self.allocator.issued(),
            "module lowered"
        );
        Ok(results)
    }

    fn lower_one(
        &self,
        file: &SourceFile,
        packages: &dyn PackageFragmentProvider,
    ) -> LowerResult<IrFile> {
        let mut ctx = LoweringContext::new(self.interner, packages, Arc::clone(&self.allocator))
            .with_cancellation(&self.cancellation);
        let ir_file = lower_file(&mut ctx, file)?;
        if self.config.verify {
            verify_file(&ir_file).map_err(|errors| LowerError::Verification {
                file: ir_file.name.clone(),
                errors,
            })?;
        }
        Ok(ir_file)
    }
}

/// Lower `files` with a fresh driver configured by `config`
///
/// # Errors
///
/// Returns [`LowerError::ThreadPool`] when the worker pool cannot be built.
pub fn lower_module<P>(
    interner: &Interner,
    files: &[SourceFile],
    packages: &P,
    config: LoweringConfig,
) -> LowerResult<Vec<LowerResult<IrFile>>>
where
    P: PackageFragmentProvider + Sync,
{
    ModuleLowering::new(interner, config).lower(files, packages)
}
