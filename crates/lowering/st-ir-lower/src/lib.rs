//! Source tree → IR lowering
//!
//! This crate handles:
//! - Symbol issuance and binding for every generated declaration
//! - The owner (scope) stack that links new IR nodes to their parent
//! - Dispatch from each source node kind to its construction routine
//! - Synthesis of declarations implied by the source (backing fields)
//! - Lowering whole modules, one independent pass per file

pub mod config;
pub mod driver;
pub mod error;
pub mod lower;
pub mod package;
pub mod scope;
pub mod symbols;
pub mod synth;
pub mod types;

pub use config::LoweringConfig;
pub use driver::{CancellationFlag, ModuleLowering, lower_module};
pub use error::{LowerError, LowerResult};
pub use lower::{IrElement, LoweringContext, lower_element, lower_file, lower_source_file};
pub use package::{ModuleDescriptor, PackageFragmentProvider};
pub use scope::ScopeStack;
pub use symbols::{SymbolAllocator, SymbolTable};
