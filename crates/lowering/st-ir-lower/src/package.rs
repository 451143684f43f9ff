//! Package fragment lookup
//!
//! Every IR file is anchored to the package fragment that the module
//! contributes for the file's package. Resolving packages is not this
//! stage's job; the fragments are supplied by the caller.

use indexmap::IndexMap;
use st_descriptors::{FqName, PackageFragmentDescriptor};
use st_intern::Name;
use st_tree::SourceFile;

/// Supplies the package fragment a source file belongs to
pub trait PackageFragmentProvider {
    /// Fragment for `file`'s package, if the module has one
    fn package_fragment_for(&self, file: &SourceFile) -> Option<PackageFragmentDescriptor>;
}

/// Package fragments contributed by one module
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Module name
    pub name: Name,
    packages: IndexMap<FqName, Vec<PackageFragmentDescriptor>>,
}

impl ModuleDescriptor {
    /// Module without any fragments
    pub fn new(name: Name) -> Self {
        Self {
            name,
            packages: IndexMap::new(),
        }
    }

    /// Register a fragment for `fq_name`, returning it
    pub fn add_fragment(&mut self, fq_name: FqName) -> PackageFragmentDescriptor {
        let fragments = self.packages.entry(fq_name.clone()).or_default();
        let fragment = PackageFragmentDescriptor {
            module: self.name,
            fq_name,
            index: fragments.len() as u32,
        };
        fragments.push(fragment.clone());
        fragment
    }

    /// Fragments registered for `fq_name`, in registration order
    pub fn fragments(&self, fq_name: &FqName) -> &[PackageFragmentDescriptor] {
        self.packages
            .get(fq_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Packages with at least one fragment, in registration order
    pub fn packages(&self) -> impl Iterator<Item = &FqName> {
        self.packages.keys()
    }

    /// Module with one fragment for every package declared by `files`
    pub fn from_files<'files>(
        name: Name,
        files: impl IntoIterator<Item = &'files SourceFile>,
    ) -> Self {
        let mut module = Self::new(name);
        for file in files {
            if !module.packages.contains_key(&file.package_fq_name) {
                module.add_fragment(file.package_fq_name.clone());
            }
        }
        module
    }
}

impl PackageFragmentProvider for ModuleDescriptor {
    fn package_fragment_for(&self, file: &SourceFile) -> Option<PackageFragmentDescriptor> {
        self.fragments(&file.package_fq_name).first().cloned()
    }
}
