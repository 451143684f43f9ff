//! IR types

use st_descriptors::{FqName, Variance};
use st_intern::{Interner, Name};

/// What an [`IrType`] refers to
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum IrClassifier {
    /// A class, by fully-qualified name
    Class(FqName),
    /// A type parameter, by name
    TypeParameter(Name),
}

/// One type argument of an [`IrType`]
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum IrTypeArgument {
    /// `*`
    Star,
    /// Concrete argument
    Projection {
        /// Use-site variance
        variance: Variance,
        /// Argument type
        ty: IrType,
    },
}

/// A simple (classifier based) IR type
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct IrType {
    /// Referenced classifier
    pub classifier: IrClassifier,
    /// Type arguments in declaration order
    pub arguments: Vec<IrTypeArgument>,
    /// Whether `null` inhabits the type
    pub nullable: bool,
}

impl IrType {
    /// Non-nullable class type without arguments
    pub fn class(fq_name: FqName) -> Self {
        Self {
            classifier: IrClassifier::Class(fq_name),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// Render as `kotlin.collections.List<out kotlin.String>?`
    pub fn render(&self, interner: &Interner) -> String {
        let mut out = String::new();
        self.render_into(interner, &mut out);
        out
    }

    fn render_into(&self, interner: &Interner, out: &mut String) {
        match &self.classifier {
            IrClassifier::Class(fq_name) => out.push_str(&fq_name.render(interner)),
            IrClassifier::TypeParameter(name) => out.push_str(interner.resolve(*name)),
        }
        if !self.arguments.is_empty() {
            out.push('<');
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                match argument {
                    IrTypeArgument::Star => out.push('*'),
                    IrTypeArgument::Projection { variance, ty } => {
                        if *variance != Variance::Invariant {
                            out.push_str(&variance.to_string());
                            out.push(' ');
                        }
                        ty.render_into(interner, out);
                    }
                }
            }
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
    }
}
