//! Deterministic textual dump of an IR file
//!
//! One node per line, two spaces of indentation per nesting level. Symbols
//! are left out so that dumps of independent lowering passes compare equal.

use crate::{DeclId, IrCall, IrDeclaration, IrExpression, IrFile};
use st_intern::Interner;

/// Render `file` as an indented tree
pub fn render_file(file: &IrFile, interner: &Interner) -> String {
    let mut printer = Printer {
        file,
        interner,
        out: String::new(),
    };
    printer.file();
    printer.out
}

struct Printer<'ir> {
    file: &'ir IrFile,
    interner: &'ir Interner,
    out: String,
}

impl Printer<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn file(&mut self) {
        let file = self.file;
        let fq_name = if file.fq_name.is_root() {
            "<root>".to_string()
        } else {
            file.fq_name.render(self.interner)
        };
        let header = format!("FILE fqName:{fq_name} fileName:{}", file.name);
        self.line(0, &header);
        for call in &file.annotations {
            self.annotation(1, call);
        }
        for &id in &file.declarations {
            self.declaration(1, id);
        }
    }

    fn declaration(&mut self, depth: usize, id: DeclId) {
        let interner = self.interner;
        let file = self.file;
        match file.declaration(id) {
            IrDeclaration::Property(property) => {
                let mut flags = vec![if property.is_var { "var" } else { "val" }];
                flags.extend(property.is_const.then_some("const"));
                flags.extend(property.is_lateinit.then_some("lateinit"));
                flags.extend(property.is_delegated.then_some("delegated"));
                flags.extend(property.is_external.then_some("external"));
                let text = format!(
                    "PROPERTY name:{} visibility:{} modality:{}{}",
                    interner.resolve(property.name),
                    property.visibility,
                    property.modality,
                    flag_list(&flags),
                );
                self.line(depth, &text);
                for call in &property.annotations {
                    self.annotation(depth + 1, call);
                }
                let slots = [property.backing_field, property.getter, property.setter];
                for child in slots.into_iter().flatten() {
                    self.declaration(depth + 1, child);
                }
            }
            IrDeclaration::Field(field) => {
                let mut flags = Vec::new();
                flags.extend(field.is_final.then_some("final"));
                flags.extend(field.is_external.then_some("external"));
                flags.extend(field.is_static.then_some("static"));
                let text = format!(
                    "FIELD {} name:{} type:{} visibility:{}{}",
                    field.origin,
                    interner.resolve(field.name),
                    field.ty.render(interner),
                    field.visibility,
                    flag_list(&flags),
                );
                self.line(depth, &text);
                for call in &field.annotations {
                    self.annotation(depth + 1, call);
                }
            }
            IrDeclaration::Function(function) => {
                let mut flags = Vec::new();
                flags.extend(function.is_external.then_some("external"));
                flags.extend(function.is_inline.then_some("inline"));
                let text = format!(
                    "FUN name:{} visibility:{} modality:{} returnType:{}{}",
                    interner.resolve(function.name),
                    function.visibility,
                    function.modality,
                    function.return_type.render(interner),
                    flag_list(&flags),
                );
                self.line(depth, &text);
                for call in &function.annotations {
                    self.annotation(depth + 1, call);
                }
                for &parameter in &function.value_parameters {
                    self.declaration(depth + 1, parameter);
                }
            }
            IrDeclaration::ValueParameter(parameter) => {
                let mut flags = Vec::new();
                flags.extend(parameter.is_vararg.then_some("vararg"));
                flags.extend(parameter.has_default_value.then_some("default"));
                let text = format!(
                    "VALUE_PARAMETER name:{} index:{} type:{}{}",
                    interner.resolve(parameter.name),
                    parameter.index,
                    parameter.ty.render(interner),
                    flag_list(&flags),
                );
                self.line(depth, &text);
                for call in &parameter.annotations {
                    self.annotation(depth + 1, call);
                }
            }
        }
    }

    fn annotation(&mut self, depth: usize, call: &IrCall) {
        let text = format!("ANNOTATION {}", call.callee.render(self.interner));
        self.line(depth, &text);
        for argument in &call.arguments {
            self.expression(depth + 1, argument);
        }
    }

    fn expression(&mut self, depth: usize, expression: &IrExpression) {
        match expression {
            IrExpression::Const(constant) => {
                let text = format!(
                    "CONST {} value={}",
                    constant.value.kind_name(),
                    constant.value
                );
                self.line(depth, &text);
            }
            IrExpression::Vararg { elements, .. } => {
                self.line(depth, "VARARG");
                for element in elements {
                    self.expression(depth + 1, element);
                }
            }
        }
    }
}

fn flag_list(flags: &[&str]) -> String {
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(","))
    }
}
