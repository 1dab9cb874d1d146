//! C# Emitter
//!
//! Serializes a `CodeDocument` into C# source text. Members are grouped the way
//! a code-DOM writer groups them: fields, snippets, constructors, properties,
//! then methods.

use super::document::{
    csharp_string_literal, CodeAttribute, CodeClass, CodeConstructor, CodeDocument, CodeField,
    CodeMethod, CodeProperty, LinePragma, Member, Parameter, Statement, HELPER_RESULT_TYPE,
};
use super::text_buffer::TextBuffer;

const INDENT_WITH: &str = "    ";

/// Writes C# source for a document.
pub struct CSharpEmitter<'a> {
    runtime_version: &'a str,
    out: TextBuffer,
}

impl<'a> CSharpEmitter<'a> {
    /// `runtime_version` is recorded in the auto-generated header.
    pub fn new(runtime_version: &'a str) -> Self {
        Self {
            runtime_version,
            out: TextBuffer::new(),
        }
    }

    pub fn emit(mut self, document: &CodeDocument) -> String {
        self.emit_header();

        self.out.write_line(&format!("namespace {}", document.namespace));
        self.out.write_line("{");
        self.out.push_indent(INDENT_WITH);

        for import in &document.imports {
            self.out.write_line(&format!("using {};", import));
        }
        if !document.imports.is_empty() {
            self.blank_line();
        }

        for (i, class) in document.types().enumerate() {
            if i > 0 {
                self.blank_line();
            }
            self.emit_class(class, i == 0);
        }

        self.out.pop_indent();
        self.out.write_line("}");
        self.out.into_string()
    }

    fn emit_header(&mut self) {
        let rule = format!("//{}", "-".repeat(78));
        self.out.write_line(&rule);
        self.out.write_line("// <auto-generated>");
        self.out.write_line("//     This code was generated by a tool.");
        self.out
            .write_line(&format!("//     Runtime Version:{}", self.runtime_version));
        self.out.write_line("//");
        self.out.write_line(
            "//     Changes to this file may cause incorrect behavior and will be lost if",
        );
        self.out.write_line("//     the code is regenerated.");
        self.out.write_line("// </auto-generated>");
        self.out.write_line(&rule);
        self.blank_line();
    }

    fn blank_line(&mut self) {
        self.out.write_line_unindented("");
    }

    fn emit_class(&mut self, class: &CodeClass, primary: bool) {
        if let Some(region) = &class.region {
            self.out.write_line(&format!("#region {}", region));
        }
        for attribute in &class.attributes {
            self.emit_attribute(attribute);
        }

        let mut declaration = String::from(class.visibility.keyword());
        if class.is_partial {
            declaration.push_str(" partial");
        }
        declaration.push_str(" class ");
        declaration.push_str(&class.name);
        if let Some(base) = &class.base_type {
            declaration.push_str(" : ");
            declaration.push_str(&base.to_string());
        }
        self.out.write_line(&declaration);
        self.out.write_line("{");
        self.out.push_indent(INDENT_WITH);

        if primary {
            self.out.write_line_unindented("#line hidden");
        }

        let mut first = true;
        let mut separate = |emitter: &mut Self| {
            if !first {
                emitter.blank_line();
            }
            first = false;
        };

        for member in &class.members {
            if let Member::Field(field) = member {
                separate(self);
                self.emit_field(field);
            }
        }
        for member in &class.members {
            if let Member::Snippet(code) = member {
                separate(self);
                self.emit_snippet(code);
            }
        }
        for member in &class.members {
            if let Member::Constructor(ctor) = member {
                separate(self);
                self.emit_constructor(&class.name, ctor);
            }
        }
        for member in &class.members {
            if let Member::Property(property) = member {
                separate(self);
                self.emit_property(property);
            }
        }
        for member in &class.members {
            if let Member::Method(method) = member {
                separate(self);
                self.emit_method(method);
            }
        }

        self.out.pop_indent();
        self.out.write_line("}");
        if class.region.is_some() {
            self.out.write_line("#endregion");
        }
    }

    fn emit_attribute(&mut self, attribute: &CodeAttribute) {
        self.out.write_line(&format!(
            "[{}({})]",
            attribute.name,
            attribute.arguments.join(", ")
        ));
    }

    fn emit_field(&mut self, field: &CodeField) {
        let mut line = modifiers_prefix(field.modifiers.keywords());
        line.push_str(&field.type_name);
        line.push(' ');
        line.push_str(&field.name);
        if let Some(init) = &field.initializer {
            line.push_str(" = ");
            line.push_str(init);
        }
        line.push(';');
        self.out.write_line(&line);
    }

    fn emit_snippet(&mut self, code: &str) {
        for line in code.trim_matches('\n').lines() {
            self.out.write_line_unindented(line.trim_end());
        }
    }

    fn emit_constructor(&mut self, class_name: &str, ctor: &CodeConstructor) {
        let prefix = modifiers_prefix(ctor.modifiers.keywords());
        self.out.write_line(&format!("{}{}()", prefix, class_name));
        self.emit_body(&ctor.body);
    }

    fn emit_property(&mut self, property: &CodeProperty) {
        let prefix = modifiers_prefix(property.modifiers.keywords());
        self.out
            .write_line(&format!("{}{} {}", prefix, property.type_name, property.name));
        self.out.write_line("{");
        self.out.push_indent(INDENT_WITH);
        if let Some(getter) = &property.getter {
            self.out.write_line("get");
            self.emit_body(getter);
        }
        if let Some(setter) = &property.setter {
            self.out.write_line("set");
            self.emit_body(setter);
        }
        self.out.pop_indent();
        self.out.write_line("}");
    }

    fn emit_method(&mut self, method: &CodeMethod) {
        let prefix = modifiers_prefix(method.modifiers.keywords());
        let return_type = method.return_type.as_deref().unwrap_or("void");
        let parameters: Vec<String> = method.parameters.iter().map(render_parameter).collect();
        self.out.write_line(&format!(
            "{}{} {}({})",
            prefix,
            return_type,
            method.name,
            parameters.join(", ")
        ));
        self.emit_body(&method.body);
    }

    fn emit_body(&mut self, body: &[Statement]) {
        self.out.write_line("{");
        self.out.push_indent(INDENT_WITH);
        for statement in body {
            self.emit_statement(statement);
        }
        self.out.pop_indent();
        self.out.write_line("}");
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::WriteLiteral(text) => {
                self.out
                    .write_line(&format!("WriteLiteral({});", csharp_string_literal(text)));
            }
            Statement::Write { expression, pragma } => {
                self.with_pragma(pragma.as_ref(), |out| {
                    out.write_line(&format!("Write({});", expression));
                });
            }
            Statement::Code { code, pragma } => {
                self.with_pragma(pragma.as_ref(), |out| {
                    for line in code.trim_matches('\n').lines() {
                        let line = line.trim();
                        if !line.is_empty() {
                            out.write_line(line);
                        }
                    }
                });
            }
            Statement::WriteLiteralTo { writer, text } => {
                self.out.write_line(&format!(
                    "WriteLiteralTo({}, {});",
                    writer,
                    csharp_string_literal(text)
                ));
            }
            Statement::WriteTo {
                writer,
                expression,
                pragma,
            } => {
                self.with_pragma(pragma.as_ref(), |out| {
                    out.write_line(&format!("WriteTo({}, {});", writer, expression));
                });
            }
            Statement::HelperResult { writer, body } => {
                self.out
                    .write_line(&format!("return new {}({} =>", HELPER_RESULT_TYPE, writer));
                self.out.write_line("{");
                self.out.push_indent(INDENT_WITH);
                for statement in body {
                    self.emit_statement(statement);
                }
                self.out.pop_indent();
                self.out.write_line("});");
            }
            Statement::Return(expression) => {
                self.out.write_line(&format!("return {};", expression));
            }
            Statement::Snippet(code) => {
                self.out.write_literal(code.trim_matches('\n'));
                self.out.write_line("");
            }
        }
    }

    fn with_pragma(&mut self, pragma: Option<&LinePragma>, body: impl FnOnce(&mut TextBuffer)) {
        match pragma {
            Some(pragma) => {
                self.blank_line();
                self.out.write_line_unindented(&format!(
                    "#line {} {}",
                    pragma.line,
                    csharp_string_literal(&pragma.file)
                ));
                body(&mut self.out);
                self.blank_line();
                self.out.write_line_unindented("#line default");
                self.out.write_line_unindented("#line hidden");
            }
            None => body(&mut self.out),
        }
    }
}

fn modifiers_prefix(keywords: Vec<&'static str>) -> String {
    let mut prefix = keywords.join(" ");
    if !prefix.is_empty() {
        prefix.push(' ');
    }
    prefix
}

fn render_parameter(parameter: &Parameter) -> String {
    match &parameter.default {
        Some(default) => format!("{} {} = {}", parameter.type_name, parameter.name, default),
        None => format!("{} {}", parameter.type_name, parameter.name),
    }
}
