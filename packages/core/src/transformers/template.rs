//! Template preset: turns a template into a self-contained text generator.
//!
//! The generated class becomes partial, loses its default constructor and
//! gains `TransformText()`. A companion `<Class>Base` type carries the text
//! accumulation runtime (`Write`, `WriteLiteral`, indent handling), so the
//! output compiles without any web framework.

use super::{
    AddGeneratedClassAttribute, AggregateTransformer, CodeTransformer,
    DirectivesBasedTransformers, GenerationContext, SetImports,
};
use crate::code::{
    CodeClass, CodeDocument, CodeField, CodeMethod, CodeProperty, Member, MemberModifiers,
    Parameter, Statement,
};
use crate::config::HostConfig;
use crate::directives::Directives;
use crate::error::TransformerError;

pub const TEMPLATE_IMPORTS: [&str; 4] = [
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Text",
];

const GENERATION_ENVIRONMENT: &str = "GenerationEnvironment";
const STRING_BUILDER: &str = "System.Text.StringBuilder";
const BASE_CLASS_REGION: &str = "Base class";

// Same algorithm as `TextBuffer::write_literal`.
const WRITE_LITERAL_BODY: &str = r#"if (string.IsNullOrEmpty(textToAppend))
{
    return;
}
// If we're starting off, or if the previous text ended with a newline,
// we have to append the current indent first.
if (((this.GenerationEnvironment.Length == 0)
            || this._endsWithNewline))
{
    this.GenerationEnvironment.Append(this._currentIndent);
    this._endsWithNewline = false;
}
// Check if the current text ends with a newline
if (textToAppend.EndsWith(global::System.Environment.NewLine, global::System.StringComparison.CurrentCulture))
{
    this._endsWithNewline = true;
}
// This is an optimization. If the current indent is "", then we don't have to do any
// of the more complex stuff further down.
if ((this._currentIndent.Length == 0))
{
    this.GenerationEnvironment.Append(textToAppend);
    return;
}
// Everywhere there is a newline in the text, add an indent after it
textToAppend = textToAppend.Replace(global::System.Environment.NewLine, (global::System.Environment.NewLine + this._currentIndent));
// If the text ends with a newline, then we should strip off the indent added at the very end
// because the appropriate indent will be added when the next time Write() is called
if (this._endsWithNewline)
{
    this.GenerationEnvironment.Append(textToAppend, 0, (textToAppend.Length - this._currentIndent.Length));
}
else
{
    this.GenerationEnvironment.Append(textToAppend);
}"#;

const WRITE_BODY: &str = r#"string stringValue;
if ((value == null))
{
    throw new global::System.ArgumentNullException("value");
}
System.Type t = value.GetType();
System.Reflection.MethodInfo method = t.GetMethod("ToString", new System.Type[] {
            typeof(System.IFormatProvider)});
if ((method == null))
{
    stringValue = value.ToString();
}
else
{
    stringValue = ((string)(method.Invoke(value, new object[] { System.Globalization.CultureInfo.InvariantCulture })));
}
WriteLiteral(stringValue);"#;

/// The generic "Template" preset.
pub struct TemplateCodeTransformer {
    inner: AggregateTransformer,
}

impl TemplateCodeTransformer {
    pub fn new() -> Self {
        Self {
            inner: AggregateTransformer::new(
                super::TEMPLATE_TRANSFORMER,
                vec![
                    Box::new(SetImports::new(TEMPLATE_IMPORTS, true)),
                    Box::new(AddGeneratedClassAttribute::new()),
                    Box::new(DirectivesBasedTransformers::new()),
                ],
            ),
        }
    }

    fn provide_transform_text_method(class: &mut CodeClass) {
        let mut method = CodeMethod::new("TransformText", MemberModifiers::PUBLIC);
        method.return_type = Some("string".to_string());
        method.body.push(Statement::Snippet("this.Execute();".to_string()));
        method.body.push(Statement::Return(format!(
            "this.{}.ToString()",
            GENERATION_ENVIRONMENT
        )));
        class.members.push(Member::Method(method));
    }

    /// Companion base class holding the text accumulation runtime.
    fn provide_base_type(generated_class_name: &str) -> CodeClass {
        let mut base = CodeClass::new(format!("{}Base", generated_class_name));
        base.region = Some(BASE_CLASS_REGION.to_string());

        base.members.push(Member::Method(CodeMethod::new(
            "Execute",
            MemberModifiers::PUBLIC | MemberModifiers::VIRTUAL,
        )));

        Self::provide_builder_property(
            &mut base,
            "_generatingEnvironment",
            GENERATION_ENVIRONMENT,
            MemberModifiers::PROTECTED,
        );
        Self::provide_builder_property(
            &mut base,
            "_currentIndent",
            "CurrentIndent",
            MemberModifiers::PUBLIC | MemberModifiers::VIRTUAL,
        );

        base.members.push(Member::Field(CodeField {
            name: "_endsWithNewline".to_string(),
            type_name: "bool".to_string(),
            modifiers: MemberModifiers::PRIVATE,
            initializer: None,
        }));

        let mut write_literal = CodeMethod::new("WriteLiteral", MemberModifiers::PUBLIC);
        write_literal
            .parameters
            .push(Parameter::new("string", "textToAppend"));
        write_literal
            .body
            .push(Statement::Snippet(WRITE_LITERAL_BODY.to_string()));
        base.members.push(Member::Method(write_literal));

        let mut write = CodeMethod::new("Write", MemberModifiers::PUBLIC);
        write.parameters.push(Parameter::new("object", "value"));
        write.body.push(Statement::Snippet(WRITE_BODY.to_string()));
        base.members.push(Member::Method(write));

        base
    }

    fn provide_builder_property(
        base: &mut CodeClass,
        field_name: &str,
        property_name: &str,
        modifiers: MemberModifiers,
    ) {
        base.members.push(Member::Field(CodeField {
            name: field_name.to_string(),
            type_name: STRING_BUILDER.to_string(),
            modifiers: MemberModifiers::PRIVATE,
            initializer: Some(format!("new {}()", STRING_BUILDER)),
        }));
        base.members.push(Member::Property(CodeProperty {
            name: property_name.to_string(),
            type_name: STRING_BUILDER.to_string(),
            modifiers,
            getter: Some(vec![Statement::Return(format!("this.{}", field_name))]),
            setter: Some(vec![Statement::Snippet(format!(
                "this.{} = value;",
                field_name
            ))]),
        }));
    }
}

impl Default for TemplateCodeTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTransformer for TemplateCodeTransformer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        directives: &Directives,
    ) -> Result<(), TransformerError> {
        self.inner.initialize(config, directives)?;
        config.default_base_class = format!("{}Base", config.default_class_name);
        Ok(())
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        self.inner.process_generated_code(context, document)?;

        let class = &mut document.class;
        class.is_partial = true;
        class.remove_constructors();
        Self::provide_transform_text_method(class);

        let base = Self::provide_base_type(&class.name);
        document.additional_types.push(base);
        Ok(())
    }

    fn process_output(&mut self, source: String) -> Result<String, TransformerError> {
        self.inner.process_output(source)
    }
}
