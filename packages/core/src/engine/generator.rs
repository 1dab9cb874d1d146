//! Code Generator
//!
//! Turns parsed markup into the initial `CodeDocument`: one class holding a
//! constructor and an `Execute()` override whose body writes the template.

use super::parser::{MarkupNode, MarkupParser, SourceLocation};
use super::{GeneratorResults, ParserError, TemplateSource};
use crate::code::{
    csharp_string_literal, CodeClass, CodeConstructor, CodeDocument, CodeMethod, LinePragma,
    Member, MemberModifiers, Parameter, Statement, TypeReference, HELPER_RESULT_TYPE,
};
use crate::config::{
    file_stem, is_identifier, is_namespace, CodeGeneratorStrategy, HostConfig,
};
use crate::error::TemplateEngineError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Application-relative URLs in attributes that take a URL.
static VIRTUAL_URL_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:href|src|action)\s*=\s*["'](~/[^"'\s<>]*)"#).unwrap()
});

/// Render method of every generated page.
pub const EXECUTE_METHOD: &str = "Execute";
/// Lambda parameter helper bodies write to.
pub(crate) const HELPER_WRITER: &str = "__razor_helper_writer";

/// Behaviour that differs between engine versions.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GeneratorOptions {
    /// Rewrite `~/` attribute URLs into `Href(...)` calls.
    pub resolve_virtual_urls: bool,
}

pub(crate) fn generate(
    config: &HostConfig,
    source: &TemplateSource,
    options: GeneratorOptions,
) -> Result<GeneratorResults, TemplateEngineError> {
    if !is_identifier(&config.default_class_name) {
        return Err(TemplateEngineError::InvalidClassName(
            config.default_class_name.clone(),
        ));
    }
    if !is_namespace(&config.default_namespace) {
        return Err(TemplateEngineError::InvalidNamespace(
            config.default_namespace.clone(),
        ));
    }

    let (nodes, errors) = MarkupParser::new(&source.contents, config.parser).parse();
    let mut generator = CodeGenerator::new(config, source, options, errors);
    for node in nodes {
        generator.visit(node);
    }
    generator.finish()
}

/// Whether the file stem of `path` is `page_name`, ignoring case.
pub fn is_special_page(path: &str, page_name: &str) -> bool {
    file_stem(path).eq_ignore_ascii_case(page_name)
}

struct CodeGenerator<'a> {
    config: &'a HostConfig,
    source: &'a TemplateSource,
    options: GeneratorOptions,
    body: Vec<Statement>,
    /// Set while visiting a helper body.
    writer: Option<&'static str>,
    helpers: Vec<CodeMethod>,
    functions: Vec<String>,
    usings: Vec<String>,
    inherits: Option<TypeReference>,
    model: Option<(TypeReference, SourceLocation)>,
    errors: Vec<ParserError>,
}

impl<'a> CodeGenerator<'a> {
    fn new(
        config: &'a HostConfig,
        source: &'a TemplateSource,
        options: GeneratorOptions,
        errors: Vec<ParserError>,
    ) -> Self {
        Self {
            config,
            source,
            options,
            body: Vec::new(),
            writer: None,
            helpers: Vec::new(),
            functions: Vec::new(),
            usings: Vec::new(),
            inherits: None,
            model: None,
            errors,
        }
    }

    fn pragma(&self, location: SourceLocation) -> Option<LinePragma> {
        self.config.enable_line_pragmas.then(|| LinePragma {
            line: location.line,
            file: self.source.file_name.clone(),
        })
    }

    fn visit(&mut self, node: MarkupNode) {
        match node {
            MarkupNode::Literal(text) => {
                if self.options.resolve_virtual_urls {
                    self.write_resolving_urls(&text);
                } else {
                    self.write_literal(&text);
                }
            }
            MarkupNode::Expression { code, location } => {
                let pragma = self.pragma(location);
                self.write_expression(code, pragma);
            }
            MarkupNode::Code { code, location } => {
                let pragma = self.pragma(location);
                self.body.push(Statement::Code { code, pragma });
            }
            MarkupNode::Using { namespace, .. } => self.usings.push(namespace),
            MarkupNode::Inherits {
                base_type,
                location,
            } => match TypeReference::parse(&base_type) {
                Some(reference) => self.inherits = Some(reference),
                None => self.errors.push(ParserError::new(
                    format!("'{}' is not a valid base type", base_type),
                    location,
                )),
            },
            MarkupNode::Model {
                model_type,
                location,
            } => {
                if self.model.is_some() {
                    self.errors.push(ParserError::new(
                        "Only one 'model' statement is allowed in a file",
                        location,
                    ));
                    return;
                }
                match TypeReference::parse(&model_type) {
                    Some(reference) => self.model = Some((reference, location)),
                    None => self.errors.push(ParserError::new(
                        format!("'{}' is not a valid model type", model_type),
                        location,
                    )),
                }
            }
            MarkupNode::Functions { code, .. } => self.functions.push(code),
            MarkupNode::Helper {
                name,
                parameters,
                body,
                location,
            } => self.visit_helper(name, &parameters, body, location),
        }
    }

    fn visit_helper(
        &mut self,
        name: String,
        parameters: &str,
        body: Vec<MarkupNode>,
        location: SourceLocation,
    ) {
        let Some(parameters) = Parameter::parse_list(parameters) else {
            self.errors.push(ParserError::new(
                format!("'{}' is not a valid helper parameter list", parameters),
                location,
            ));
            return;
        };

        let outer_body = std::mem::take(&mut self.body);
        let outer_writer = self.writer.replace(HELPER_WRITER);
        for node in body {
            self.visit(node);
        }
        let helper_body = std::mem::replace(&mut self.body, outer_body);
        self.writer = outer_writer;

        let mut modifiers = MemberModifiers::PUBLIC;
        if self.config.static_helpers {
            modifiers |= MemberModifiers::STATIC;
        }
        let mut method = CodeMethod::new(name, modifiers);
        method.return_type = Some(HELPER_RESULT_TYPE.to_string());
        method.parameters = parameters;
        method.body.push(Statement::HelperResult {
            writer: HELPER_WRITER.to_string(),
            body: helper_body,
        });
        self.helpers.push(method);
    }

    fn write_expression(&mut self, expression: String, pragma: Option<LinePragma>) {
        let statement = match self.writer {
            Some(writer) => Statement::WriteTo {
                writer: writer.to_string(),
                expression,
                pragma,
            },
            None => Statement::Write { expression, pragma },
        };
        self.body.push(statement);
    }

    /// Appends to the previous `WriteLiteral` when there is one.
    fn write_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match (self.writer, self.body.last_mut()) {
            (None, Some(Statement::WriteLiteral(previous)))
            | (Some(_), Some(Statement::WriteLiteralTo { text: previous, .. })) => {
                previous.push_str(text)
            }
            (None, _) => self.body.push(Statement::WriteLiteral(text.to_string())),
            (Some(writer), _) => self.body.push(Statement::WriteLiteralTo {
                writer: writer.to_string(),
                text: text.to_string(),
            }),
        }
    }

    fn write_resolving_urls(&mut self, text: &str) {
        let mut last = 0;
        for captures in VIRTUAL_URL_ATTRIBUTE.captures_iter(text) {
            let Some(url) = captures.get(1) else {
                continue;
            };
            self.write_literal(&text[last..url.start()]);
            self.write_expression(
                format!("Href({})", csharp_string_literal(url.as_str())),
                None,
            );
            last = url.end();
        }
        self.write_literal(&text[last..]);
    }

    fn base_type(&mut self) -> Result<Option<TypeReference>, TemplateEngineError> {
        if let Some(inherits) = self.inherits.take() {
            if let Some((_, location)) = &self.model {
                self.errors.push(ParserError::new(
                    "The 'inherits' keyword is not allowed when a 'model' keyword is used",
                    *location,
                ));
            }
            return Ok(Some(inherits));
        }

        let config = self.config;
        let name = config.default_base_class.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let mut base = TypeReference::parse(name)
            .ok_or_else(|| TemplateEngineError::InvalidBaseType(name.to_string()))?;

        if let CodeGeneratorStrategy::MvcView {
            default_model_type,
            special_page_name,
        } = &config.code_generator
        {
            if !is_special_page(&self.source.project_relative_path, special_page_name) {
                let model = match self.model.take() {
                    Some((model, _)) => model,
                    None => TypeReference::parse(default_model_type).ok_or_else(|| {
                        TemplateEngineError::InvalidBaseType(format!(
                            "{}<{}>",
                            name, default_model_type
                        ))
                    })?,
                };
                base.type_arguments.push(model);
            }
        }
        Ok(Some(base))
    }

    fn finish(mut self) -> Result<GeneratorResults, TemplateEngineError> {
        let base_type = self.base_type()?;

        let mut class = CodeClass::new(&self.config.default_class_name);
        class.base_type = base_type;
        class
            .members
            .extend(self.functions.drain(..).map(Member::Snippet));
        class.members.push(Member::Constructor(CodeConstructor {
            modifiers: MemberModifiers::PUBLIC,
            body: Vec::new(),
        }));
        class
            .members
            .extend(self.helpers.drain(..).map(Member::Method));

        let mut execute = CodeMethod::new(
            EXECUTE_METHOD,
            MemberModifiers::PUBLIC | MemberModifiers::OVERRIDE,
        );
        execute.body = std::mem::take(&mut self.body);
        class.members.push(Member::Method(execute));

        let mut document = CodeDocument::new(&self.config.default_namespace, class);
        document
            .imports
            .extend(self.config.namespace_imports.iter().cloned());
        document.imports.extend(self.usings.drain(..));

        Ok(GeneratorResults {
            document,
            errors: self.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserStrategy;

    fn source(path: &str, contents: &str) -> TemplateSource {
        TemplateSource {
            file_name: format!("C:\\Project\\{}", path.replace('/', "\\")),
            project_relative_path: path.to_string(),
            contents: contents.to_string(),
        }
    }

    fn mvc_config(path: &str) -> HostConfig {
        let mut config = HostConfig::for_file(path);
        config.default_base_class = "System.Web.Mvc.WebViewPage".to_string();
        config.parser = ParserStrategy::Mvc;
        config.code_generator = CodeGeneratorStrategy::MvcView {
            default_model_type: "dynamic".to_string(),
            special_page_name: "_ViewStart".to_string(),
        };
        config
    }

    #[test]
    fn should_build_execute_body() {
        let config = HostConfig::for_file("Hello.cshtml");
        let results = generate(
            &config,
            &source("Hello.cshtml", "Hi @name!\n"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert!(results.success());

        let execute = results.document.class.method("Execute").unwrap();
        assert_eq!(execute.body.len(), 3);
        assert_eq!(execute.body[0], Statement::WriteLiteral("Hi ".to_string()));
        assert!(matches!(
            &execute.body[1],
            Statement::Write { expression, pragma: Some(p) } if expression == "name" && p.line == 1
        ));
        assert_eq!(results.document.class.base_type.unwrap().name, "System.Web.WebPages.WebPage");
    }

    #[test]
    fn should_omit_pragmas_when_disabled() {
        let mut config = HostConfig::for_file("Hello.cshtml");
        config.enable_line_pragmas = false;
        let results = generate(
            &config,
            &source("Hello.cshtml", "@{ var a = 1; }"),
            GeneratorOptions::default(),
        )
        .unwrap();
        let execute = results.document.class.method("Execute").unwrap();
        assert!(matches!(&execute.body[0], Statement::Code { pragma: None, .. }));
    }

    #[test]
    fn should_parameterize_mvc_base_with_model() {
        let results = generate(
            &mvc_config("Views/Home/Index.cshtml"),
            &source("Views/Home/Index.cshtml", "@model MyApp.Models.Person\n<p>@Model.Name</p>"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(
            results.document.class.base_type.unwrap().to_string(),
            "System.Web.Mvc.WebViewPage<MyApp.Models.Person>"
        );
    }

    #[test]
    fn should_use_dynamic_model_by_default() {
        let results = generate(
            &mvc_config("Views/Home/Index.cshtml"),
            &source("Views/Home/Index.cshtml", "<p>hi</p>"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(
            results.document.class.base_type.unwrap().to_string(),
            "System.Web.Mvc.WebViewPage<dynamic>"
        );
    }

    #[test]
    fn should_not_parameterize_special_page() {
        let results = generate(
            &mvc_config("Views/_viewstart.cshtml"),
            &source("Views/_viewstart.cshtml", "@{ Layout = \"~/Views/Shared/_Layout.cshtml\"; }"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(
            results.document.class.base_type.unwrap().to_string(),
            "System.Web.Mvc.WebViewPage"
        );
    }

    #[test]
    fn should_reject_duplicate_model() {
        let results = generate(
            &mvc_config("Views/Home/Index.cshtml"),
            &source("Views/Home/Index.cshtml", "@model A\n@model B\n"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location.line, 2);
    }

    #[test]
    fn should_resolve_virtual_urls_when_enabled() {
        let config = HostConfig::for_file("Page.cshtml");
        let results = generate(
            &config,
            &source("Page.cshtml", "<a href=\"~/about\">About</a>"),
            GeneratorOptions {
                resolve_virtual_urls: true,
            },
        )
        .unwrap();
        let execute = results.document.class.method("Execute").unwrap();
        assert_eq!(execute.body[0], Statement::WriteLiteral("<a href=\"".to_string()));
        assert!(matches!(
            &execute.body[1],
            Statement::Write { expression, pragma: None } if expression == "Href(\"~/about\")"
        ));
        assert_eq!(execute.body[2], Statement::WriteLiteral("\">About</a>".to_string()));
    }

    #[test]
    fn should_reject_invalid_class_name() {
        let mut config = HostConfig::for_file("Page.cshtml");
        config.default_class_name = "Not Valid".to_string();
        let err = generate(&config, &source("Page.cshtml", ""), GeneratorOptions::default())
            .unwrap_err();
        assert_eq!(err, TemplateEngineError::InvalidClassName("Not Valid".to_string()));
    }

    #[test]
    fn should_generate_helper_methods_writing_to_helper_writer() {
        let mut config = HostConfig::for_file("Helpers.cshtml");
        config.enable_line_pragmas = false;
        let results = generate(
            &config,
            &source(
                "Helpers.cshtml",
                "@helper Link(string url, string text = null) {\n<a href=\"~/go\">@text</a>\n}\n<p>page</p>",
            ),
            GeneratorOptions {
                resolve_virtual_urls: true,
            },
        )
        .unwrap();
        assert!(results.errors.is_empty(), "{:?}", results.errors);

        let class = &results.document.class;
        let helper = class.method("Link").unwrap();
        assert_eq!(helper.return_type.as_deref(), Some(HELPER_RESULT_TYPE));
        assert_eq!(helper.modifiers, MemberModifiers::PUBLIC);
        assert_eq!(helper.parameters[1].default.as_deref(), Some("null"));

        let Statement::HelperResult { writer, body } = &helper.body[0] else {
            panic!("expected helper result, got {:?}", helper.body[0]);
        };
        assert_eq!(writer, HELPER_WRITER);
        assert_eq!(
            body[0],
            Statement::WriteLiteralTo {
                writer: HELPER_WRITER.to_string(),
                text: "<a href=\"".to_string(),
            }
        );
        assert!(matches!(&body[1], Statement::WriteTo { expression, .. } if expression == "Href(\"~/go\")"));
        assert!(matches!(&body[3], Statement::WriteTo { expression, .. } if expression == "text"));

        let execute = class.method("Execute").unwrap();
        assert_eq!(execute.body, vec![Statement::WriteLiteral("<p>page</p>".to_string())]);
    }

    #[test]
    fn should_make_helpers_static_on_request() {
        let mut config = HostConfig::for_file("Helpers.cshtml");
        config.static_helpers = true;
        let results = generate(
            &config,
            &source("Helpers.cshtml", "@helper Empty() {\n}"),
            GeneratorOptions::default(),
        )
        .unwrap();
        let helper = results.document.class.method("Empty").unwrap();
        assert_eq!(
            helper.modifiers,
            MemberModifiers::PUBLIC | MemberModifiers::STATIC
        );
    }

    #[test]
    fn should_report_invalid_helper_parameters() {
        let results = generate(
            &HostConfig::for_file("Helpers.cshtml"),
            &source("Helpers.cshtml", "@helper Bad(oops) {\n}"),
            GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(
            results.errors[0].message,
            "'oops' is not a valid helper parameter list"
        );
        assert!(results.document.class.method("Bad").is_none());
    }

    #[test]
    fn should_detect_special_page_by_stem() {
        assert!(is_special_page("Views\\_ViewStart.cshtml", "_ViewStart"));
        assert!(is_special_page("_VIEWSTART.vbhtml", "_ViewStart"));
        assert!(!is_special_page("Views/_ViewStartup.cshtml", "_ViewStart"));
        assert!(!is_special_page("Views/_ViewStart.Mobile.cshtml", "_ViewStart"));
    }
}
