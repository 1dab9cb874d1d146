//! Host Configuration
//!
//! Settings the host hands to the template engine. Code transformers may change
//! them during `initialize`; after that the host only exposes `&HostConfig`.

use indexmap::IndexSet;

pub const DEFAULT_NAMESPACE: &str = "ASP";
pub const DEFAULT_BASE_CLASS: &str = "System.Web.WebPages.WebPage";
pub const DEFAULT_CLASS_NAME: &str = "__RazorTemplate";

/// How the engine shapes the generated class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodeGeneratorStrategy {
    #[default]
    Standard,
    /// Parameterises the base class with the view's model type.
    MvcView {
        /// Model type used when the view declares none.
        default_model_type: String,
        /// File stem of the page that never gets a model type.
        special_page_name: String,
    },
}

/// Which markup keywords the engine recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserStrategy {
    #[default]
    Standard,
    /// Adds the `@model` keyword.
    Mvc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub default_namespace: String,
    pub default_class_name: String,
    pub default_base_class: String,
    pub enable_line_pragmas: bool,
    /// Emit `@helper` blocks as static methods.
    pub static_helpers: bool,
    /// Namespaces imported into every generated file, first-seen order.
    pub namespace_imports: IndexSet<String>,
    pub code_generator: CodeGeneratorStrategy,
    pub parser: ParserStrategy,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            default_class_name: DEFAULT_CLASS_NAME.to_string(),
            default_base_class: DEFAULT_BASE_CLASS.to_string(),
            enable_line_pragmas: true,
            static_helpers: false,
            namespace_imports: IndexSet::new(),
            code_generator: CodeGeneratorStrategy::Standard,
            parser: ParserStrategy::Standard,
        }
    }
}

impl HostConfig {
    /// Defaults for a template at `project_relative_path`; the class is named
    /// after the file.
    pub fn for_file(project_relative_path: &str) -> Self {
        Self {
            default_class_name: class_name_from_path(project_relative_path),
            ..Self::default()
        }
    }
}

/// File name of `path` without its last extension: `Views/Index.Mobile.cshtml`
/// → `Index.Mobile`.
pub fn file_stem(path: &str) -> &str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

/// Turn a file name into a C# identifier: `_Layout.cshtml` → `_Layout`,
/// `Index.Mobile.cshtml` → `Index_Mobile`, `404.cshtml` → `_404`.
pub fn class_name_from_path(path: &str) -> String {
    let mut name: String = file_stem(path)
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match name.chars().next() {
        None => DEFAULT_CLASS_NAME.to_string(),
        Some(first) if first.is_ascii_digit() => {
            name.insert(0, '_');
            name
        }
        Some(_) => name,
    }
}

/// Whether `name` is usable as a C# identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Whether `name` is a dotted sequence of identifiers.
pub fn is_namespace(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_class_after_file_stem() {
        assert_eq!(class_name_from_path("Views/Home/Index.cshtml"), "Index");
        assert_eq!(class_name_from_path("Views\\Shared\\_Layout.cshtml"), "_Layout");
        assert_eq!(class_name_from_path("my-page.cshtml"), "my_page");
        assert_eq!(class_name_from_path("404.cshtml"), "_404");
        assert_eq!(class_name_from_path(".cshtml"), DEFAULT_CLASS_NAME);
    }

    #[test]
    fn should_keep_inner_dots_of_file_name() {
        assert_eq!(file_stem("Views/Home/Index.Mobile.cshtml"), "Index.Mobile");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(
            class_name_from_path("Views/Home/Index.Mobile.cshtml"),
            "Index_Mobile"
        );
        assert_ne!(
            class_name_from_path("Views/Home/Index.cshtml"),
            class_name_from_path("Views/Home/Index.Mobile.cshtml")
        );
    }

    #[test]
    fn should_validate_identifiers_and_namespaces() {
        assert!(is_identifier("_Foo1"));
        assert!(!is_identifier("1Foo"));
        assert!(!is_identifier("Foo-Bar"));
        assert!(is_namespace("Company.Web.Views"));
        assert!(!is_namespace("Company..Views"));
        assert!(!is_namespace(""));
    }

    #[test]
    fn should_enable_line_pragmas_by_default() {
        let config = HostConfig::for_file("Template.cshtml");
        assert!(config.enable_line_pragmas);
        assert_eq!(config.default_class_name, "Template");
        assert_eq!(config.default_namespace, DEFAULT_NAMESPACE);
    }
}
