//! Host Tests
//!
//! End-to-end generation for single templates: transformer selection,
//! preset output shape, error reporting and file input.

use razor_generator_core::engine::RuntimeVersion;
use razor_generator_core::{normalize_output, HostError, HostManager, ParserError, RegistryError};
use std::cell::RefCell;
use tempfile::TempDir;

fn manager(dir: &TempDir) -> HostManager {
    HostManager::new(dir.path(), false, RuntimeVersion::V2).unwrap()
}

fn generate(manager: &HostManager, path: &str, contents: &str) -> Result<String, HostError> {
    manager.create_host_for_source(contents, path).generate_code()
}

#[test]
fn should_generate_self_contained_template() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(&manager, "Templates/Mail.cshtml", "Hello @name!").unwrap();

    assert_eq!(output.matches("partial class").count(), 1);
    assert!(output.contains("public partial class Mail : MailBase"));
    assert!(output.contains("public string TransformText()"));
    assert!(output.contains("public override void Execute()"));
    assert!(output.contains("public class MailBase"));
    assert!(output.contains("public virtual void Execute()"));
    assert!(output.contains("public void WriteLiteral(string textToAppend)"));
    assert!(output.contains("public void Write(object value)"));
    assert!(output.contains("WriteLiteral(\"Hello \");"));
    assert!(output.contains("using System.Collections.Generic;"));
    assert!(output.contains("Runtime Version:4.0.30319.17929"));
}

#[test]
fn should_generate_typed_mvc_view() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(&manager, "Views/Home/Index.cshtml", "<h1>@ViewBag.Title</h1>").unwrap();

    assert!(output.contains("public class Index : System.Web.Mvc.WebViewPage<dynamic>"));
    assert!(output.contains("[System.Web.WebPages.PageVirtualPathAttribute(\"~/Views/Home/Index.cshtml\")]"));
    assert!(output.contains(
        "[System.CodeDom.Compiler.GeneratedCodeAttribute(\"RazorGenerator\", \"2.0.0.0\")]"
    ));
    assert!(output.contains("using System.Web.Mvc.Html;"));
}

#[test]
fn should_use_declared_model_type() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Views/Shop/Product.cshtml",
        "@model Shop.Product\n<h1>@Model.Name</h1>",
    )
    .unwrap();

    assert!(output.contains(": System.Web.Mvc.WebViewPage<Shop.Product>"));
}

#[test]
fn should_not_type_view_start_page() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Views/_ViewStart.cshtml",
        "@{ Layout = \"~/Views/Shared/_Layout.cshtml\"; }",
    )
    .unwrap();

    let declaration = output
        .lines()
        .find(|line| line.contains("class _ViewStart"))
        .unwrap();
    assert!(declaration.ends_with(": System.Web.Mvc.WebViewPage"));
    assert!(!declaration.contains('<'));
}

#[test]
fn should_select_transformer_from_directive() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Views/Emails/Welcome.cshtml",
        "@* Generator: Template *@\nWelcome @user!",
    )
    .unwrap();

    assert!(output.contains("public partial class Welcome : WelcomeBase"));
    assert!(!output.contains("WebViewPage"));
}

#[test]
fn should_fail_resolution_for_unknown_generator() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let err = generate(&manager, "Page.cshtml", "@* Generator: WebForm *@\n<p/>").unwrap_err();

    assert!(matches!(
        err,
        HostError::Resolution(RegistryError::UnknownTransformer(ref name)) if name == "WebForm"
    ));
}

#[test]
fn should_name_views_with_dotted_file_names_apart() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let desktop = generate(&manager, "Views/Home/Index.cshtml", "<p>desktop</p>").unwrap();
    let mobile = generate(&manager, "Views/Home/Index.Mobile.cshtml", "<p>mobile</p>").unwrap();
    let mobile_start = generate(
        &manager,
        "Views/_ViewStart.Mobile.cshtml",
        "@{ Layout = null; }",
    )
    .unwrap();

    assert!(desktop.contains("public class Index : System.Web.Mvc.WebViewPage<dynamic>"));
    assert!(mobile.contains("public class Index_Mobile : System.Web.Mvc.WebViewPage<dynamic>"));
    assert!(mobile.contains("\"~/Views/Home/Index.Mobile.cshtml\""));
    assert!(mobile_start
        .contains("public class _ViewStart_Mobile : System.Web.Mvc.WebViewPage<dynamic>"));
}

#[test]
fn should_generate_web_page() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Pages/Default.cshtml",
        "@* Generator: WebPage *@\n<h1>@Page.Title</h1>",
    )
    .unwrap();

    assert!(output.contains("public class Default : System.Web.WebPages.WebPage\n"));
    assert!(output.contains("[System.Web.WebPages.PageVirtualPathAttribute(\"~/Pages/Default.cshtml\")]"));
    assert!(output.contains("using System.Web.WebPages;"));
    assert!(output.contains("public override void Execute()"));
    assert!(!output.contains("System.Web.Mvc"));
}

#[test]
fn should_generate_mvc_helper_library_for_app_code() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "App_Code/Links.cshtml",
        "@helper Link(string url, string text) {\n<a href=\"@url\">@text</a>\n}\n",
    )
    .unwrap();

    assert!(output.contains("public class Links : System.Web.WebPages.HelperPage\n"));
    assert!(output.contains(
        "public static System.Web.WebPages.HelperResult Link(string url, string text)"
    ));
    assert!(output.contains("return new System.Web.WebPages.HelperResult(__razor_helper_writer =>"));
    assert!(output.contains("WriteLiteralTo(__razor_helper_writer, \"<a href=\\\"\");"));
    assert!(output.contains("WriteTo(__razor_helper_writer, url);"));
    assert!(output.contains("using System.Web.Mvc.Html;"));
    assert!(!output.contains("public Links()"));
    assert!(!output.contains("void Execute()"));
}

#[test]
fn should_generate_web_page_helper_library() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Helpers/Format.cshtml",
        "@* Generator: WebPageHelper *@\n@helper Money(decimal amount) {\n@amount.ToString(\"C\")\n}\n",
    )
    .unwrap();

    assert!(output.contains("public class Format : System.Web.WebPages.HelperPage\n"));
    assert!(output.contains("public static System.Web.WebPages.HelperResult Money(decimal amount)"));
    assert!(output.contains("WriteTo(__razor_helper_writer, amount.ToString(\"C\"));"));
    assert!(!output.contains("System.Web.Mvc"));
}

#[test]
fn should_apply_directive_overrides() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(
        &manager,
        "Mail.cshtml",
        "@* Generator: Template\n   TypeVisibility: Internal\n   Namespace: Mail.Templates\n   DisableLinePragmas: true *@\nHi @name",
    )
    .unwrap();

    assert!(output.contains("namespace Mail.Templates"));
    assert!(output.contains("internal partial class Mail : MailBase"));
    assert!(!output.contains("#line 5"));
}

#[test]
fn should_emit_line_pragmas_by_default() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let output = generate(&manager, "Page.cshtml", "<p>\n@value\n</p>").unwrap();

    assert!(output.contains("#line 2 \"Page.cshtml\""));
}

#[test]
fn should_report_parser_errors_through_sinks_and_result() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let seen: RefCell<Vec<ParserError>> = RefCell::new(Vec::new());

    let mut host = manager.create_host_for_source("<p>@(1 + </p>", "Page.cshtml");
    host.on_error(|error| seen.borrow_mut().push(error.clone()));
    let err = host.generate_code().unwrap_err();

    match &err {
        HostError::Template {
            errors,
            partial_output,
        } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors[0].message,
                "The explicit expression is missing a closing ')' character"
            );
            assert!(partial_output.contains("partial class Page"));
        }
        other => panic!("expected template errors, got {:?}", other),
    }
    assert_eq!(err.parser_errors().len(), 1);
    assert_eq!(host.errors().len(), 1);
    drop(host);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn should_keep_directive_warnings() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let mut host = manager.create_host_for_source("@* Generator Template *@\nHi", "Page.cshtml");
    host.generate_code().unwrap();

    assert_eq!(host.warnings().len(), 1);
    assert_eq!(host.warnings()[0].line, 1);
}

#[test]
fn should_read_template_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Report.cshtml");
    std::fs::write(&path, "\u{feff}Total: @total").unwrap();
    let manager = manager(&dir);

    let mut host = manager.create_host(&path, "Report.cshtml");
    assert_eq!(host.input_path(), Some(path.as_path()));
    let output = host.generate_code().unwrap();

    assert!(output.contains("WriteLiteral(\"Total: \");"));
    assert!(!output.contains('\u{feff}'));
}

#[test]
fn should_fail_on_missing_file() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let err = manager
        .create_host(dir.path().join("Missing.cshtml"), "Missing.cshtml")
        .generate_code()
        .unwrap_err();

    assert!(matches!(err, HostError::Io { .. }));
}

#[test]
fn should_honor_host_settings_overrides() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let mut host = manager.create_host_for_source("Hi", "Page.cshtml");
    host.set_default_namespace("Company.Text");
    host.set_default_class_name("Greeting");
    let output = host.generate_code().unwrap();

    assert!(output.contains("namespace Company.Text"));
    assert!(output.contains("public partial class Greeting : GreetingBase"));
}

#[test]
fn should_normalize_output_across_runtimes() {
    let dir = TempDir::new().unwrap();
    let v1 = HostManager::new(dir.path(), false, RuntimeVersion::V1).unwrap();
    let v2 = HostManager::new(dir.path(), false, RuntimeVersion::V2).unwrap();
    let template = "Hello @name!";

    let from_v1 = generate(&v1, "Mail.cshtml", template).unwrap();
    let from_v2 = generate(&v2, "Mail.cshtml", template).unwrap();

    assert_ne!(from_v1, from_v2);
    assert_eq!(
        normalize_output(&from_v1, "1.0.0.0"),
        normalize_output(&from_v2, "2.0.0.0")
    );
    assert!(normalize_output(&from_v2, "2.0.0.0").contains("Runtime Version:N.N.NNNNN.N"));
}
