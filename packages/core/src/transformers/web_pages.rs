//! Web page presets: ASP.NET Web Pages and helper libraries.
//!
//! Helper presets keep only the `@helper` and `@functions` members of a
//! template; the page body is not rendered.

use super::{
    AddGeneratedClassAttribute, AddPageVirtualPathAttribute, AggregateTransformer,
    DirectivesBasedTransformers, MakeTypeHelper, SetBaseType, SetImports, MVC_HELPER_TRANSFORMER,
    MVC_NAMESPACES, WEB_PAGE_HELPER_TRANSFORMER, WEB_PAGE_TRANSFORMER,
};

pub const WEB_PAGE_NAMESPACES: [&str; 10] = [
    "System",
    "System.Collections.Generic",
    "System.IO",
    "System.Linq",
    "System.Net",
    "System.Web",
    "System.Web.Helpers",
    "System.Web.Security",
    "System.Web.UI",
    "System.Web.WebPages",
];
pub const WEB_PAGE_BASE_CLASS: &str = "System.Web.WebPages.WebPage";
pub const HELPER_PAGE_BASE_CLASS: &str = "System.Web.WebPages.HelperPage";

/// A `WebPage` subclass registered under its virtual path.
pub fn web_page_transformer() -> AggregateTransformer {
    AggregateTransformer::new(
        WEB_PAGE_TRANSFORMER,
        vec![
            Box::new(DirectivesBasedTransformers::new()),
            Box::new(AddGeneratedClassAttribute::new()),
            Box::new(AddPageVirtualPathAttribute::new()),
            Box::new(SetImports::new(WEB_PAGE_NAMESPACES, false)),
            Box::new(SetBaseType::new(WEB_PAGE_BASE_CLASS)),
        ],
    )
}

pub fn web_page_helper_transformer() -> AggregateTransformer {
    helper_transformer(WEB_PAGE_HELPER_TRANSFORMER, &[])
}

/// Helper library that may use the MVC HTML helpers.
pub fn mvc_helper_transformer() -> AggregateTransformer {
    helper_transformer(MVC_HELPER_TRANSFORMER, &MVC_NAMESPACES)
}

fn helper_transformer(name: &str, extra_imports: &[&str]) -> AggregateTransformer {
    let imports = WEB_PAGE_NAMESPACES.iter().chain(extra_imports).copied();
    AggregateTransformer::new(
        name,
        vec![
            Box::new(DirectivesBasedTransformers::new()),
            Box::new(AddGeneratedClassAttribute::new()),
            Box::new(SetImports::new(imports, false)),
            Box::new(SetBaseType::new(HELPER_PAGE_BASE_CLASS)),
            Box::new(MakeTypeHelper::new()),
        ],
    )
}
