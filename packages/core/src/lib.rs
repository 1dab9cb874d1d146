#![deny(clippy::all)]

/**
 * Razor Generator Core
 *
 * Turns Razor templates into C# source. Per-file directives pick a code
 * transformer that shapes the generated class for its consumer framework.
 */

pub mod code;
pub mod config;
pub mod directives;
pub mod engine;
pub mod error;
pub mod host;
pub mod host_manager;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod transformers;
pub mod util;
pub mod version;

pub use config::HostConfig;
pub use directives::{DirectiveParseWarning, DirectiveParser, Directives};
pub use engine::{ParserError, RuntimeVersion, TemplateEngine, TemplateSource};
pub use error::{
    HostError, HostManagerError, IsolationBoundaryError, RegistryError, TemplateEngineError,
    TransformerError,
};
pub use host::Host;
pub use host_manager::{HostManager, HostManagerBuilder};
pub use plugin::{ManifestPlugin, TransformerPlugin};
pub use registry::TransformerRegistry;
pub use transformers::{AggregateTransformer, CodeTransformer, GenerationContext};
pub use util::normalize_output;
