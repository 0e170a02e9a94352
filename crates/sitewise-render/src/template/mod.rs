//! Template lookup and rendering.
//!
//! ## Search Paths
//!
//! Sites keep their templates in layered directories: shared across sites,
//! site-specific, and system defaults. [`TemplateSearchPath`] holds those
//! directories in precedence order and resolves a view name to the first
//! matching file. Supported extensions: `.jinja`, `.jinja2`, `.j2`, `.html`
//! (in priority order).
//!
//! ## Engines
//!
//! [`TemplateEngine`] is the seam between the dispatcher and the template
//! backend. [`MiniJinjaEngine`] is the default, loading named templates from a
//! search path and streaming output into any `io::Write`.

mod engine;
pub mod filters;
mod search;

pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use filters::{register_filters, ucfirst};
pub use search::{TemplateFile, TemplateSearchPath, TEMPLATE_EXTENSIONS};
