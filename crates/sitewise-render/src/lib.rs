//! # Sitewise Render
//!
//! Template rendering for the sitewise view dispatcher: a
//! [`TemplateEngine`] abstraction, the default [`MiniJinjaEngine`], and
//! [`TemplateSearchPath`] for layered (shared / site / system) template
//! directories.
//!
//! ```rust
//! use sitewise_render::{MiniJinjaEngine, TemplateEngine, TemplateSearchPath};
//!
//! let search = TemplateSearchPath::new()
//!     .with_dir("shared/templates")
//!     .with_dir("sites/acme/templates")
//!     .with_dir("system/templates");
//!
//! let engine = MiniJinjaEngine::with_search_path(search);
//! assert!(!engine.has_template("About"));
//! ```

mod error;
pub mod template;

pub use error::RenderError;
pub use template::{
    register_filters, ucfirst, MiniJinjaEngine, TemplateEngine, TemplateFile, TemplateSearchPath,
    TEMPLATE_EXTENSIONS,
};
