//! # Sitewise
//!
//! Sites rendered from convention-named views and layered templates.
//!
//! A site has three tiers of views and templates: shared across sites, the
//! site itself, and system fallbacks. The first URL segment picks a main
//! view, a view class (if one is registered) contributes data, and the
//! view's template renders the page.
//!
//! ```text
//! site.yaml ──► SiteConfig ──► Site ──► Dispatcher ──► ViewResolver
//!                                          │                │
//!                                          ▼                ▼
//!                                    SiteTemplates      ClassRegistry
//!                                          │
//!                                          ▼
//!                                  OutputCapture ──► hooks ──► sink
//! ```
//!
//! The view resolution and dispatch machinery lives in
//! [`sitewise_dispatch`]; the template engine in [`sitewise_render`]. This
//! crate adds configuration, the [`Site`] builder and the `sitewise`
//! command line tool.
//!
//! ## Layout
//!
//! With the default configuration, a site rooted at `.` looks like:
//!
//! ```text
//! shared/views/Contact.view          main view, shared tier
//! shared/templates/Contact.jinja
//! sites/acme/views/About.view        main view, site tier
//! sites/acme/templates/About.jinja
//! system/views/Home.view
//! system/templates/Home.jinja
//! ```

pub mod config;
pub mod logging;
pub mod report;
pub mod setup;
pub mod site;

pub use config::{PathsConfig, SiteConfig, SitePaths, DEFAULT_SITE};
pub use report::{ClassChoice, Resolution, ViewListing};
pub use setup::SetupError;
pub use site::{Site, SiteBuilder, SYSTEM_HOME_TEMPLATE};

pub use sitewise_dispatch;
pub use sitewise_render;
