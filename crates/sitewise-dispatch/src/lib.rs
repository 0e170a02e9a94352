//! Convention-based view resolution and request dispatch.
//!
//! `sitewise-dispatch` decides which view renders a request and runs the
//! request through to rendered output.
//!
//! # Views and Tiers
//!
//! A view is a template plus an optional view class. Views live in three
//! layered directories, in precedence order:
//!
//! | Tier | Class namespace | Purpose |
//! |------|-----------------|---------|
//! | shared | `shared::views` | Views shared across every site |
//! | site | `sites::<site>::views` | Views of the current site |
//! | system | `system::views` | Built-in fallbacks |
//!
//! A `<Name>.view` file in any of the directories makes `Name` a main view,
//! selectable by the first URL segment. The view's class is the first of
//! `shared::views::NameView`, `sites::<site>::views::NameView`,
//! `system::views::NameView` that has a source file and is registered as a
//! view in the [`ClassRegistry`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sitewise_dispatch::{ClassRegistry, Dispatcher, NamespacedSites, ViewDirs, ViewResolver};
//!
//! let mut classes = ClassRegistry::new();
//! classes.register_view("sites::acme::views::ContactView", |ctx| Box::new(Contact::new(ctx)));
//!
//! let resolver = ViewResolver::new(
//!     Arc::new(ViewDirs::new("shared/views", "sites/acme/views", "system/views")),
//!     Arc::new(NamespacedSites::new("acme")),
//!     classes,
//! );
//!
//! Dispatcher::builder(resolver)
//!     .request_path("/contact")
//!     .build()
//!     .run()?;
//! ```
//!
//! # Core Types
//!
//! - [`ViewResolver`]: view name and view class resolution
//! - [`Dispatcher`]: one request, from URL segment to filtered output
//! - [`RenderContext`]: per-request variables and view instances
//! - [`Hooks`]: before-render and output-buffer filters
//! - [`OutputCapture`]: scoped buffer released through the output filters

mod context;
mod dispatcher;
mod hooks;
mod locator;
mod output;
mod resolver;
mod templates;
mod url;
mod view;

pub use context::RenderContext;

pub use dispatcher::{DispatchError, Dispatcher, DispatcherBuilder};

pub use hooks::{ContextFilterFn, HookError, HookPhase, Hooks, OutputFilterFn};

pub use locator::{ClassLocator, NamespacedSites, PathConfiguration, UserSites, ViewDirs};

pub use output::{OutputCapture, OutputSink, SharedBuffer};

pub use resolver::{ClassCheck, MainView, MainViews, ViewResolver, DEFAULT_HOME_VIEW};

pub use templates::{SiteTemplates, StaticTemplateSetup, TemplateSetup, ViewTemplates};

pub use url::{PathArguments, UrlArguments};

pub use view::{
    ClassId, ClassRegistry, ResolvedView, Tier, View, ViewConstructor, ViewName,
    SHARED_NAMESPACE, SHARED_VIEW_SLOT, SYSTEM_HOME_VIEW, SYSTEM_NAMESPACE, VIEW_CLASS_SUFFIX,
    VIEW_SOURCE_EXTENSIONS,
};

// Re-export the render error so callers matching on DispatchError::Render
// don't need a direct dependency.
pub use sitewise_render::RenderError;
