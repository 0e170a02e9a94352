//! Request lifecycle orchestration.
//!
//! [`Dispatcher::run`] renders the current request once:
//!
//! ```text
//! begin output capture
//!   → fresh RenderContext
//!   → template paths + default variables      (TemplateSetup)
//!   → shared view instance, if any            (ViewResolver)
//!   → view name from URL segment 0            (ViewResolver)
//!   → view class instance, if any             (ViewResolver)
//!   → before-render filters                   (Hooks)
//!   → render template into the capture        (ViewTemplates)
//! release capture → output filters → sink
//! ```
//!
//! The capture is released even when a step fails, so anything rendered
//! before a failure still goes through the output filters and reaches the
//! sink before the error is returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sitewise_render::RenderError;
use thiserror::Error;

use crate::context::RenderContext;
use crate::hooks::{HookError, Hooks};
use crate::output::{OutputCapture, OutputSink, SharedBuffer};
use crate::resolver::ViewResolver;
use crate::templates::{SiteTemplates, StaticTemplateSetup, TemplateSetup, ViewTemplates};
use crate::url::{PathArguments, UrlArguments};
use crate::view::ViewName;

/// Errors that abort a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The template engine failed while producing output.
    #[error("failed to render view '{view}': {source}")]
    Render {
        view: String,
        #[source]
        source: RenderError,
    },

    /// A before-render filter rejected the request.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The output could not be written to the sink.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Orchestrates rendering of a request.
///
/// Construct one per process with [`Dispatcher::builder`] and share it by
/// reference; it is `Send + Sync`.
pub struct Dispatcher {
    resolver: Arc<ViewResolver>,
    templates: Box<dyn ViewTemplates>,
    setup: Box<dyn TemplateSetup>,
    hooks: Hooks,
    args: Box<dyn UrlArguments>,
    sink: OutputSink,
    ran: AtomicBool,
}

impl Dispatcher {
    /// Starts building a dispatcher around `resolver`.
    ///
    /// Pass an `Arc<ViewResolver>` to share one resolver, and its scanned
    /// main views, between dispatchers.
    pub fn builder(resolver: impl Into<Arc<ViewResolver>>) -> DispatcherBuilder {
        DispatcherBuilder::new(resolver)
    }

    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Returns true once [`run`](Self::run) has been called.
    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::Acquire)
    }

    /// Renders the current request to the configured sink.
    ///
    /// Only the first call does anything; later calls return `Ok(())`
    /// without rendering.
    pub fn run(&self) -> Result<(), DispatchError> {
        if self
            .ran
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("dispatcher already ran; ignoring");
            return Ok(());
        }

        self.render_request(self.args.as_ref(), &self.sink)
    }

    /// Renders `path` and returns the filtered output.
    ///
    /// Does not touch the configured sink or the run-once guard.
    pub fn dispatch(&self, path: &str) -> Result<String, DispatchError> {
        let args = PathArguments::parse(path);
        let buffer = SharedBuffer::new();
        self.render_request(&args, &OutputSink::Memory(buffer.clone()))?;
        Ok(buffer.contents())
    }

    /// Builds the fully populated context for a request without rendering it.
    ///
    /// Runs every step up to and including the before-render filters.
    pub fn prepare(&self, args: &dyn UrlArguments) -> Result<RenderContext, DispatchError> {
        let mut ctx = RenderContext::new();
        self.setup.populate_paths(&mut ctx);
        self.setup.populate_vars(&mut ctx);

        ctx.shared_view = self.resolver.resolve_shared_view(&ctx);

        let view_name = self.resolver.resolve_view_name(args.get(0), |name| {
            self.templates.view_file_exists(&ctx, name.as_str())
        });
        ctx.view_name = Some(view_name.clone());

        ctx.view = self.resolver.resolve_view_class(&view_name, &ctx);

        self.hooks.apply_context_filter(&mut ctx)?;
        Ok(ctx)
    }

    fn render_request(
        &self,
        args: &dyn UrlArguments,
        sink: &OutputSink,
    ) -> Result<(), DispatchError> {
        let mut capture = OutputCapture::begin(sink, &self.hooks);

        let ctx = self.prepare(args)?;
        // Filters may have replaced or cleared the view name.
        let view = ctx
            .view_name
            .clone()
            .unwrap_or_else(|| ViewName::new(crate::view::SYSTEM_HOME_VIEW));

        tracing::info!(
            segment = args.get(0),
            view = %view,
            class = ctx.view.as_ref().map(|v| v.class.as_str()),
            "dispatching request"
        );

        self.templates
            .display_view(&ctx, &view, &mut capture)
            .map_err(|source| DispatchError::Render {
                view: view.to_string(),
                source,
            })?;

        capture.finish()?;
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks)
            .field("sink", &self.sink)
            .field("ran", &self.has_run())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    resolver: Arc<ViewResolver>,
    templates: Box<dyn ViewTemplates>,
    setup: Box<dyn TemplateSetup>,
    hooks: Hooks,
    args: Box<dyn UrlArguments>,
    sink: OutputSink,
}

impl DispatcherBuilder {
    /// Starts with default collaborators: no template paths, no variables,
    /// no hooks, an empty request path, and stdout as the sink.
    pub fn new(resolver: impl Into<Arc<ViewResolver>>) -> Self {
        Self {
            resolver: resolver.into(),
            templates: Box::new(SiteTemplates::new()),
            setup: Box::new(StaticTemplateSetup::default()),
            hooks: Hooks::new(),
            args: Box::new(PathArguments::default()),
            sink: OutputSink::Stdout,
        }
    }

    pub fn templates(mut self, templates: impl ViewTemplates + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    pub fn setup(mut self, setup: impl TemplateSetup + 'static) -> Self {
        self.setup = Box::new(setup);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the arguments of the request [`Dispatcher::run`] renders.
    pub fn args(mut self, args: impl UrlArguments + 'static) -> Self {
        self.args = Box::new(args);
        self
    }

    /// Shortcut for `args(PathArguments::parse(path))`.
    pub fn request_path(self, path: &str) -> Self {
        self.args(PathArguments::parse(path))
    }

    pub fn sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            resolver: self.resolver,
            templates: self.templates,
            setup: self.setup,
            hooks: self.hooks,
            args: self.args,
            sink: self.sink,
            ran: AtomicBool::new(false),
        }
    }
}
