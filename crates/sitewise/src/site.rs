//! A configured site, wired into a dispatcher.
//!
//! [`Site`] owns everything a request needs that does not change between
//! requests: resolved directories, registered view classes, built-in
//! templates, hooks and the output sink. Each call to
//! [`Site::dispatcher`] hands out a fresh [`Dispatcher`] for one request.
//!
//! ```rust,ignore
//! use sitewise::{Site, SiteConfig};
//! use sitewise_dispatch::Tier;
//!
//! let site = Site::builder(SiteConfig::load("site.yaml")?)
//!     .view(Tier::Site, "Contact", |ctx| Box::new(Contact::new(ctx)))?
//!     .build();
//!
//! site.dispatcher("/contact").run()?;
//! ```

use std::sync::Arc;

use sitewise_dispatch::{
    ClassId, ClassRegistry, DispatchError, Dispatcher, Hooks, NamespacedSites, OutputSink,
    PathArguments, RenderContext, SiteTemplates, StaticTemplateSetup, Tier, UserSites, View,
    ViewName, ViewResolver, SHARED_NAMESPACE, SHARED_VIEW_SLOT, SYSTEM_HOME_VIEW,
    SYSTEM_NAMESPACE,
};
use sitewise_render::{MiniJinjaEngine, TemplateEngine};

use crate::config::{SiteConfig, SitePaths};
use crate::report::Resolution;
use crate::setup::SetupError;

/// Template rendered for the system home view when no file provides one.
pub const SYSTEM_HOME_TEMPLATE: &str = r#"<!doctype html>
<title>{{ site.title | default("Sitewise") }}</title>
<h1>{{ site.title | default("Sitewise") }}</h1>
<p>This site has no home view yet.</p>
"#;

/// Builder for [`Site`].
pub struct SiteBuilder {
    config: SiteConfig,
    sites: NamespacedSites,
    classes: ClassRegistry,
    hooks: Hooks,
    templates: SiteTemplates,
    sink: OutputSink,
}

impl std::fmt::Debug for SiteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteBuilder")
            .field("config", &self.config)
            .field("sites", &self.sites)
            .field("templates", &self.templates)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl SiteBuilder {
    pub fn new(config: SiteConfig) -> Self {
        let sites = NamespacedSites::new(config.site.clone());
        Self {
            config,
            sites,
            classes: ClassRegistry::new(),
            hooks: Hooks::new(),
            templates: SiteTemplates::new().with_builtin(SYSTEM_HOME_VIEW, SYSTEM_HOME_TEMPLATE),
            sink: OutputSink::default(),
        }
    }

    /// Registers the class of `view` in `tier`.
    ///
    /// The class is only used when a `<view>.view` source file exists in the
    /// tier's views directory.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::DuplicateClass`] if the tier already has a class
    /// for this view.
    pub fn view<F>(self, tier: Tier, view: &str, constructor: F) -> Result<Self, SetupError>
    where
        F: Fn(&RenderContext) -> Box<dyn View> + Send + Sync + 'static,
    {
        let id = self.class_id(tier, &ViewName::new(view));
        self.register(id, move |classes, id| classes.register_view(id, constructor))
    }

    /// Registers the shared view class of `tier`, available to every view
    /// as `shared` in templates.
    pub fn shared_view<F>(self, tier: Tier, constructor: F) -> Result<Self, SetupError>
    where
        F: Fn(&RenderContext) -> Box<dyn View> + Send + Sync + 'static,
    {
        self.view(tier, SHARED_VIEW_SLOT, constructor)
    }

    /// Registers a class that exists but is not a view.
    ///
    /// A view candidate naming it is skipped in favour of the next tier.
    pub fn plain_class(self, id: impl Into<ClassId>) -> Result<Self, SetupError> {
        self.register(id.into(), |classes, id| classes.register_class(id))
    }

    /// Adds a template used for `name` when no template file is found.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Template`] if the source does not compile.
    pub fn builtin_template(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let name = name.into();
        let source = source.into();
        MiniJinjaEngine::new().add_template(&name, &source)?;
        self.templates = self.templates.with_builtin(name, source);
        Ok(self)
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Site {
        let paths = self.config.resolve_paths();
        tracing::debug!(
            site = %self.config.site,
            classes = self.classes.len(),
            "built site"
        );
        let resolver = ViewResolver::new(
            Arc::new(paths.views.clone()),
            Arc::new(self.sites),
            self.classes,
        )
        .with_home_view(self.config.home_view.clone());

        Site {
            config: self.config,
            paths,
            resolver: Arc::new(resolver),
            hooks: self.hooks,
            templates: self.templates,
            sink: self.sink,
        }
    }

    fn class_id(&self, tier: Tier, view: &ViewName) -> ClassId {
        match tier {
            Tier::Shared => ClassId::for_view(SHARED_NAMESPACE, view),
            Tier::Site => self.sites.view_class_name(view),
            Tier::System => ClassId::for_view(SYSTEM_NAMESPACE, view),
        }
    }

    fn register(
        mut self,
        id: ClassId,
        insert: impl FnOnce(&mut ClassRegistry, ClassId),
    ) -> Result<Self, SetupError> {
        if self.classes.is_known(&id) {
            return Err(SetupError::DuplicateClass(id.to_string()));
        }
        insert(&mut self.classes, id);
        Ok(self)
    }
}

/// A configured site.
pub struct Site {
    config: SiteConfig,
    paths: SitePaths,
    resolver: Arc<ViewResolver>,
    hooks: Hooks,
    templates: SiteTemplates,
    sink: OutputSink,
}

impl Site {
    pub fn builder(config: SiteConfig) -> SiteBuilder {
        SiteBuilder::new(config)
    }

    /// Builds a site with no view classes from a configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SetupError> {
        Ok(Self::builder(SiteConfig::load(path)?).build())
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// The resolver shared by every request of this site.
    ///
    /// The view directories are scanned on the first request and never
    /// again for the lifetime of the site.
    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    pub fn template_setup(&self) -> StaticTemplateSetup {
        StaticTemplateSetup {
            paths: self.paths.templates.clone(),
            site_vars: self.config.site_vars.clone(),
            system_vars: self.config.system_vars.clone(),
        }
    }

    /// A dispatcher for the request `path`, writing to the site's sink.
    pub fn dispatcher(&self, path: &str) -> Dispatcher {
        Dispatcher::builder(self.resolver.clone())
            .templates(self.templates.clone())
            .setup(self.template_setup())
            .hooks(self.hooks.clone())
            .request_path(path)
            .sink(self.sink.clone())
            .build()
    }

    /// Renders `path` and returns the output instead of writing it.
    pub fn render(&self, path: &str) -> Result<String, DispatchError> {
        self.dispatcher(path).dispatch(path)
    }

    /// Reports which view and classes would serve `path`, without rendering.
    pub fn resolve(&self, path: &str) -> Result<Resolution, DispatchError> {
        let args = PathArguments::parse(path);
        let ctx = self.dispatcher(path).prepare(&args)?;
        Ok(Resolution::from_context(&args, &ctx))
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("site", &self.config.site)
            .field("paths", &self.paths)
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}
