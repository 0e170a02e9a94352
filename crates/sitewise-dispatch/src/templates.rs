//! Template collaborators of the dispatcher.
//!
//! - [`TemplateSetup`] fills a fresh [`RenderContext`] with template search
//!   paths and the default site and system variables.
//! - [`ViewTemplates`] answers whether a view has a template and renders it.
//!
//! [`StaticTemplateSetup`] and [`SiteTemplates`] are the default
//! implementations; both are plain data so sites usually build them from
//! configuration.

use std::collections::BTreeMap;
use std::io::Write;

use serde_json::{Map, Value};
use sitewise_render::{MiniJinjaEngine, RenderError, TemplateEngine, TemplateSearchPath};

use crate::context::RenderContext;
use crate::view::ViewName;

/// Populates template paths and default variables on a new context.
pub trait TemplateSetup: Send + Sync {
    fn populate_paths(&self, ctx: &mut RenderContext);
    fn populate_vars(&self, ctx: &mut RenderContext);
}

/// [`TemplateSetup`] from fixed values.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateSetup {
    pub paths: TemplateSearchPath,
    pub site_vars: Map<String, Value>,
    pub system_vars: Map<String, Value>,
}

impl TemplateSetup for StaticTemplateSetup {
    fn populate_paths(&self, ctx: &mut RenderContext) {
        for dir in self.paths.dirs() {
            ctx.template_paths.push_dir(dir.clone());
        }
    }

    fn populate_vars(&self, ctx: &mut RenderContext) {
        ctx.site_vars
            .extend(self.site_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        ctx.system_vars
            .extend(self.system_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Template lookup and rendering for views.
pub trait ViewTemplates: Send + Sync {
    /// Returns true if a template exists for the view `name`.
    fn view_file_exists(&self, ctx: &RenderContext, name: &str) -> bool;

    /// Renders the template of `view` with `ctx` into `out`.
    fn display_view(
        &self,
        ctx: &RenderContext,
        view: &ViewName,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;
}

/// Default [`ViewTemplates`] backed by MiniJinja.
///
/// Templates are loaded from the context's search path. Built-in templates
/// registered with [`with_builtin`](Self::with_builtin) are used only when no
/// file of the same name is found, which is how the system home view always
/// has something to render.
#[derive(Debug, Clone, Default)]
pub struct SiteTemplates {
    builtins: BTreeMap<String, String>,
}

impl SiteTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallback template for `name`.
    pub fn with_builtin(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.builtins.insert(name.into(), source.into());
        self
    }

    pub fn has_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    fn engine_for(&self, ctx: &RenderContext) -> Result<MiniJinjaEngine, RenderError> {
        let mut engine = MiniJinjaEngine::with_search_path(ctx.template_paths.clone());
        for (name, source) in &self.builtins {
            if !ctx.template_paths.exists(name) {
                engine.add_template(name, source)?;
            }
        }
        Ok(engine)
    }
}

impl ViewTemplates for SiteTemplates {
    fn view_file_exists(&self, ctx: &RenderContext, name: &str) -> bool {
        ctx.template_paths.exists(name) || self.has_builtin(name)
    }

    fn display_view(
        &self,
        ctx: &RenderContext,
        view: &ViewName,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let engine = self.engine_for(ctx)?;
        tracing::debug!(view = %view, "rendering view template");
        engine.render_named_to(view.as_str(), &ctx.template_data(), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_static_setup_populates_context() {
        let mut site_vars = Map::new();
        site_vars.insert("title".into(), json!("Acme"));
        let setup = StaticTemplateSetup {
            paths: TemplateSearchPath::new().with_dir("/t/site").with_dir("/t/system"),
            site_vars,
            system_vars: Map::new(),
        };

        let mut ctx = RenderContext::new();
        setup.populate_paths(&mut ctx);
        setup.populate_vars(&mut ctx);

        assert_eq!(ctx.template_paths.dirs().len(), 2);
        assert_eq!(ctx.site_vars["title"], "Acme");
    }

    #[test]
    fn test_builtin_used_when_no_file() {
        let templates = SiteTemplates::new().with_builtin("SystemHome", "built-in {{ view_name }}");
        let mut ctx = RenderContext::new();
        ctx.view_name = Some(ViewName::new("SystemHome"));

        assert!(templates.view_file_exists(&ctx, "SystemHome"));

        let mut out = Vec::new();
        templates
            .display_view(&ctx, &ViewName::new("SystemHome"), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "built-in SystemHome");
    }

    #[test]
    fn test_file_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SystemHome.jinja"), "from disk").unwrap();

        let templates = SiteTemplates::new().with_builtin("SystemHome", "built-in");
        let mut ctx = RenderContext::new();
        ctx.template_paths.push_dir(dir.path());

        let mut out = Vec::new();
        templates
            .display_view(&ctx, &ViewName::new("SystemHome"), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "from disk");
    }

    #[test]
    fn test_missing_template_is_render_error() {
        let templates = SiteTemplates::new();
        let ctx = RenderContext::new();

        assert!(!templates.view_file_exists(&ctx, "About"));
        let mut out = Vec::new();
        let err = templates
            .display_view(&ctx, &ViewName::new("About"), &mut out)
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }
}
