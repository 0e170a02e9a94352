//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait so the dispatcher does not
//! depend on a particular template backend. The default implementation is
//! [`MiniJinjaEngine`], which resolves template names through a
//! [`TemplateSearchPath`].

use std::io::Write;

use minijinja::{Environment, Error, ErrorKind, Value};

use super::filters::register_filters;
use super::search::TemplateSearchPath;
use crate::error::RenderError;

/// A template engine that can render templates with data.
///
/// Template engines handle:
/// - Template lookup and caching
/// - Variable substitution
/// - Template logic (loops, conditionals, includes)
pub trait TemplateEngine: Send + Sync {
    /// Renders a template string with the given data.
    fn render_template(&self, template: &str, data: &serde_json::Value)
        -> Result<String, RenderError>;

    /// Adds a named template to the engine.
    ///
    /// Registered templates shadow files on the search path.
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError>;

    /// Renders a named template to a string.
    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError>;

    /// Renders a named template into `out`.
    ///
    /// Output is streamed: if rendering fails partway, whatever was produced
    /// before the failure has already been written.
    fn render_named_to(
        &self,
        name: &str,
        data: &serde_json::Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;

    /// Checks if a template with the given name can be found.
    fn has_template(&self, name: &str) -> bool;
}

/// MiniJinja-based template engine.
///
/// Named templates are looked up first among templates added with
/// [`add_template`](TemplateEngine::add_template), then on the search path.
/// `{% include %}` and `{% extends %}` resolve through the same lookup.
///
/// # Example
///
/// ```rust
/// use sitewise_render::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let mut engine = MiniJinjaEngine::new();
/// engine.add_template("Home", "Hello, {{ site.title }}!").unwrap();
///
/// let out = engine
///     .render_named("Home", &json!({"site": {"title": "Acme"}}))
///     .unwrap();
/// assert_eq!(out, "Hello, Acme!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    search: TemplateSearchPath,
}

impl MiniJinjaEngine {
    /// Creates an engine with no search path and the default filters registered.
    pub fn new() -> Self {
        Self::with_search_path(TemplateSearchPath::new())
    }

    /// Creates an engine that loads named templates from `search`.
    pub fn with_search_path(search: TemplateSearchPath) -> Self {
        let mut env = Environment::new();
        register_filters(&mut env);

        let loader_search = search.clone();
        env.set_loader(move |name| {
            loader_search.load(name).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template '{}'", name),
                )
                .with_source(e)
            })
        });

        Self { env, search }
    }

    /// The search path named templates are loaded from.
    pub fn search_path(&self) -> &TemplateSearchPath {
        &self.search
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering custom filters, functions, or globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_template(
        &self,
        template: &str,
        data: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let value = Value::from_serialize(data);
        Ok(self.env.render_str(template, value)?)
    }

    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())?;
        Ok(())
    }

    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(name)?;
        let value = Value::from_serialize(data);
        Ok(tmpl.render(value)?)
    }

    fn render_named_to(
        &self,
        name: &str,
        data: &serde_json::Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let tmpl = self.env.get_template(name)?;
        let value = Value::from_serialize(data);
        tmpl.render_to_write(value, out)?;
        Ok(())
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_render_template_simple() {
        let engine = MiniJinjaEngine::new();
        let output = engine
            .render_template("Hello, {{ name }}!", &json!({"name": "World"}))
            .unwrap();
        assert_eq!(output, "Hello, World!");
    }

    #[test]
    fn test_render_template_with_loop() {
        let engine = MiniJinjaEngine::new();
        let output = engine
            .render_template(
                "{% for item in items %}{{ item }},{% endfor %}",
                &json!({"items": ["a", "b", "c"]}),
            )
            .unwrap();
        assert_eq!(output, "a,b,c,");
    }

    #[test]
    fn test_template_syntax_error() {
        let engine = MiniJinjaEngine::new();
        let result = engine.render_template("{{ unclosed", &serde_json::Value::Null);
        assert!(matches!(result, Err(RenderError::TemplateError(_))));
    }

    #[test]
    fn test_named_template_from_search_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.jinja"), "About {{ site.title }}").unwrap();

        let engine =
            MiniJinjaEngine::with_search_path(TemplateSearchPath::new().with_dir(dir.path()));

        assert!(engine.has_template("About"));
        assert!(!engine.has_template("Contact"));

        let out = engine
            .render_named("About", &json!({"site": {"title": "Acme"}}))
            .unwrap();
        assert_eq!(out, "About Acme");
    }

    #[test]
    fn test_include_resolves_through_search_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("header.jinja"), "[{{ title }}]").unwrap();
        fs::write(
            dir.path().join("Home.jinja"),
            "{% include 'header' %} body",
        )
        .unwrap();

        let engine =
            MiniJinjaEngine::with_search_path(TemplateSearchPath::new().with_dir(dir.path()));
        let out = engine.render_named("Home", &json!({"title": "T"})).unwrap();
        assert_eq!(out, "[T] body");
    }

    #[test]
    fn test_added_template_shadows_search_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Home.jinja"), "from disk").unwrap();

        let mut engine =
            MiniJinjaEngine::with_search_path(TemplateSearchPath::new().with_dir(dir.path()));
        engine.add_template("Home", "inline").unwrap();

        assert_eq!(engine.render_named("Home", &json!({})).unwrap(), "inline");
    }

    #[test]
    fn test_missing_named_template() {
        let engine = MiniJinjaEngine::new();
        let result = engine.render_named("Nope", &json!({}));
        assert!(matches!(result, Err(RenderError::TemplateNotFound(_))));
    }

    #[test]
    fn test_render_named_to_streams_partial_output() {
        let mut engine = MiniJinjaEngine::new();
        engine
            .add_template("Broken", "before {{ missing.field }} after")
            .unwrap();
        engine
            .environment_mut()
            .set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        let mut out = Vec::new();
        let result = engine.render_named_to("Broken", &json!({}), &mut out);
        assert!(result.is_err());
        assert!(String::from_utf8(out).unwrap().starts_with("before"));
    }
}
