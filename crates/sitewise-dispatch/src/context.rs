//! Per-request render context.
//!
//! [`RenderContext`] is the mutable bag the dispatcher fills in for one
//! request and then hands to the template layer. It carries:
//!
//! | Field | Set by | Template variable |
//! |-------|--------|-------------------|
//! | `view_name` | resolver | `view_name` |
//! | `template_paths` | [`TemplateSetup`](crate::TemplateSetup) | - |
//! | `site_vars` | [`TemplateSetup`](crate::TemplateSetup) | `site` |
//! | `system_vars` | [`TemplateSetup`](crate::TemplateSetup) | `system` |
//! | `shared_view` | resolver (shared slot) | `shared` |
//! | `view` | resolver | `view` |
//! | `extras` | hooks | top-level keys |
//!
//! Context filters registered on [`Hooks`](crate::Hooks) receive the context
//! after it is fully populated and may change any field before rendering.

use serde_json::{Map, Value};
use sitewise_render::TemplateSearchPath;

use crate::view::{ResolvedView, ViewName};

/// Keys the context always sets; extras cannot shadow them.
const RESERVED_KEYS: &[&str] = &["view_name", "site", "system", "shared", "view"];

/// The mutable per-request context passed to view constructors, hooks, and
/// the template layer.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// The view being rendered, once resolved.
    pub view_name: Option<ViewName>,

    /// Directories templates are loaded from, in precedence order.
    pub template_paths: TemplateSearchPath,

    /// Default site-wide variables.
    pub site_vars: Map<String, Value>,

    /// Default system-wide variables.
    pub system_vars: Map<String, Value>,

    /// Instance of the site-wide shared view, if one is configured.
    pub shared_view: Option<ResolvedView>,

    /// Instance of the per-view class, if the view has one.
    pub view: Option<ResolvedView>,

    /// Additional top-level template variables.
    pub extras: Map<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an extra top-level template variable.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extras.insert(key.into(), value.into());
    }

    /// Gets an extra variable by key.
    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Builds the value the template is rendered with.
    ///
    /// Extras are merged at the top level but never replace the reserved keys.
    pub fn template_data(&self) -> Value {
        let mut data = Map::new();

        for (key, value) in &self.extras {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                data.insert(key.clone(), value.clone());
            }
        }

        data.insert(
            "view_name".into(),
            self.view_name
                .as_ref()
                .map(|n| Value::String(n.to_string()))
                .unwrap_or(Value::Null),
        );
        data.insert("site".into(), Value::Object(self.site_vars.clone()));
        data.insert("system".into(), Value::Object(self.system_vars.clone()));
        data.insert(
            "shared".into(),
            self.shared_view
                .as_ref()
                .map(ResolvedView::data)
                .unwrap_or(Value::Null),
        );
        data.insert(
            "view".into(),
            self.view
                .as_ref()
                .map(ResolvedView::data)
                .unwrap_or(Value::Null),
        );

        Value::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ClassId, Tier, View};
    use serde_json::json;

    struct Counter(u32);

    impl View for Counter {
        fn data(&self) -> Value {
            json!({"count": self.0})
        }
    }

    #[test]
    fn test_template_data_empty_context() {
        let ctx = RenderContext::new();
        let data = ctx.template_data();
        assert_eq!(data["view_name"], Value::Null);
        assert_eq!(data["site"], json!({}));
        assert_eq!(data["view"], Value::Null);
        assert_eq!(data["shared"], Value::Null);
    }

    #[test]
    fn test_template_data_with_views() {
        let mut ctx = RenderContext::new();
        ctx.view_name = Some(ViewName::new("about"));
        ctx.site_vars.insert("title".into(), json!("Acme"));
        ctx.view = Some(ResolvedView {
            class: ClassId::new("shared::views::AboutView"),
            tier: Tier::Shared,
            instance: Box::new(Counter(3)),
        });

        let data = ctx.template_data();
        assert_eq!(data["view_name"], "About");
        assert_eq!(data["site"]["title"], "Acme");
        assert_eq!(data["view"]["count"], 3);
    }

    #[test]
    fn test_extras_cannot_shadow_reserved_keys() {
        let mut ctx = RenderContext::new();
        ctx.view_name = Some(ViewName::new("Home"));
        ctx.set_extra("view_name", "Hijacked");
        ctx.set_extra("year", 2026);

        let data = ctx.template_data();
        assert_eq!(data["view_name"], "Home");
        assert_eq!(data["year"], 2026);
        assert_eq!(ctx.get_extra("year"), Some(&json!(2026)));
    }
}
