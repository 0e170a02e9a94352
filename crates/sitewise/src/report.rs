//! Plain-text and JSON reports for the command line.

use std::fmt;

use serde::Serialize;
use sitewise_dispatch::{MainViews, RenderContext, ResolvedView, Tier, UrlArguments};

/// A view class picked for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassChoice {
    pub class: String,
    pub tier: Tier,
}

impl From<&ResolvedView> for ClassChoice {
    fn from(view: &ResolvedView) -> Self {
        Self {
            class: view.class.to_string(),
            tier: view.tier,
        }
    }
}

/// How a request path resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The first path segment, as requested.
    pub segment: String,
    pub view: String,
    pub class: Option<ClassChoice>,
    pub shared: Option<ClassChoice>,
}

impl Resolution {
    pub fn from_context(args: &dyn UrlArguments, ctx: &RenderContext) -> Self {
        Self {
            segment: args.get(0).to_string(),
            view: ctx
                .view_name
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            class: ctx.view.as_ref().map(ClassChoice::from),
            shared: ctx.shared_view.as_ref().map(ClassChoice::from),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let choice = |c: &Option<ClassChoice>| match c {
            Some(c) => format!("{} ({})", c.class, c.tier),
            None => "none".to_string(),
        };
        writeln!(f, "segment: {}", self.segment)?;
        writeln!(f, "view:    {}", self.view)?;
        writeln!(f, "class:   {}", choice(&self.class))?;
        writeln!(f, "shared:  {}", choice(&self.shared))
    }
}

/// Main views as an aligned two-column table.
pub struct ViewListing<'a>(pub &'a MainViews);

impl fmt::Display for ViewListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "no main views");
        }
        let width = self.0.names().map(str::len).max().unwrap_or(0);
        for view in self.0.iter() {
            writeln!(f, "{:<width$}  {}", view.name, view.tier, width = width)?;
        }
        Ok(())
    }
}
