//! Plugin filter hooks.
//!
//! Hooks let third parties adjust a request without touching view code. They
//! fit into the dispatch flow as follows:
//!
//! ```text
//! context populated (view name, variables, view instances)
//!   → BEFORE-RENDER FILTERS ← (add variables, swap the view instance)
//!   → template renders into the capture buffer
//!   → OUTPUT-BUFFER FILTERS ← (rewrite the captured output)
//!   → output written to the sink
//! ```
//!
//! Filters of the same kind run in registration order, each receiving the
//! result of the previous one.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::context::RenderContext;

/// The filter point a hook runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Runs on the fully populated context, before rendering
    BeforeRender,
    /// Runs on the captured output, before it is written
    OutputBuffer,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::BeforeRender => write!(f, "before-render"),
            HookPhase::OutputBuffer => write!(f, "output-buffer"),
        }
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    /// Human-readable error message
    pub message: String,
    /// The filter point where the error occurred
    pub phase: HookPhase,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    /// Creates a new hook error for the before-render phase.
    pub fn before_render(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::BeforeRender,
            source: None,
        }
    }

    /// Creates a new hook error for the output-buffer phase.
    pub fn output_buffer(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::OutputBuffer,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Type alias for before-render filter functions.
pub type ContextFilterFn = Arc<dyn Fn(&mut RenderContext) -> Result<(), HookError> + Send + Sync>;

/// Type alias for output-buffer filter functions.
pub type OutputFilterFn = Arc<dyn Fn(String) -> Result<String, HookError> + Send + Sync>;

/// Registered filter hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    context_filters: Vec<ContextFilterFn>,
    output_filters: Vec<OutputFilterFn>,
}

impl Hooks {
    /// Creates a new empty hooks configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.context_filters.is_empty() && self.output_filters.is_empty()
    }

    /// Adds a before-render filter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sitewise_dispatch::Hooks;
    ///
    /// let hooks = Hooks::new().context_filter(|ctx| {
    ///     ctx.set_extra("generator", "sitewise");
    ///     Ok(())
    /// });
    /// ```
    pub fn context_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RenderContext) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.context_filters.push(Arc::new(f));
        self
    }

    /// Adds an output-buffer filter.
    pub fn output_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Result<String, HookError> + Send + Sync + 'static,
    {
        self.output_filters.push(Arc::new(f));
        self
    }

    /// Runs all before-render filters. Stops at the first error.
    pub fn apply_context_filter(&self, ctx: &mut RenderContext) -> Result<(), HookError> {
        for filter in &self.context_filters {
            filter(ctx)?;
        }
        Ok(())
    }

    /// Runs all output-buffer filters, chaining transformations.
    pub fn apply_output_filter(&self, output: String) -> Result<String, HookError> {
        let mut current = output;
        for filter in &self.output_filters {
            current = filter(current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("context_filter_count", &self.context_filters.len())
            .field("output_filter_count", &self.output_filters.len())
            .finish()
    }
}
