//! View names, tiers, and the class registry.
//!
//! A view is a template plus an optional view class. View classes are looked
//! up by a qualified [`ClassId`] (`namespace::NameView`) in a
//! [`ClassRegistry`], which maps each id to a constructor. Registration
//! replaces runtime class loading: a site registers its view types once at
//! startup and the resolver picks among them by name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sitewise_render::ucfirst;

use crate::context::RenderContext;

/// Fallback view used when neither the requested view nor the home view resolves.
pub const SYSTEM_HOME_VIEW: &str = "SystemHome";

/// View name of the site-wide shared view slot.
pub const SHARED_VIEW_SLOT: &str = "Shared";

/// Suffix appended to a view name to form its class name.
pub const VIEW_CLASS_SUFFIX: &str = "View";

/// Extensions of view source files in the view directories.
pub const VIEW_SOURCE_EXTENSIONS: &[&str] = &["view"];

/// Namespace of view classes shared across all sites.
pub const SHARED_NAMESPACE: &str = "shared::views";

/// Namespace of the system-provided view classes.
pub const SYSTEM_NAMESPACE: &str = "system::views";

/// One of the three layers views are looked up in, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Shared across every site
    Shared,
    /// Specific to the current site
    Site,
    /// Shipped with the system, used as fallback
    System,
}

impl Tier {
    /// All tiers, highest precedence first.
    pub const ALL: [Tier; 3] = [Tier::Shared, Tier::Site, Tier::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Shared => "shared",
            Tier::Site => "site",
            Tier::System => "system",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A view identifier, always stored with a capitalized first letter.
///
/// ```rust
/// use sitewise_dispatch::ViewName;
///
/// let name = ViewName::new("about");
/// assert_eq!(name.as_str(), "About");
/// assert_eq!(name.class_name(), "AboutView");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ViewName(String);

impl ViewName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(ucfirst(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The unqualified class name for this view (`About` → `AboutView`).
    pub fn class_name(&self) -> String {
        format!("{}{}", self.0, VIEW_CLASS_SUFFIX)
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ViewName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for ViewName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Fully-qualified class identifier, e.g. `sites::acme::views::ContactView`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    /// Separator between namespace segments.
    pub const SEPARATOR: &'static str = "::";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds `namespace::class_name`.
    pub fn in_namespace(namespace: &str, class_name: &str) -> Self {
        if namespace.is_empty() {
            Self(class_name.to_string())
        } else {
            Self(format!("{}{}{}", namespace, Self::SEPARATOR, class_name))
        }
    }

    /// The view class id for `view` in `namespace`.
    pub fn for_view(namespace: &str, view: &ViewName) -> Self {
        Self::in_namespace(namespace, &view.class_name())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last separator (empty for unqualified ids).
    pub fn namespace(&self) -> &str {
        self.0
            .rsplit_once(Self::SEPARATOR)
            .map(|(ns, _)| ns)
            .unwrap_or("")
    }

    /// The last segment of the id.
    pub fn class_name(&self) -> &str {
        self.0
            .rsplit_once(Self::SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Behavior shared by every view class.
///
/// A view instance is built from the [`RenderContext`] of the request (so it
/// can see the site variables and the shared view) and contributes template
/// variables, exposed to the template as `view` (or `shared` for the shared
/// view slot).
pub trait View {
    /// Template variables contributed by this view.
    fn data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Constructor for a registered view class.
pub type ViewConstructor = Arc<dyn Fn(&RenderContext) -> Box<dyn View> + Send + Sync>;

#[derive(Clone)]
enum ClassEntry {
    View(ViewConstructor),
    Plain,
}

/// Registry of known classes.
///
/// Classes registered with [`register_view`](Self::register_view) are view
/// classes and can be instantiated by the resolver. Classes registered with
/// [`register_class`](Self::register_class) are known but are not views; a
/// view candidate that resolves to one of them is rejected like a missing
/// class.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<ClassId, ClassEntry>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view class. Re-registering an id replaces the previous entry.
    pub fn register_view<F>(&mut self, id: impl Into<ClassId>, constructor: F)
    where
        F: Fn(&RenderContext) -> Box<dyn View> + Send + Sync + 'static,
    {
        self.classes
            .insert(id.into(), ClassEntry::View(Arc::new(constructor)));
    }

    /// Registers a class that is not a view.
    pub fn register_class(&mut self, id: impl Into<ClassId>) {
        self.classes.insert(id.into(), ClassEntry::Plain);
    }

    /// Returns true if any class is registered under `id`.
    pub fn is_known(&self, id: &ClassId) -> bool {
        self.classes.contains_key(id)
    }

    /// Returns true if `id` is registered as a view class.
    pub fn is_view(&self, id: &ClassId) -> bool {
        matches!(self.classes.get(id), Some(ClassEntry::View(_)))
    }

    /// The constructor of the view class `id`, if it is one.
    pub fn constructor(&self, id: &ClassId) -> Option<&ViewConstructor> {
        match self.classes.get(id) {
            Some(ClassEntry::View(ctor)) => Some(ctor),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&ClassId> = self.classes.keys().collect();
        ids.sort();
        f.debug_struct("ClassRegistry")
            .field("classes", &ids)
            .finish()
    }
}

/// A view class instance selected for a request.
pub struct ResolvedView {
    /// The class that was instantiated
    pub class: ClassId,
    /// The tier the class was found in
    pub tier: Tier,
    /// The instance itself
    pub instance: Box<dyn View>,
}

impl ResolvedView {
    /// Shortcut for `self.instance.data()`.
    pub fn data(&self) -> serde_json::Value {
        self.instance.data()
    }
}

impl fmt::Debug for ResolvedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedView")
            .field("class", &self.class)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}
