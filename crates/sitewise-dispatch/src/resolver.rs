//! View name and view class resolution.
//!
//! [`ViewResolver`] answers two questions for a request:
//!
//! 1. Which view renders it? ([`resolve_view_name`](ViewResolver::resolve_view_name))
//! 2. Which class, if any, backs that view? ([`resolve_view_class`](ViewResolver::resolve_view_class))
//!
//! # Main Views
//!
//! Only "main views" can be selected from a URL segment. A main view is any
//! view with a source file (`<Name>.view`) directly inside one of the three
//! view directories. The directories are scanned once, on first use, and the
//! result is kept for the lifetime of the resolver.
//!
//! # Tiers
//!
//! Class candidates are tried in tier order (shared, site, system). A
//! candidate is valid when its source file exists, its id is registered, and
//! it is registered as a view. The first valid candidate is instantiated and
//! the rest are never looked at.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::context::RenderContext;
use crate::locator::{ClassLocator, PathConfiguration, UserSites};
use crate::view::{
    ClassId, ClassRegistry, ResolvedView, Tier, ViewName, SHARED_NAMESPACE, SHARED_VIEW_SLOT,
    SYSTEM_HOME_VIEW, SYSTEM_NAMESPACE, VIEW_SOURCE_EXTENSIONS,
};

/// Home view used when none is configured.
pub const DEFAULT_HOME_VIEW: &str = "Home";

/// A main view and the tier it was first found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainView {
    pub name: String,
    pub tier: Tier,
}

/// Ordered, deduplicated set of main view names.
///
/// Order is shared-tier names first, then site, then system. A name present
/// in several tiers appears once, attributed to the first tier it was seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MainViews {
    entries: Vec<MainView>,
}

impl MainViews {
    /// Builds the set from per-tier name lists, deduplicating in order.
    pub fn from_tiers<I, S>(tiers: I) -> Self
    where
        I: IntoIterator<Item = (Tier, Vec<S>)>,
        S: Into<String>,
    {
        let mut entries: Vec<MainView> = Vec::new();
        for (tier, names) in tiers {
            for name in names {
                let name = name.into();
                if !entries.iter().any(|e| e.name == name) {
                    entries.push(MainView { name, tier });
                }
            }
        }
        Self { entries }
    }

    /// Returns true if `name` is a main view (exact match).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Finds the main view matching `name` case-insensitively.
    pub fn find_ignore_case(&self, name: &str) -> Option<&MainView> {
        if name.is_empty() {
            return None;
        }
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MainView> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of checking one class candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassCheck {
    /// Source exists and the class is a registered view
    Valid,
    /// The class namespace has no source directory
    Unmapped,
    /// No source file at the mapped path
    MissingSource,
    /// Source exists but no class is registered under the id
    NotRegistered,
    /// Registered, but not as a view
    NotAView,
}

impl ClassCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ClassCheck::Valid)
    }
}

/// Resolves view names and view classes across the three tiers.
pub struct ViewResolver {
    paths: Arc<dyn PathConfiguration>,
    sites: Arc<dyn UserSites>,
    locator: ClassLocator,
    classes: ClassRegistry,
    home_view: String,
    main_views: OnceCell<MainViews>,
}

impl ViewResolver {
    /// Creates a resolver with the standard namespace mapping and the default
    /// home view.
    pub fn new(
        paths: Arc<dyn PathConfiguration>,
        sites: Arc<dyn UserSites>,
        classes: ClassRegistry,
    ) -> Self {
        let locator = ClassLocator::for_tiers(paths.as_ref(), sites.as_ref());
        Self {
            paths,
            sites,
            locator,
            classes,
            home_view: DEFAULT_HOME_VIEW.to_string(),
            main_views: OnceCell::new(),
        }
    }

    /// Sets the configured default home view.
    pub fn with_home_view(mut self, home_view: impl Into<String>) -> Self {
        self.home_view = home_view.into();
        self
    }

    /// Replaces the namespace-to-directory mapping.
    pub fn with_locator(mut self, locator: ClassLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn home_view(&self) -> &str {
        &self.home_view
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn locator(&self) -> &ClassLocator {
        &self.locator
    }

    /// The main views, scanning the view directories on first call.
    pub fn main_views(&self) -> &MainViews {
        self.main_views.get_or_init(|| {
            let views = MainViews::from_tiers(
                Tier::ALL
                    .into_iter()
                    .map(|tier| (tier, scan_views_dir(self.paths.views_dir(tier)))),
            );
            tracing::debug!(count = views.len(), "scanned main view directories");
            views
        })
    }

    /// Picks the view for a request.
    ///
    /// `template_exists` reports whether a template file exists for a view;
    /// a main view without a template is never selected. Falls back to the
    /// home view, then to [`SYSTEM_HOME_VIEW`].
    pub fn resolve_view_name<F>(&self, requested: &str, template_exists: F) -> ViewName
    where
        F: Fn(&ViewName) -> bool,
    {
        let main_views = self.main_views();

        let usable = |candidate: &str| {
            main_views
                .find_ignore_case(candidate)
                .map(|view| ViewName::new(&view.name))
                .filter(|name| template_exists(name))
        };

        if let Some(name) = usable(requested) {
            tracing::debug!(requested, view = %name, "resolved requested view");
            return name;
        }

        if let Some(name) = usable(&self.home_view) {
            tracing::debug!(requested, view = %name, "falling back to home view");
            return name;
        }

        tracing::debug!(requested, home = %self.home_view, "falling back to system home view");
        ViewName::new(SYSTEM_HOME_VIEW)
    }

    /// The class candidates for `view`, highest precedence first.
    pub fn view_class_candidates(&self, view: &ViewName) -> [(Tier, ClassId); 3] {
        [
            (Tier::Shared, ClassId::for_view(SHARED_NAMESPACE, view)),
            (Tier::Site, self.sites.view_class_name(view)),
            (Tier::System, ClassId::for_view(SYSTEM_NAMESPACE, view)),
        ]
    }

    /// The class candidates for the shared view slot, highest precedence first.
    pub fn shared_view_candidates(&self) -> [(Tier, ClassId); 3] {
        let slot = ViewName::new(SHARED_VIEW_SLOT);
        [
            (Tier::Shared, ClassId::for_view(SHARED_NAMESPACE, &slot)),
            (Tier::Site, self.sites.shared_view_class_name()),
            (Tier::System, ClassId::for_view(SYSTEM_NAMESPACE, &slot)),
        ]
    }

    /// Checks whether `class` can be used as a view class.
    pub fn check_class(&self, class: &ClassId) -> ClassCheck {
        if !self.locator.is_mapped(class) {
            ClassCheck::Unmapped
        } else if !self.locator.source_exists(class) {
            ClassCheck::MissingSource
        } else if !self.classes.is_known(class) {
            ClassCheck::NotRegistered
        } else if !self.classes.is_view(class) {
            ClassCheck::NotAView
        } else {
            ClassCheck::Valid
        }
    }

    /// Instantiates the first valid class for `view`, if any.
    pub fn resolve_view_class(
        &self,
        view: &ViewName,
        ctx: &RenderContext,
    ) -> Option<ResolvedView> {
        self.instantiate_first_valid(self.view_class_candidates(view), ctx)
    }

    /// Instantiates the first valid shared view class, if any.
    pub fn resolve_shared_view(&self, ctx: &RenderContext) -> Option<ResolvedView> {
        self.instantiate_first_valid(self.shared_view_candidates(), ctx)
    }

    /// Which candidate would be instantiated for `view`, without building it.
    pub fn selected_class(&self, view: &ViewName) -> Option<(Tier, ClassId)> {
        self.view_class_candidates(view)
            .into_iter()
            .find(|(_, class)| self.check_class(class).is_valid())
    }

    fn instantiate_first_valid(
        &self,
        candidates: [(Tier, ClassId); 3],
        ctx: &RenderContext,
    ) -> Option<ResolvedView> {
        let resolved = candidates.into_iter().find_map(|(tier, class)| {
            let check = self.check_class(&class);
            if !check.is_valid() {
                tracing::trace!(%class, %tier, ?check, "skipping view class candidate");
                return None;
            }
            let constructor = self.classes.constructor(&class)?;
            tracing::debug!(%class, %tier, "instantiating view class");
            Some(ResolvedView {
                instance: constructor(ctx),
                class,
                tier,
            })
        });

        if resolved.is_none() {
            tracing::debug!("no view class found in any tier");
        }
        resolved
    }
}

impl std::fmt::Debug for ViewResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewResolver")
            .field("locator", &self.locator)
            .field("classes", &self.classes)
            .field("home_view", &self.home_view)
            .field("main_views", &self.main_views.get())
            .finish_non_exhaustive()
    }
}

/// Names of the view source files directly inside `dir`, sorted.
///
/// A missing directory yields no names; an unreadable one is logged and
/// yields no names.
fn scan_views_dir(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        tracing::trace!(dir = %dir.display(), "view directory does not exist");
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "cannot read view directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| VIEW_SOURCE_EXTENSIONS.contains(&ext))
        })
        .filter_map(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(String::from)
        })
        .collect();
    names.sort();
    names
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn view_name_is_capitalized_and_stable(name in "[a-zA-Z][a-zA-Z0-9_]{0,15}") {
            let view = ViewName::new(&name);
            prop_assert!(view.as_str().starts_with(|c: char| c.is_uppercase()));
            prop_assert_eq!(ViewName::new(view.as_str()), view.clone());
            prop_assert_eq!(view.as_str().to_lowercase(), name.to_lowercase());
        }

        #[test]
        fn main_view_lookup_ignores_case(name in "[A-Z][a-zA-Z]{0,11}", upper in any::<bool>()) {
            let views = MainViews::from_tiers(vec![(Tier::Site, vec![name.clone()])]);
            let requested = if upper { name.to_uppercase() } else { name.to_lowercase() };

            let found = views.find_ignore_case(&requested);
            prop_assert_eq!(found.map(|v| v.name.as_str()), Some(name.as_str()));
        }
    }
}
