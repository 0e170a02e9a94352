//! Where view sources live and how class ids map onto them.
//!
//! Three collaborators decide where the resolver looks:
//!
//! - [`PathConfiguration`] gives the view directory of each [`Tier`].
//! - [`UserSites`] names the site-specific view classes.
//! - [`ClassLocator`] maps a class namespace onto a directory, so a class id
//!   points at exactly one source file:
//!
//! ```text
//! sites::acme::views::ContactView  →  <site views dir>/Contact.view
//! shared::views::admin::UsersView  →  <shared views dir>/admin/Users.view
//! ```

use std::path::{Path, PathBuf};

use crate::view::{
    ClassId, Tier, ViewName, SHARED_NAMESPACE, SHARED_VIEW_SLOT, SYSTEM_NAMESPACE,
    VIEW_CLASS_SUFFIX, VIEW_SOURCE_EXTENSIONS,
};

/// Provides the view directory of each tier.
pub trait PathConfiguration: Send + Sync {
    fn views_dir(&self, tier: Tier) -> &Path;
}

/// The three view directories, one per tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDirs {
    pub shared: PathBuf,
    pub site: PathBuf,
    pub system: PathBuf,
}

impl ViewDirs {
    pub fn new(
        shared: impl Into<PathBuf>,
        site: impl Into<PathBuf>,
        system: impl Into<PathBuf>,
    ) -> Self {
        Self {
            shared: shared.into(),
            site: site.into(),
            system: system.into(),
        }
    }
}

impl PathConfiguration for ViewDirs {
    fn views_dir(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Shared => &self.shared,
            Tier::Site => &self.site,
            Tier::System => &self.system,
        }
    }
}

/// Site-specific naming policy for view classes.
pub trait UserSites: Send + Sync {
    /// Namespace holding the current site's view classes.
    fn site_namespace(&self) -> String;

    /// The site-tier class id for `view`.
    fn view_class_name(&self, view: &ViewName) -> ClassId {
        ClassId::for_view(&self.site_namespace(), view)
    }

    /// The site-tier class id of the shared view slot.
    fn shared_view_class_name(&self) -> ClassId {
        self.view_class_name(&ViewName::new(SHARED_VIEW_SLOT))
    }
}

/// Default naming policy: site classes live in `sites::<site>::views`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedSites {
    site: String,
}

impl NamespacedSites {
    pub fn new(site: impl Into<String>) -> Self {
        Self { site: site.into() }
    }

    pub fn site(&self) -> &str {
        &self.site
    }
}

impl UserSites for NamespacedSites {
    fn site_namespace(&self) -> String {
        format!("sites{}{}{}views", ClassId::SEPARATOR, self.site, ClassId::SEPARATOR)
    }
}

/// Maps class namespaces onto source directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassLocator {
    roots: Vec<(String, PathBuf)>,
}

impl ClassLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard mapping: shared, site, and system namespaces onto the
    /// view directory of their tier.
    pub fn for_tiers(paths: &dyn PathConfiguration, sites: &dyn UserSites) -> Self {
        let mut locator = Self::new();
        locator.map(SHARED_NAMESPACE, paths.views_dir(Tier::Shared));
        locator.map(&sites.site_namespace(), paths.views_dir(Tier::Site));
        locator.map(SYSTEM_NAMESPACE, paths.views_dir(Tier::System));
        locator
    }

    /// Maps `namespace` (and everything below it) onto `dir`.
    ///
    /// When namespaces nest, the longest matching prefix wins.
    pub fn map(&mut self, namespace: &str, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        match self.roots.iter_mut().find(|(ns, _)| ns == namespace) {
            Some(entry) => entry.1 = dir,
            None => self.roots.push((namespace.to_string(), dir)),
        }
    }

    /// The source path of `class` with the primary view extension, or `None`
    /// if its namespace is not mapped.
    pub fn source_path(&self, class: &ClassId) -> Option<PathBuf> {
        self.source_stem(class)
            .map(|stem| with_source_ext(&stem, VIEW_SOURCE_EXTENSIONS[0]))
    }

    /// The existing source file of `class`, if any.
    ///
    /// View names are capitalized, so `AboutView` is looked up as
    /// `About.view` first and then as `about.view`.
    pub fn find_source(&self, class: &ClassId) -> Option<PathBuf> {
        let stem = self.source_stem(class)?;
        let mut stems = vec![stem.clone()];
        if let Some(lowered) = lowercase_first(&stem) {
            stems.push(lowered);
        }

        stems.iter().find_map(|stem| {
            VIEW_SOURCE_EXTENSIONS
                .iter()
                .map(|ext| with_source_ext(stem, ext))
                .find(|path| path.is_file())
        })
    }

    /// Returns true if a source file for `class` exists with any recognized
    /// view extension.
    pub fn source_exists(&self, class: &ClassId) -> bool {
        self.find_source(class).is_some()
    }

    /// Returns true if `class` falls under a mapped namespace.
    pub fn is_mapped(&self, class: &ClassId) -> bool {
        self.root_for(class).is_some()
    }

    fn root_for(&self, class: &ClassId) -> Option<(&str, &Path)> {
        let id = class.as_str();
        self.roots
            .iter()
            .filter(|(ns, _)| {
                id.strip_prefix(ns.as_str())
                    .is_some_and(|rest| rest.starts_with(ClassId::SEPARATOR))
            })
            .max_by_key(|(ns, _)| ns.len())
            .map(|(ns, dir)| (ns.as_str(), dir.as_path()))
    }

    /// Path of the source file without extension.
    fn source_stem(&self, class: &ClassId) -> Option<PathBuf> {
        let (namespace, dir) = self.root_for(class)?;
        let relative = &class.as_str()[namespace.len() + ClassId::SEPARATOR.len()..];

        let mut segments: Vec<&str> = relative.split(ClassId::SEPARATOR).collect();
        let last = segments.pop()?;
        let stem = last.strip_suffix(VIEW_CLASS_SUFFIX).unwrap_or(last);
        if stem.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        let mut path = dir.to_path_buf();
        for segment in segments {
            path.push(segment);
        }
        path.push(stem);
        Some(path)
    }
}

/// `stem` with the first letter of its file name lowercased, if that changes it.
fn lowercase_first(stem: &Path) -> Option<PathBuf> {
    let name = stem.file_name()?.to_str()?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let lowered: String = first.to_lowercase().chain(chars).collect();
    (lowered != name).then(|| stem.with_file_name(lowered))
}

/// Appends `.ext` without touching dots already in the stem.
fn with_source_ext(stem: &Path, ext: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn locator() -> ClassLocator {
        let dirs = ViewDirs::new("/v/shared", "/v/acme", "/v/system");
        ClassLocator::for_tiers(&dirs, &NamespacedSites::new("acme"))
    }

    #[test]
    fn test_namespaced_sites_names() {
        let sites = NamespacedSites::new("acme");
        assert_eq!(
            sites.view_class_name(&ViewName::new("contact")).as_str(),
            "sites::acme::views::ContactView"
        );
        assert_eq!(
            sites.shared_view_class_name().as_str(),
            "sites::acme::views::SharedView"
        );
    }

    #[test]
    fn test_source_path_per_tier() {
        let locator = locator();
        assert_eq!(
            locator.source_path(&ClassId::new("shared::views::ContactView")),
            Some(PathBuf::from("/v/shared/Contact.view"))
        );
        assert_eq!(
            locator.source_path(&ClassId::new("sites::acme::views::ContactView")),
            Some(PathBuf::from("/v/acme/Contact.view"))
        );
        assert_eq!(
            locator.source_path(&ClassId::new("system::views::SystemHomeView")),
            Some(PathBuf::from("/v/system/SystemHome.view"))
        );
    }

    #[test]
    fn test_nested_namespace_maps_to_subdirectory() {
        let locator = locator();
        assert_eq!(
            locator.source_path(&ClassId::new("shared::views::admin::UsersView")),
            Some(PathBuf::from("/v/shared/admin/Users.view"))
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut locator = locator();
        locator.map("shared::views::admin", "/elsewhere");
        assert_eq!(
            locator.source_path(&ClassId::new("shared::views::admin::UsersView")),
            Some(PathBuf::from("/elsewhere/Users.view"))
        );
    }

    #[test]
    fn test_unmapped_and_partial_prefix() {
        let locator = locator();
        assert!(!locator.is_mapped(&ClassId::new("other::ContactView")));
        // "shared::viewsextra" must not match the "shared::views" root
        assert!(!locator.is_mapped(&ClassId::new("shared::viewsextra::ContactView")));
        assert_eq!(locator.source_path(&ClassId::new("ContactView")), None);
    }

    #[test]
    fn test_source_exists() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Contact.view"), "").unwrap();

        let mut locator = ClassLocator::new();
        locator.map(SHARED_NAMESPACE, dir.path());

        assert!(locator.source_exists(&ClassId::new("shared::views::ContactView")));
        assert!(!locator.source_exists(&ClassId::new("shared::views::AboutView")));
    }

    #[test]
    fn test_source_found_with_lowercase_first_letter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.view"), "").unwrap();
        fs::create_dir_all(dir.path().join("admin")).unwrap();
        fs::write(dir.path().join("admin/userList.view"), "").unwrap();

        let mut locator = ClassLocator::new();
        locator.map(SHARED_NAMESPACE, dir.path());

        assert_eq!(
            locator.find_source(&ClassId::new("shared::views::AboutView")),
            Some(dir.path().join("about.view"))
        );
        assert!(locator.source_exists(&ClassId::new("shared::views::admin::UserListView")));
        assert!(!locator.source_exists(&ClassId::new("shared::views::ContactView")));
    }

    #[test]
    fn test_exact_source_preferred() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Home.view"), "").unwrap();

        let mut locator = ClassLocator::new();
        locator.map(SYSTEM_NAMESPACE, dir.path());

        let found = locator
            .find_source(&ClassId::new("system::views::HomeView"))
            .unwrap();
        assert_eq!(found.file_name().unwrap(), "Home.view");
    }

    #[test]
    fn test_remap_replaces_directory() {
        let mut locator = ClassLocator::new();
        locator.map(SYSTEM_NAMESPACE, "/a");
        locator.map(SYSTEM_NAMESPACE, "/b");
        assert_eq!(
            locator.source_path(&ClassId::new("system::views::HomeView")),
            Some(PathBuf::from("/b/Home.view"))
        );
    }
}
