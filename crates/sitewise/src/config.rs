//! Site configuration.
//!
//! A site is described by one YAML file. Every field is optional:
//!
//! ```yaml
//! site: acme
//! home_view: Home
//! root: /srv/sitewise
//! paths:
//!   shared_views: shared/views
//!   site_views: sites/acme/views
//!   system_views: system/views
//!   shared_templates: shared/templates
//!   site_templates: sites/acme/templates
//!   system_templates: system/templates
//! site_vars:
//!   title: Acme
//! system_vars:
//!   version: "1"
//! ```
//!
//! Relative paths are joined onto `root`. When `root` is not set it defaults
//! to the directory holding the configuration file, or the working directory
//! for configuration parsed from a string.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sitewise_dispatch::{ViewDirs, DEFAULT_HOME_VIEW};
use sitewise_render::TemplateSearchPath;

use crate::setup::SetupError;

/// Site identifier used when the configuration names none.
pub const DEFAULT_SITE: &str = "default";

/// Configuration of one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identifier, used in the site class namespace and default paths.
    pub site: String,
    /// View rendered when the request names no usable view.
    pub home_view: String,
    /// Base directory for relative paths.
    pub root: Option<PathBuf>,
    pub paths: PathsConfig,
    /// Default site-wide template variables.
    pub site_vars: Map<String, Value>,
    /// Default system-wide template variables.
    pub system_vars: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE.to_string(),
            home_view: DEFAULT_HOME_VIEW.to_string(),
            root: None,
            paths: PathsConfig::default(),
            site_vars: Map::new(),
            system_vars: Map::new(),
        }
    }
}

/// Directory overrides; unset entries use the conventional layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub shared_views: Option<PathBuf>,
    pub site_views: Option<PathBuf>,
    pub system_views: Option<PathBuf>,
    pub shared_templates: Option<PathBuf>,
    pub site_templates: Option<PathBuf>,
    pub system_templates: Option<PathBuf>,
}

/// Directories of a site after applying defaults and the root.
#[derive(Debug, Clone, PartialEq)]
pub struct SitePaths {
    pub views: ViewDirs,
    /// Template directories, shared first.
    pub templates: TemplateSearchPath,
}

impl SiteConfig {
    /// Parses configuration from YAML content.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if the YAML is malformed, has unknown
    /// keys, or names an invalid site or home view.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sitewise::SiteConfig;
    ///
    /// let config = SiteConfig::from_yaml_str("site: acme\nsite_vars: { title: Acme }").unwrap();
    /// assert_eq!(config.site, "acme");
    /// assert_eq!(config.home_view, "Home");
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SetupError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    ///
    /// A missing `root` defaults to the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SetupError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", path.display(), e),
            ))
        })?;

        let mut config = Self::from_yaml_str(&content).map_err(|e| match e {
            SetupError::Config(msg) => SetupError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        if config.root.is_none() {
            config.root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf);
        }
        tracing::debug!(config = %path.display(), site = %config.site, "loaded site configuration");
        Ok(config)
    }

    /// The base directory relative paths are joined onto.
    pub fn root_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolves every directory of the site.
    ///
    /// Unset view directories default to `shared/views`,
    /// `sites/<site>/views` and `system/views`; template directories follow
    /// the same layout with `templates`.
    pub fn resolve_paths(&self) -> SitePaths {
        let root = self.root_dir();
        let site_dir = Path::new("sites").join(&self.site);
        let resolve = |configured: &Option<PathBuf>, default: PathBuf| {
            let path = configured.clone().unwrap_or(default);
            if path.is_absolute() {
                path
            } else {
                root.join(path)
            }
        };

        let paths = &self.paths;
        let views = ViewDirs::new(
            resolve(&paths.shared_views, PathBuf::from("shared/views")),
            resolve(&paths.site_views, site_dir.join("views")),
            resolve(&paths.system_views, PathBuf::from("system/views")),
        );
        let templates = TemplateSearchPath::new()
            .with_dir(resolve(&paths.shared_templates, PathBuf::from("shared/templates")))
            .with_dir(resolve(&paths.site_templates, site_dir.join("templates")))
            .with_dir(resolve(&paths.system_templates, PathBuf::from("system/templates")));

        SitePaths { views, templates }
    }

    fn validate(&self) -> Result<(), SetupError> {
        let site_ok = !self.site.is_empty()
            && self
                .site
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !site_ok {
            return Err(SetupError::Config(format!(
                "invalid site identifier '{}': use letters, digits, '_' or '-'",
                self.site
            )));
        }
        if self.home_view.trim().is_empty() {
            return Err(SetupError::Config("home_view must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(SiteConfig::from_yaml_str("").unwrap(), SiteConfig::default());
        assert_eq!(SiteConfig::from_yaml_str("  \n").unwrap().site, DEFAULT_SITE);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
site: acme
home_view: Welcome
root: /srv/web
paths:
  site_templates: custom/templates
site_vars:
  title: Acme
  nav: [home, about]
system_vars:
  version: "2"
"#;
        let config = SiteConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.site, "acme");
        assert_eq!(config.home_view, "Welcome");
        assert_eq!(config.root, Some(PathBuf::from("/srv/web")));
        assert_eq!(config.site_vars["title"], json!("Acme"));
        assert_eq!(config.site_vars["nav"], json!(["home", "about"]));
        assert_eq!(config.system_vars["version"], json!("2"));
        assert_eq!(
            config.paths.site_templates,
            Some(PathBuf::from("custom/templates"))
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SiteConfig::from_yaml_str("sites: acme").unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
    }

    #[test]
    fn test_invalid_site_rejected() {
        for site in ["''", "acme::evil", "a/b"] {
            let err = SiteConfig::from_yaml_str(&format!("site: {}", site)).unwrap_err();
            assert!(err.to_string().contains("invalid site identifier"), "{}", site);
        }
    }

    #[test]
    fn test_empty_home_view_rejected() {
        let err = SiteConfig::from_yaml_str("home_view: ''").unwrap_err();
        assert!(err.to_string().contains("home_view"));
    }

    #[test]
    fn test_resolve_default_layout() {
        let config = SiteConfig {
            site: "acme".into(),
            root: Some(PathBuf::from("/srv/web")),
            ..SiteConfig::default()
        };
        let paths = config.resolve_paths();

        assert_eq!(paths.views.shared, PathBuf::from("/srv/web/shared/views"));
        assert_eq!(paths.views.site, PathBuf::from("/srv/web/sites/acme/views"));
        assert_eq!(paths.views.system, PathBuf::from("/srv/web/system/views"));
        assert_eq!(
            paths.templates.dirs(),
            [
                PathBuf::from("/srv/web/shared/templates"),
                PathBuf::from("/srv/web/sites/acme/templates"),
                PathBuf::from("/srv/web/system/templates"),
            ]
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_overrides() {
        let mut config = SiteConfig {
            root: Some(PathBuf::from("/srv/web")),
            ..SiteConfig::default()
        };
        config.paths.system_views = Some(PathBuf::from("/opt/sitewise/views"));
        config.paths.shared_views = Some(PathBuf::from("common"));

        let paths = config.resolve_paths();
        assert_eq!(paths.views.system, PathBuf::from("/opt/sitewise/views"));
        assert_eq!(paths.views.shared, PathBuf::from("/srv/web/common"));
    }

    #[test]
    fn test_load_defaults_root_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("site.yaml");
        std::fs::write(&file, "site: acme\n").unwrap();

        let config = SiteConfig::load(&file).unwrap();
        assert_eq!(config.root, Some(dir.path().to_path_buf()));
        assert_eq!(
            config.resolve_paths().views.site,
            dir.path().join("sites/acme/views")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = SiteConfig::load("/definitely/not/here/site.yaml").unwrap_err();
        assert!(matches!(err, SetupError::Io(_)));
        assert!(err.to_string().contains("/definitely/not/here/site.yaml"));
    }

    #[test]
    fn test_load_reports_file_in_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.yaml");
        std::fs::write(&file, "site: [unclosed").unwrap();

        let err = SiteConfig::load(&file).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
