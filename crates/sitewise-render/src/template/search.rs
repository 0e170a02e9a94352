//! Layered template search paths.
//!
//! A [`TemplateSearchPath`] is an ordered list of template directories. Sites
//! register their directories from most to least specific (shared, site,
//! system), and a lookup returns the first matching file.
//!
//! # Resolution
//!
//! For a name like `"About"`:
//!
//! 1. Directories are searched in registration order; the first hit wins.
//! 2. Within a directory, the name is tried as given, then lowercased
//!    (`About` → `about`).
//! 3. Each name is tried with every extension in [`TEMPLATE_EXTENSIONS`], in
//!    priority order.
//!
//! Names that already carry a recognized extension (`"about.jinja"`) are only
//! tried verbatim.
//!
//! Unlike a strict registry, a name present in several directories is not a
//! collision: the earlier directory shadows the later ones. This is how a site
//! overrides a system template.

use std::path::{Component, Path, PathBuf};

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".jinja", ".jinja2", ".j2", ".html"];

/// A template file found on the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// The name the template was requested by (e.g., `"About"`)
    pub name: String,
    /// Absolute path to the template file
    pub path: PathBuf,
    /// The search directory this file was found in
    pub source_dir: PathBuf,
}

/// Ordered list of template directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSearchPath {
    dirs: Vec<PathBuf>,
}

impl TemplateSearchPath {
    /// Creates an empty search path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directory. Earlier directories take precedence.
    ///
    /// Directories are not required to exist; missing ones are skipped at
    /// lookup time.
    pub fn push_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    /// Builder form of [`push_dir`](Self::push_dir).
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.push_dir(dir);
        self
    }

    /// The registered directories, in precedence order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Finds the template file for `name`, if any.
    pub fn find(&self, name: &str) -> Option<TemplateFile> {
        if !is_safe_name(name) {
            tracing::debug!(name, "rejecting template name outside the search path");
            return None;
        }

        let candidates = candidate_file_names(name);
        for dir in &self.dirs {
            for file_name in &candidates {
                let path = dir.join(file_name);
                if path.is_file() {
                    return Some(TemplateFile {
                        name: name.to_string(),
                        path,
                        source_dir: dir.clone(),
                    });
                }
            }
        }
        None
    }

    /// Returns true if a template for `name` exists on the search path.
    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Reads the source of the template for `name`.
    ///
    /// Returns `Ok(None)` when no file matches.
    pub fn load(&self, name: &str) -> std::io::Result<Option<String>> {
        match self.find(name) {
            Some(file) => {
                tracing::trace!(name, path = %file.path.display(), "loading template");
                std::fs::read_to_string(&file.path).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// File names to try for a template name, in priority order.
fn candidate_file_names(name: &str) -> Vec<String> {
    if has_template_extension(name) {
        return vec![name.to_string()];
    }

    let mut stems = vec![name.to_string()];
    let lower = name.to_lowercase();
    if lower != name {
        stems.push(lower);
    }

    stems
        .iter()
        .flat_map(|stem| TEMPLATE_EXTENSIONS.iter().map(move |ext| format!("{stem}{ext}")))
        .collect()
}

fn has_template_extension(name: &str) -> bool {
    TEMPLATE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Template names are relative paths without parent or root components.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
