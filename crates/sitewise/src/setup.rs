//! Error types for site setup.

use sitewise_render::RenderError;

/// Error type for loading configuration and building a [`Site`](crate::Site).
#[derive(Debug)]
pub enum SetupError {
    /// Configuration file could not be parsed or failed validation.
    Config(String),
    /// A built-in template does not compile.
    Template(String),
    /// Two classes registered under the same id.
    DuplicateClass(String),
    /// I/O error while reading configuration.
    Io(std::io::Error),
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Config(msg) => write!(f, "configuration error: {}", msg),
            SetupError::Template(msg) => write!(f, "template error: {}", msg),
            SetupError::DuplicateClass(id) => write!(f, "duplicate view class: {}", id),
            SetupError::Io(err) => write!(f, "setup I/O error: {}", err),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(e: std::io::Error) -> Self {
        SetupError::Io(e)
    }
}

impl From<serde_yaml::Error> for SetupError {
    fn from(e: serde_yaml::Error) -> Self {
        SetupError::Config(e.to_string())
    }
}

impl From<RenderError> for SetupError {
    fn from(e: RenderError) -> Self {
        SetupError::Template(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::Config("site must not be empty".into());
        assert_eq!(err.to_string(), "configuration error: site must not be empty");

        let err = SetupError::DuplicateClass("shared::views::HomeView".into());
        assert_eq!(err.to_string(), "duplicate view class: shared::views::HomeView");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: SetupError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_yaml_error_becomes_config_error() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{ not: a list }").unwrap_err();
        assert!(matches!(SetupError::from(yaml_err), SetupError::Config(_)));
    }
}
