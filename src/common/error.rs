use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoSyncError {
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RepoSyncError {
    pub fn config_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ConfigError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            path,
            source: Some(Box::new(source)),
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Errors raised before any repository is processed (bad root, bad
    /// configuration, bad arguments).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::ValidationError { .. }
        )
    }
}

impl From<std::io::Error> for RepoSyncError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for RepoSyncError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for RepoSyncError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<validator::ValidationErrors> for RepoSyncError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
        Self::validation_error(field, message, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_creation() {
        let error = RepoSyncError::config_error("root does not exist", None);
        assert!(matches!(error, RepoSyncError::ConfigError { .. }));
        assert_eq!(error.to_string(), "Configuration error: root does not exist");
        assert!(error.is_configuration_error());
    }

    #[test]
    fn test_config_error_with_path() {
        let path = PathBuf::from("/test/reposync.yml");
        let error = RepoSyncError::config_error("bad file", Some(path.clone()));
        if let RepoSyncError::ConfigError { path: Some(p), .. } = error {
            assert_eq!(p, path);
        } else {
            panic!("Expected ConfigError with path");
        }
    }

    #[test]
    fn test_validation_error() {
        let error = RepoSyncError::validation_error("branches", "empty", Some(String::new()));
        assert_eq!(error.to_string(), "Validation error: branches - empty");
        assert!(error.is_configuration_error());
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: RepoSyncError = io_error.into();
        assert!(matches!(error, RepoSyncError::FileSystemError { .. }));
        assert!(!error.is_configuration_error());
    }
}
