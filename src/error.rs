use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NumLinksError {
    #[error("No valid numbers found in input")]
    NoTokensFound,

    #[error("Unsupported input format: {kind}")]
    UnsupportedFormat { kind: String },

    #[error("Failed to read data source {path}: {message}")]
    DataSource { path: PathBuf, message: String },

    #[error("Failed to allocate output file name in {directory}: {message}")]
    Allocation { directory: PathBuf, message: String },

    #[error("Failed to write artifact {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NumLinksError {
    pub fn data_source<P: Into<PathBuf>, M: ToString>(path: P, message: M) -> Self {
        NumLinksError::DataSource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn allocation<P: Into<PathBuf>, M: ToString>(directory: P, message: M) -> Self {
        NumLinksError::Allocation {
            directory: directory.into(),
            message: message.to_string(),
        }
    }

    /// Errors that end one request but leave the process healthy and the user able to retry.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            NumLinksError::NoTokensFound
                | NumLinksError::UnsupportedFormat { .. }
                | NumLinksError::DataSource { .. }
                | NumLinksError::InvalidPath { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for NumLinksError {
    fn user_message(&self) -> String {
        match self {
            NumLinksError::NoTokensFound => "No valid numbers found".to_string(),
            NumLinksError::UnsupportedFormat { .. } => {
                "Only .txt or spreadsheet files are accepted".to_string()
            }
            NumLinksError::DataSource { path, message } => {
                format!("Could not read {}: {}", path.display(), message)
            }
            NumLinksError::Allocation { .. }
            | NumLinksError::Write { .. }
            | NumLinksError::Internal { .. } => {
                "Internal error while creating output files".to_string()
            }
            NumLinksError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            NumLinksError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            NumLinksError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            NumLinksError::NoTokensFound => Some(
                "Send numbers one per line; each number needs at least the configured minimum number of digits.".to_string()
            ),
            NumLinksError::UnsupportedFormat { .. } => Some(
                "Upload a plain text file (.txt) or a spreadsheet (.xlsx, .xls, .ods), or pass --kind explicitly.".to_string()
            ),
            NumLinksError::DataSource { .. } => Some(
                "Check that the file is not corrupt and that it is a real spreadsheet rather than a renamed file.".to_string()
            ),
            NumLinksError::Allocation { .. } => Some(
                "Ensure the output directory exists and is writable, or choose another with --output-dir.".to_string()
            ),
            NumLinksError::Write { .. } => Some(
                "Check free disk space and permissions on the output directory.".to_string()
            ),
            NumLinksError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for NumLinksError {
    fn from(error: toml::de::Error) -> Self {
        NumLinksError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NumLinksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = NumLinksError::UnsupportedFormat {
            kind: "pdf".to_string(),
        };
        assert!(error.user_message().contains(".txt or spreadsheet"));
        assert!(error.suggestion().is_some());

        assert_eq!(NumLinksError::NoTokensFound.user_message(), "No valid numbers found");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let error = NumLinksError::allocation("/tmp/out", "permission denied");
        assert!(!error.user_message().contains("permission denied"));
        assert!(error.to_string().contains("permission denied"));
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_write_error_keeps_source() {
        use std::error::Error as _;

        let error = NumLinksError::Write {
            path: PathBuf::from("evan.txt"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(error.source().is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse_error = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let error = NumLinksError::from(parse_error);
        assert!(matches!(error, NumLinksError::Config { .. }));
    }
}
