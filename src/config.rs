use crate::error::{NumLinksError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on candidate names probed for one allocation.
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: u64 = 10_000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Shortest digit run accepted as a token.
    pub min_token_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub max_allocation_attempts: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub text_extensions: Vec<String>,
    pub tabular_extensions: Vec<String>,
    pub max_depth: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_token_length: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output_files"),
            prefix: "evan".to_string(),
            max_allocation_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            text_extensions: vec!["txt".to_string(), "text".to_string(), "csv".to_string()],
            tabular_extensions: vec![
                "xlsx".to_string(),
                "xlsm".to_string(),
                "xlsb".to_string(),
                "xls".to_string(),
                "ods".to_string(),
            ],
            max_depth: 4,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(NumLinksError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NumLinksError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| NumLinksError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["numlinks.toml", ".numlinks.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(min_length) = cli_args.min_token_length {
            self.extraction.min_token_length = min_length;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(ref prefix) = cli_args.prefix {
            self.output.prefix = prefix.trim().to_string();
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.input.max_depth = max_depth;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| NumLinksError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| NumLinksError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.min_token_length == 0 {
            return Err(NumLinksError::Config {
                message: "Minimum token length must be greater than 0".to_string(),
            });
        }

        validate_prefix(&self.output.prefix)?;

        if self.output.max_allocation_attempts == 0 {
            return Err(NumLinksError::Config {
                message: "Maximum allocation attempts must be greater than 0".to_string(),
            });
        }

        if self.input.text_extensions.is_empty() && self.input.tabular_extensions.is_empty() {
            return Err(NumLinksError::Config {
                message: "At least one input file extension must be specified".to_string(),
            });
        }

        if self.input.max_depth == 0 {
            return Err(NumLinksError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// A prefix becomes the stem of every output file, so it must be a plain file name.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    let invalid = |message: &str| NumLinksError::Config {
        message: format!("Invalid output prefix {:?}: {}", prefix, message),
    };

    if prefix.is_empty() {
        return Err(invalid("prefix must not be empty"));
    }

    if prefix.len() > 100 {
        return Err(invalid("prefix must be 100 characters or less"));
    }

    if prefix.starts_with('.') {
        return Err(invalid("prefix cannot start with a dot"));
    }

    let has_bad_char = prefix.chars().any(|c| {
        matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*' | '/' | '\\') || c.is_control()
    });
    if has_bad_char {
        return Err(invalid("prefix contains path separators or reserved characters"));
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub min_token_length: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub max_depth: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_token_length(mut self, min_length: Option<usize>) -> Self {
        self.min_token_length = min_length;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
