use crate::artifact::allocator::NameAllocator;
use crate::artifact::transformer::FormatTransformer;
use crate::error::{NumLinksError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// The two files produced by one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPair {
    pub plus_path: PathBuf,
    pub link_path: PathBuf,
    pub token_count: usize,
}

impl ArtifactPair {
    pub fn plus_file_name(&self) -> String {
        base_name(&self.plus_path)
    }

    pub fn link_file_name(&self) -> String {
        base_name(&self.link_path)
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub struct ArtifactWriter {
    allocator: Arc<NameAllocator>,
    transformer: FormatTransformer,
    prefix: String,
}

impl ArtifactWriter {
    pub fn new<S: Into<String>>(allocator: Arc<NameAllocator>, prefix: S) -> Self {
        Self {
            allocator,
            transformer: FormatTransformer::new(),
            prefix: prefix.into(),
        }
    }

    pub fn allocator(&self) -> &NameAllocator {
        &self.allocator
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Writes the plus-form and link-form files for `tokens`.
    ///
    /// Either both files end up complete on disk or neither is left behind.
    pub fn write<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ArtifactPair> {
        if tokens.is_empty() {
            return Err(NumLinksError::NoTokensFound);
        }

        let formatted = self.transformer.transform(tokens);
        let (plus_path, link_path) = self.allocator.allocate_pair(&self.prefix)?;

        let written = write_lines(&plus_path, &formatted.plus)
            .and_then(|_| write_lines(&link_path, &formatted.link));

        if let Err(e) = written {
            warn!(
                plus = %plus_path.display(),
                link = %link_path.display(),
                error = %e,
                "discarding partially written artifacts"
            );
            self.allocator.release(&plus_path);
            self.allocator.release(&link_path);
            return Err(e);
        }

        info!(
            plus = %plus_path.display(),
            link = %link_path.display(),
            tokens = formatted.len(),
            "wrote artifacts"
        );

        Ok(ArtifactPair {
            plus_path,
            link_path,
            token_count: formatted.len(),
        })
    }
}

/// Joins `lines` with `\n` (no trailing newline) and swaps the result into `path` in one rename,
/// so a reader never sees a half-written file under the reserved name.
fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let write_error = |source: std::io::Error| NumLinksError::Write {
        path: path.to_path_buf(),
        source,
    };

    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(directory).map_err(write_error)?;

    temp.write_all(lines.join("\n").as_bytes())
        .map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn writer_in(dir: &Path) -> ArtifactWriter {
        let allocator = Arc::new(NameAllocator::new(dir).unwrap());
        ArtifactWriter::new(allocator, "evan")
    }

    #[test]
    fn test_write_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let writer = writer_in(temp_dir.path());
        let tokens = vec!["12345", "999999", "12345"];

        let pair = writer.write(&tokens).unwrap();
        assert_eq!(pair.plus_file_name(), "evan.txt");
        assert_eq!(pair.link_file_name(), "evan_1.txt");
        assert_eq!(pair.token_count, 3);

        let plus = fs::read_to_string(&pair.plus_path).unwrap();
        let link = fs::read_to_string(&pair.link_path).unwrap();
        assert_eq!(plus, "+12345\n+999999\n+12345");
        assert_eq!(
            link.split('\n').collect::<Vec<_>>(),
            vec!["t.me/+12345", "t.me/+999999", "t.me/+12345"]
        );
    }

    #[test]
    fn test_empty_tokens_rejected_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let writer = writer_in(temp_dir.path());
        let tokens: Vec<String> = Vec::new();

        assert!(matches!(writer.write(&tokens), Err(NumLinksError::NoTokensFound)));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_repeated_requests_continue_sequence() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("evan.txt"), "old").unwrap();
        let writer = writer_in(temp_dir.path());

        let first = writer.write(&["11111"]).unwrap();
        let second = writer.write(&["22222"]).unwrap();

        assert_eq!(first.plus_file_name(), "evan_1.txt");
        assert_eq!(first.link_file_name(), "evan_2.txt");
        assert_eq!(second.plus_file_name(), "evan_3.txt");
        assert_eq!(second.link_file_name(), "evan_4.txt");
        assert_eq!(fs::read_to_string(temp_dir.path().join("evan.txt")).unwrap(), "old");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let writer = writer_in(temp_dir.path());
        writer.write(&["12345"]).unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_write_lines_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("evan.txt");
        let result = write_lines(&path, &["+12345".to_string()]);
        assert!(matches!(result, Err(NumLinksError::Write { .. })));
    }
}
