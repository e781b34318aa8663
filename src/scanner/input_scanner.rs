use crate::config::InputConfig;
use crate::error::{NumLinksError, Result};
use crate::pipeline::{InputKind, Request};
use crate::scanner::input_filter::InputFilter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Turns command-line paths into requests.
///
/// Files named explicitly always become a request, even with an unknown extension, so that the
/// pipeline can reject them as an unsupported format. Directories contribute only the files
/// whose extension maps to a known input kind.
pub struct InputScanner {
    filter: InputFilter,
    max_depth: usize,
    forced_kind: Option<InputKind>,
    excluded_dirs: Vec<PathBuf>,
}

impl InputScanner {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            filter: InputFilter::new(config),
            max_depth: config.max_depth,
            forced_kind: None,
            excluded_dirs: Vec::new(),
        }
    }

    /// Never walks into `dir`; used to keep generated artifacts from being read back as inputs.
    pub fn excluding_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.excluded_dirs.push(canonical(dir.as_ref()));
        self
    }

    /// Declares every explicitly named file as `kind` instead of guessing from the extension.
    pub fn with_forced_kind(mut self, kind: Option<InputKind>) -> Self {
        self.forced_kind = kind;
        self
    }

    pub fn scan<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Request>> {
        let mut requests = Vec::new();

        for path in paths {
            let path = path.as_ref();

            if path.is_dir() {
                requests.extend(self.scan_directory(path)?);
            } else if path.is_file() {
                requests.push(self.request_for_file(path));
            } else {
                return Err(NumLinksError::InvalidPath {
                    path: format!("{} does not exist", path.display()),
                });
            }
        }

        Ok(requests)
    }

    pub fn scan_directory(&self, root: &Path) -> Result<Vec<Request>> {
        if !root.is_dir() {
            return Err(NumLinksError::InvalidPath {
                path: format!("{} is not a directory", root.display()),
            });
        }

        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        let mut requests = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || self.filter.is_hidden_file(entry.path()) {
                continue;
            }

            if let Some(kind) = self.filter.kind_for_path(entry.path()) {
                requests.push(Request::file(entry.path(), kind));
            }
        }

        Ok(requests)
    }

    fn request_for_file(&self, path: &Path) -> Request {
        if let Some(kind) = self.forced_kind.or_else(|| self.filter.kind_for_path(path)) {
            return Request::file(path, kind);
        }

        let declared = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        Request::File {
            path: PathBuf::from(path),
            kind: declared,
        }
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return true;
        }

        if self.is_excluded(entry.path()) {
            debug!(path = %entry.path().display(), "skipping output directory");
            return false;
        }

        // The root is always entered, whatever its name.
        entry.depth() == 0 || self.filter.should_traverse_directory(entry.path())
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        !self.excluded_dirs.is_empty() && self.excluded_dirs.contains(&canonical(dir))
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl Default for InputScanner {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}
