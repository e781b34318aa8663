use crate::config::InputConfig;
use crate::pipeline::InputKind;
use std::path::Path;

/// Decides which files are inputs and what kind they are, based on their extension.
pub struct InputFilter {
    text_extensions: Vec<String>,
    tabular_extensions: Vec<String>,
}

impl InputFilter {
    pub fn new(config: &InputConfig) -> Self {
        let normalize = |exts: &[String]| -> Vec<String> {
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect()
        };

        Self {
            text_extensions: normalize(&config.text_extensions),
            tabular_extensions: normalize(&config.tabular_extensions),
        }
    }

    pub fn kind_for_path(&self, path: &Path) -> Option<InputKind> {
        let extension = path.extension()?.to_str()?.to_lowercase();

        if self.tabular_extensions.contains(&extension) {
            Some(InputKind::Tabular)
        } else if self.text_extensions.contains(&extension) {
            Some(InputKind::Text)
        } else {
            None
        }
    }


    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        match path.file_name().and_then(|s| s.to_str()) {
            // Hidden directories, including spreadsheet lock/backup folders.
            Some(name) => !(name.starts_with('.') && name != "." && name != ".."),
            None => true,
        }
    }

    pub fn is_hidden_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            // `~$book.xlsx` is the owner lock file an office suite keeps next to an open workbook.
            .is_some_and(|name| name.starts_with('.') || name.starts_with("~$"))
    }
}

impl Default for InputFilter {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_detection() {
        let filter = InputFilter::default();

        assert_eq!(filter.kind_for_path(Path::new("numbers.txt")), Some(InputKind::Text));
        assert_eq!(filter.kind_for_path(Path::new("NUMBERS.TXT")), Some(InputKind::Text));
        assert_eq!(filter.kind_for_path(Path::new("book.xlsx")), Some(InputKind::Tabular));
        assert_eq!(filter.kind_for_path(Path::new("book.ods")), Some(InputKind::Tabular));
        assert_eq!(filter.kind_for_path(Path::new("scan.pdf")), None);
        assert_eq!(filter.kind_for_path(Path::new("README")), None);
    }

    #[test]
    fn test_custom_extensions() {
        let config = InputConfig {
            text_extensions: vec![".LOG".to_string()],
            tabular_extensions: vec![],
            max_depth: 1,
        };
        let filter = InputFilter::new(&config);

        assert_eq!(filter.kind_for_path(Path::new("run.log")), Some(InputKind::Text));
        assert_eq!(filter.kind_for_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_directory_traversal() {
        let filter = InputFilter::default();
        assert!(filter.should_traverse_directory(&PathBuf::from("uploads")));
        assert!(!filter.should_traverse_directory(&PathBuf::from(".git")));
    }

    #[test]
    fn test_hidden_files() {
        let filter = InputFilter::default();
        assert!(filter.is_hidden_file(Path::new("~$book.xlsx")));
        assert!(filter.is_hidden_file(Path::new(".numbers.txt")));
        assert!(!filter.is_hidden_file(Path::new("book.xlsx")));
    }
}
