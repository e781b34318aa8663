use crate::config::DEFAULT_MAX_ALLOCATION_ATTEMPTS;
use crate::error::{NumLinksError, Result};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const OUTPUT_EXTENSION: &str = "txt";

/// Hands out sequential file names inside one directory: `P.txt`, `P_1.txt`, `P_2.txt`, ...
///
/// Every name is reserved on disk with an exclusive create before it is returned, and all
/// allocations made through one allocator are serialized behind its mutex. The exclusive
/// create also keeps separate processes sharing the directory from claiming the same name.
#[derive(Debug)]
pub struct NameAllocator {
    directory: PathBuf,
    max_attempts: u64,
    lock: Mutex<()>,
}

impl NameAllocator {
    /// Creates the directory if it does not exist yet.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Result<Self> {
        let directory = directory.into();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                NumLinksError::allocation(
                    &directory,
                    format!("cannot create output directory: {}", e),
                )
            })?;
        }

        if !directory.is_dir() {
            return Err(NumLinksError::allocation(
                &directory,
                "output path exists but is not a directory",
            ));
        }

        Ok(Self {
            directory,
            max_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
            lock: Mutex::new(()),
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name for `index`; index 0 is the bare prefix.
    pub fn candidate_name(prefix: &str, index: u64) -> String {
        if index == 0 {
            format!("{}.{}", prefix, OUTPUT_EXTENSION)
        } else {
            format!("{}_{}.{}", prefix, index, OUTPUT_EXTENSION)
        }
    }

    /// Reserves the first unused name for `prefix`.
    pub fn allocate(&self, prefix: &str) -> Result<PathBuf> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (_, path) = self.reserve_from(prefix, 0)?;
        Ok(path)
    }

    /// Reserves two names for one request: the first unused one, then the next unused one
    /// with a strictly higher index.
    pub fn allocate_pair(&self, prefix: &str) -> Result<(PathBuf, PathBuf)> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let (first_index, first) = self.reserve_from(prefix, 0)?;
        match self.reserve_from(prefix, first_index + 1) {
            Ok((_, second)) => Ok((first, second)),
            Err(e) => {
                self.release(&first);
                Err(e)
            }
        }
    }

    /// Names the next pair allocation would return, without reserving anything.
    pub fn peek_pair(&self, prefix: &str) -> Result<(PathBuf, PathBuf)> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let first_index = self.first_free_index(prefix, 0)?;
        let second_index = self.first_free_index(prefix, first_index + 1)?;

        Ok((
            self.directory.join(Self::candidate_name(prefix, first_index)),
            self.directory.join(Self::candidate_name(prefix, second_index)),
        ))
    }

    /// Removes a reservation that will not be filled.
    pub fn release(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to release reserved file");
            }
        }
    }

    fn reserve_from(&self, prefix: &str, start: u64) -> Result<(u64, PathBuf)> {
        for index in start..start.saturating_add(self.max_attempts) {
            let path = self.directory.join(Self::candidate_name(prefix, index));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!(path = %path.display(), index, "reserved output file");
                    return Ok((index, path));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(NumLinksError::allocation(
                        &self.directory,
                        format!("cannot reserve {}: {}", path.display(), e),
                    ));
                }
            }
        }

        Err(self.exhausted(prefix, start))
    }

    fn first_free_index(&self, prefix: &str, start: u64) -> Result<u64> {
        (start..start.saturating_add(self.max_attempts))
            .find(|&index| !self.directory.join(Self::candidate_name(prefix, index)).exists())
            .ok_or_else(|| self.exhausted(prefix, start))
    }

    fn exhausted(&self, prefix: &str, start: u64) -> NumLinksError {
        NumLinksError::allocation(
            &self.directory,
            format!(
                "no free name for prefix {:?} in {} attempts starting at index {}",
                prefix, self.max_attempts, start
            ),
        )
    }
}
