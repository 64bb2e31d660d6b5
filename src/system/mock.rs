//! Mock system implementation for testing

use super::System;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// # Example
/// ```
/// use confclass::system::{MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_file("/etc/app.yaml", b"port: 80\n").unwrap();
///
/// assert!(system.read_to_string(Path::new("/missing.yaml")).is_err());
/// assert_eq!(
///     system.read_to_string(Path::new("/etc/app.yaml")).unwrap(),
///     "port: 80\n"
/// );
/// ```
#[derive(Clone, Default)]
pub struct MockSystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MockSystem {
    /// Create a new `MockSystem` with no files
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be created
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        self.write(path.as_ref(), contents)?;
        Ok(self)
    }

    /// Read back a file as a string, if it exists
    #[must_use]
    #[inline]
    pub fn file_contents<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.read_to_string(path.as_ref()).ok()
    }
}

impl System for MockSystem {
    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self
            .files
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let bytes = files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        let result = bytes.clone();
        drop(files);
        String::from_utf8(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut files = self
            .files
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        files.insert(path.to_path_buf(), contents.to_vec());
        drop(files);
        Ok(())
    }
}
