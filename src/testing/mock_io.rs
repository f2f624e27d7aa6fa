//! Temporary files for exercising the registry and source loaders.

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

impl Default for TempDirPath {
    fn default() -> Self {
        Self::new().expect("Failed to create temporary directory")
    }
}

/// A registry document written to a temporary directory.
///
/// # Example
///
/// ```
/// use importprep::testing::{TempRegistry, sample_registry};
///
/// let reg = TempRegistry::shift_jis(sample_registry()).unwrap();
/// assert!(reg.path().exists());
/// ```
pub struct TempRegistry {
    dir: TempDirPath,
    path: PathBuf,
}

impl TempRegistry {
    /// Write `text` encoded with `encoding`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn encoded(text: &str, encoding: &'static Encoding) -> std::io::Result<Self> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path(crate::schema::DEFAULT_REGISTRY_FILE);
        let (bytes, _, _) = encoding.encode(text);
        std::fs::write(&path, &bytes)?;
        Ok(Self { dir, path })
    }

    /// Write `text` as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn utf8(text: &str) -> std::io::Result<Self> {
        Self::encoded(text, UTF_8)
    }

    /// Write `text` as Shift_JIS.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn shift_jis(text: &str) -> std::io::Result<Self> {
        Self::encoded(text, SHIFT_JIS)
    }

    /// A registry path inside a fresh directory where no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn missing() -> std::io::Result<Self> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path(crate::schema::DEFAULT_REGISTRY_FILE);
        Ok(Self { dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
