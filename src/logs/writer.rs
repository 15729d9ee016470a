//! Where log files go.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{BuilderError, Result};

/// Whether `folder` names a directory strictly below whatever it is joined to.
///
/// Absolute paths, `..` and paths that collapse to `.` are rejected.
pub fn is_nested_folder(folder: &Path) -> bool {
    let mut depth = 0;
    for component in folder.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

/// Resolve the log folder under the project root, refusing anything that
/// is not strictly inside it.
pub fn log_folder(project_root: &Path, log_root: &Path) -> Result<PathBuf> {
    if !is_nested_folder(log_root) {
        return Err(BuilderError::ConfigValidationError {
            message: format!(
                "log folder '{}' must be a relative path inside the project",
                log_root.display()
            ),
        });
    }
    Ok(project_root.join(log_root))
}

/// Persists log artifacts and run summaries.
pub trait ArtifactWriter {
    /// Empty `log_root` under `project_root`, creating it if needed.
    ///
    /// Fails without touching anything when `log_root` is not strictly
    /// inside the project.
    fn reset(&self, project_root: &Path, log_root: &Path) -> Result<()>;

    /// Write one file, creating parent directories.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// Writes to the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn reset(&self, project_root: &Path, log_root: &Path) -> Result<()> {
        let root = log_folder(project_root, log_root)?;
        if root.exists() {
            tracing::debug!("Clearing log folder {}", root.display());
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

/// Keeps files in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: RefCell<BTreeMap<PathBuf, String>>,
    resets: RefCell<Vec<PathBuf>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths written so far, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    /// File names written so far, sorted.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .borrow()
            .keys()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    pub fn content(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    /// Content of the file with this name, in whatever directory.
    pub fn content_by_name(&self, name: &str) -> Option<String> {
        self.files
            .borrow()
            .iter()
            .find(|(p, _)| p.file_name().is_some_and(|n| n == name))
            .map(|(_, c)| c.clone())
    }

    pub fn resets(&self) -> Vec<PathBuf> {
        self.resets.borrow().clone()
    }
}

impl ArtifactWriter for MemoryWriter {
    fn reset(&self, project_root: &Path, log_root: &Path) -> Result<()> {
        let root = log_folder(project_root, log_root)?;
        self.files.borrow_mut().retain(|p, _| !p.starts_with(&root));
        self.resets.borrow_mut().push(root);
        Ok(())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
