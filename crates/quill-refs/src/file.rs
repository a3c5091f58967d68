//! Durable root pointer stored as a single hex line on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use quill_types::ContentId;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{RefError, Result};
use crate::traits::RootPointer;

/// A [`RootPointer`] persisted to a file.
///
/// The file holds the hex id followed by a newline. A missing file means no
/// root has been published yet. Updates are written to a temporary file next
/// to the target and renamed over it, so readers see either the old or the
/// new id and never a torn write.
#[derive(Debug, Clone)]
pub struct FileRootPointer {
    path: PathBuf,
}

impl FileRootPointer {
    /// Use `path` as the pointer file. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The pointer file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RootPointer for FileRootPointer {
    fn current_root(&self) -> Result<Option<ContentId>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let id = trimmed.parse::<ContentId>().map_err(|e| RefError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(id))
    }

    fn set_current_root(&self, root: &ContentId) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        writeln!(tmp, "{root}")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| RefError::Io(e.error))?;

        info!(root = %root, path = %self.path.display(), "root pointer moved");
        Ok(())
    }
}
