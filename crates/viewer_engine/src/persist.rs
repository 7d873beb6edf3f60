//! Saving exported images into the download directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("could not create download directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where exports land. Created on first save.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    root: PathBuf,
}

impl DownloadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn prepare(&self) -> Result<&Path, PersistError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PersistError::NotADirectory(self.root.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.root).map_err(|source| PersistError::CreateDir {
                    path: self.root.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(PersistError::CreateDir {
                    path: self.root.clone(),
                    source,
                })
            }
        }
        Ok(&self.root)
    }

    /// Save `bytes` as `filename`, replacing an earlier download of the same
    /// card. The image is staged in a hidden `.part` file and renamed into
    /// place, so a reader never sees a half-written file.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let root = self.prepare()?;
        let target = root.join(filename);
        let write_err = |source: io::Error| PersistError::Write {
            path: target.clone(),
            source,
        };

        let mut part = tempfile::Builder::new()
            .prefix(".export-")
            .suffix(".part")
            .tempfile_in(root)
            .map_err(write_err)?;
        part.write_all(bytes).map_err(write_err)?;
        part.as_file().sync_all().map_err(write_err)?;
        part.persist(&target).map_err(|err| write_err(err.error))?;
        Ok(target)
    }
}
