//! On-disk fragment store
//!
//! The cache directory is flat. Each task only touches files carrying its
//! own exact unit key, so concurrent tasks for different units never race
//! on the same file and no locking is needed.

use super::checksum::Checksum;
use super::entry::{CacheEntry, CacheFile, UnitKey};
use crate::error::{CovcacheError, CovcacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Fragment store rooted at a single directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if needed
    pub async fn ensure_dir(&self) -> CovcacheResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CovcacheError::CacheDir {
                path: self.dir.clone(),
                source: e,
            })
    }

    /// Deterministic location of the fragment for `(unit, checksum)`
    pub fn path(&self, key: &UnitKey, checksum: &Checksum) -> PathBuf {
        self.dir.join(key.file_name(checksum))
    }

    /// Where the verification command writes before the fragment is committed
    pub fn partial_path(&self, key: &UnitKey, checksum: &Checksum) -> PathBuf {
        self.dir.join(key.partial_file_name(checksum))
    }

    /// Whether a committed fragment exists for `(unit, checksum)`
    pub async fn lookup(&self, key: &UnitKey, checksum: &Checksum) -> CovcacheResult<bool> {
        let path = self.path(key, checksum);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CovcacheError::io(
                format!("checking cache entry {}", path.display()),
                e,
            )),
        }
    }

    /// Promote the partial fragment to a committed entry
    pub async fn commit(&self, key: &UnitKey, checksum: &Checksum) -> CovcacheResult<PathBuf> {
        let partial = self.partial_path(key, checksum);
        let path = self.path(key, checksum);

        match fs::rename(&partial, &path).await {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CovcacheError::MissingFragment {
                unit: key.decode(),
                path: partial,
            }),
            Err(e) => Err(CovcacheError::io(
                format!("committing {} to {}", partial.display(), path.display()),
                e,
            )),
        }
    }

    /// Remove a leftover partial fragment, if any
    pub async fn discard_partial(&self, key: &UnitKey, checksum: &Checksum) -> CovcacheResult<()> {
        let partial = self.partial_path(key, checksum);
        remove_if_exists(&partial).await
    }

    /// Delete every file of this unit that is not the current entry.
    ///
    /// Matching is on the exact key segment of the file name, so `a` never
    /// evicts fragments of `a/b` or `ab`. Returns the removed paths.
    pub async fn evict_stale(
        &self,
        key: &UnitKey,
        current: &Checksum,
    ) -> CovcacheResult<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for file in self.scan().await? {
            if file.key() != key {
                continue;
            }
            if let CacheFile::Entry(entry) = &file {
                if &entry.checksum == current {
                    continue;
                }
            }

            debug!("Evicting stale fragment {}", file.path().display());
            remove_if_exists(file.path()).await?;
            removed.push(file.path().to_path_buf());
        }
        Ok(removed)
    }

    /// All committed entries, sorted by file name
    pub async fn entries(&self) -> CovcacheResult<Vec<CacheEntry>> {
        Ok(self
            .scan()
            .await?
            .into_iter()
            .filter_map(|file| match file {
                CacheFile::Entry(entry) => Some(entry),
                CacheFile::Partial { .. } => None,
            })
            .collect())
    }

    /// Remove every entry and partial fragment; foreign files are kept
    pub async fn clear(&self) -> CovcacheResult<usize> {
        let files = self.scan().await?;
        for file in &files {
            remove_if_exists(file.path()).await?;
        }
        Ok(files.len())
    }

    /// Every unit-owned file in the cache directory, sorted by file name.
    /// A missing directory is an empty cache.
    async fn scan(&self) -> CovcacheResult<Vec<CacheFile>> {
        let context = || format!("reading cache directory {}", self.dir.display());

        let mut read_dir = match fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CovcacheError::io(context(), e)),
        };

        let mut files = Vec::new();
        while let Some(dirent) = read_dir
            .next_entry()
            .await
            .map_err(|e| CovcacheError::io(context(), e))?
        {
            let file_type = dirent
                .file_type()
                .await
                .map_err(|e| CovcacheError::io(context(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(file) = CacheFile::from_path(&dirent.path()) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(files)
    }
}

async fn remove_if_exists(path: &Path) -> CovcacheResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CovcacheError::io(format!("removing {}", path.display()), e)),
    }
}
