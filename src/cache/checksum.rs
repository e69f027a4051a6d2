//! Directory fingerprinting for change detection
//!
//! Every byte of every file under a unit's directory goes through a single
//! SHA-256 accumulator. Entries are visited sorted by file name so the digest
//! does not depend on the order the filesystem happens to list them in.

use crate::error::{CovcacheError, CovcacheResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use walkdir::WalkDir;

const BUF_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 digest of a unit's source tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum(String);

impl Checksum {
    /// Length of the hex encoding
    pub const HEX_LEN: usize = 64;

    /// Parse a checksum from its hex form (lowercase only)
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for display
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental hasher threaded by value through a directory walk
#[derive(Debug, Clone, Default)]
pub struct DirHasher {
    hasher: Sha256,
    files: usize,
}

impl DirHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one file's contents and hand the accumulator back
    pub fn feed_file(mut self, path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut buf = vec![0u8; BUF_SIZE];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.hasher.update(&buf[..n]);
        }
        self.files += 1;
        Ok(self)
    }

    /// Number of files fed so far
    pub fn files(&self) -> usize {
        self.files
    }

    pub fn finish(self) -> Checksum {
        Checksum(hex::encode(self.hasher.finalize()))
    }
}

/// Compute the checksum of every file under `dir`.
///
/// Hidden and vendored directories are included. Symlinks to files
/// contribute their target's bytes; symlinks to directories are not followed.
/// Any walk or read failure fails the whole checksum.
pub fn checksum_dir(dir: &Path) -> CovcacheResult<Checksum> {
    let fail = |source: io::Error| CovcacheError::ChecksumFailed {
        dir: dir.to_path_buf(),
        source,
    };

    let mut hasher = DirHasher::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| fail(e.into()))?;
        let file_type = entry.file_type();

        let is_file = if file_type.is_symlink() {
            entry.path().metadata().map_err(fail)?.is_file()
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        hasher = hasher.feed_file(entry.path()).map_err(|e| {
            fail(io::Error::new(
                e.kind(),
                format!("{}: {}", entry.path().display(), e),
            ))
        })?;
    }

    tracing::trace!("Hashed {} files under {}", hasher.files(), dir.display());
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.go"), "package main\n").unwrap();
        fs::create_dir_all(dir.path().join("internal/util")).unwrap();
        fs::write(dir.path().join("internal/util/util.go"), "package util\n").unwrap();
        dir
    }

    #[test]
    fn checksum_deterministic() {
        let dir = tree();
        let first = checksum_dir(dir.path()).unwrap();
        let second = checksum_dir(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), Checksum::HEX_LEN);
    }

    #[test]
    fn checksum_changes_with_nested_content() {
        let dir = tree();
        let before = checksum_dir(dir.path()).unwrap();

        fs::write(dir.path().join("internal/util/util.go"), "package util \n").unwrap();
        let after = checksum_dir(dir.path()).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn checksum_includes_hidden_directories() {
        let dir = tree();
        let before = checksum_dir(dir.path()).unwrap();

        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/data"), "x").unwrap();

        assert_ne!(before, checksum_dir(dir.path()).unwrap());
    }

    #[test]
    fn empty_dir_is_empty_digest() {
        let dir = TempDir::new().unwrap();
        let checksum = checksum_dir(dir.path()).unwrap();
        assert_eq!(
            checksum.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = checksum_dir(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, CovcacheError::ChecksumFailed { .. }));
    }

    #[test]
    fn hasher_threads_by_value() {
        let dir = tree();
        let hasher = DirHasher::new()
            .feed_file(&dir.path().join("main.go"))
            .unwrap();
        assert_eq!(hasher.files(), 1);
    }

    #[test]
    fn parse_checksum() {
        let hex = "a".repeat(64);
        assert_eq!(Checksum::parse(&hex).unwrap().as_str(), hex);
        assert!(Checksum::parse("abc").is_none());
        assert!(Checksum::parse(&"A".repeat(64)).is_none());
        assert!(Checksum::parse(&"g".repeat(64)).is_none());
        assert_eq!(Checksum::parse(&hex).unwrap().short(), "aaaaaaaaaaaa");
    }
}
