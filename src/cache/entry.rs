//! Cache entry naming
//!
//! A fragment is stored as `<key>.profile.<checksum>`, where `<key>` is the
//! unit identifier with `%` escaped as `%25` and `/` as `%2F`. The escape is
//! injective, so two units never share a key, and parsing a file name yields
//! the exact key segment rather than something that merely contains it.

use super::checksum::Checksum;
use crate::error::{CovcacheError, CovcacheResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between the unit key and the checksum in a file name
pub const PROFILE_MARKER: &str = ".profile.";

/// Suffix of a fragment still being written by the verification command
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Filesystem-safe, collision-free encoding of a unit identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey(String);

impl UnitKey {
    /// Encode a unit identifier
    pub fn encode(unit: &str) -> CovcacheResult<Self> {
        if unit.is_empty() || unit.contains('\0') {
            return Err(CovcacheError::InvalidUnit(unit.to_string()));
        }

        let mut key = String::with_capacity(unit.len());
        for c in unit.chars() {
            match c {
                '%' => key.push_str("%25"),
                '/' => key.push_str("%2F"),
                c => key.push(c),
            }
        }
        Ok(Self(key))
    }

    /// Recover the original unit identifier
    pub fn decode(&self) -> String {
        self.0.replace("%2F", "/").replace("%25", "%")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the committed fragment for `checksum`
    pub fn file_name(&self, checksum: &Checksum) -> String {
        format!("{}{}{}", self.0, PROFILE_MARKER, checksum)
    }

    /// File name the verification command writes into before commit
    pub fn partial_file_name(&self, checksum: &Checksum) -> String {
        format!("{}{}", self.file_name(checksum), PARTIAL_SUFFIX)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file in the cache directory that belongs to some unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheFile {
    /// Committed fragment
    Entry(CacheEntry),
    /// Fragment left behind by an interrupted or failed run
    Partial { key: UnitKey, path: PathBuf },
}

impl CacheFile {
    /// Classify a path by its file name; `None` for foreign files
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (key, rest) = name.rsplit_once(PROFILE_MARKER)?;
        if key.is_empty() {
            return None;
        }
        let key = UnitKey(key.to_string());

        if let Some(checksum) = Checksum::parse(rest) {
            return Some(Self::Entry(CacheEntry {
                key,
                checksum,
                path: path.to_path_buf(),
            }));
        }

        let checksum = rest.strip_suffix(PARTIAL_SUFFIX)?;
        Checksum::parse(checksum)?;
        Some(Self::Partial {
            key,
            path: path.to_path_buf(),
        })
    }

    pub fn key(&self) -> &UnitKey {
        match self {
            Self::Entry(entry) => &entry.key,
            Self::Partial { key, .. } => key,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Entry(entry) => &entry.path,
            Self::Partial { path, .. } => path,
        }
    }
}

/// A committed fragment: (unit, checksum, path)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: UnitKey,
    pub checksum: Checksum,
    pub path: PathBuf,
}

impl CacheEntry {
    /// The unit identifier this fragment was recorded for
    pub fn unit(&self) -> String {
        self.key.decode()
    }
}
