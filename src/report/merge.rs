//! Fragment merging
//!
//! Fragments are visited in file-name order, so the report is byte-for-byte
//! stable for an unchanged cache. An unreadable fragment is the one failure
//! that does not abort: it is logged, recorded and left out.

use super::MODE_PREFIX;
use crate::cache::CacheStore;
use crate::error::{CovcacheError, CovcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

/// A fragment left out of the report
#[derive(Debug, Clone)]
pub struct SkippedFragment {
    pub path: PathBuf,
    pub reason: String,
}

/// What went into the report
#[derive(Debug, Default)]
pub struct MergeSummary {
    /// Fragments merged
    pub fragments: usize,
    /// Data lines written (header excluded, blank lines included)
    pub lines: usize,
    /// Fragments that could not be read
    pub skipped: Vec<SkippedFragment>,
    /// Fragments whose header named a different mode
    pub mode_mismatches: Vec<PathBuf>,
}

/// Writes the aggregate report from the cache directory
#[derive(Debug, Clone)]
pub struct ReportMerger {
    mode: String,
}

impl ReportMerger {
    pub fn new(mode: impl Into<String>) -> Self {
        Self { mode: mode.into() }
    }

    /// Header line written once at the top of the report
    pub fn header(&self) -> String {
        format!("{} {}", MODE_PREFIX, self.mode)
    }

    /// Merge every committed fragment in `cache_dir` into `output`
    pub async fn merge(&self, cache_dir: &Path, output: &Path) -> CovcacheResult<MergeSummary> {
        let entries = CacheStore::new(cache_dir).entries().await?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| report_error(output, e))?;
        }
        let file = File::create(output)
            .await
            .map_err(|e| report_error(output, e))?;
        let mut writer = BufWriter::new(file);

        write_line(&mut writer, output, &self.header()).await?;

        let mut summary = MergeSummary::default();
        for entry in entries {
            let content = match fs::read_to_string(&entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping fragment {}: {}", entry.path.display(), e);
                    summary.skipped.push(SkippedFragment {
                        path: entry.path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for line in content.lines() {
                if let Some((_, mode)) = line.split_once(MODE_PREFIX) {
                    if mode.trim() != self.mode {
                        warn!(
                            "Fragment {} uses mode {:?}, report uses {:?}",
                            entry.path.display(),
                            mode.trim(),
                            self.mode
                        );
                        summary.mode_mismatches.push(entry.path.clone());
                    }
                    continue;
                }

                write_line(&mut writer, output, line).await?;
                summary.lines += 1;
            }
            summary.fragments += 1;
        }

        writer.flush().await.map_err(|e| report_error(output, e))?;

        debug!(
            "Merged {} fragments ({} lines) into {}",
            summary.fragments,
            summary.lines,
            output.display()
        );
        Ok(summary)
    }
}

async fn write_line(
    writer: &mut BufWriter<File>,
    output: &Path,
    line: &str,
) -> CovcacheResult<()> {
    writer
        .write_all(line.as_bytes())
        .await
        .map_err(|e| report_error(output, e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| report_error(output, e))
}

fn report_error(output: &Path, source: std::io::Error) -> CovcacheError {
    CovcacheError::ReportWrite {
        path: output.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Checksum, UnitKey};
    use tempfile::TempDir;

    fn sum(c: char) -> Checksum {
        Checksum::parse(&c.to_string().repeat(64)).unwrap()
    }

    fn write_fragment(cache: &Path, unit: &str, content: &[u8]) -> PathBuf {
        let store = CacheStore::new(cache);
        let path = store.path(&UnitKey::encode(unit).unwrap(), &sum('a'));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn merge_single_header_and_all_lines() {
        let temp = TempDir::new().unwrap();
        write_fragment(temp.path(), "a", b"mode: count\na.x:1.1,2.2 1 1\n");
        write_fragment(temp.path(), "b", b"mode: count\nb.x:1.1,2.2 1 0\n");
        let output = temp.path().join("out").join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(temp.path(), &output)
            .await
            .unwrap();

        let report = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            report,
            "mode: count\na.x:1.1,2.2 1 1\nb.x:1.1,2.2 1 0\n"
        );
        assert_eq!(report.matches("mode:").count(), 1);
        assert_eq!(summary.fragments, 2);
        assert_eq!(summary.lines, 2);
        assert!(summary.skipped.is_empty());
    }

    #[tokio::test]
    async fn indented_header_dropped_and_blank_lines_kept() {
        let temp = TempDir::new().unwrap();
        write_fragment(
            temp.path(),
            "a",
            b"  mode: count\na.x:1.1,2.2 1 1\n\nb.x:1.1,2.2 1 0\n",
        );
        let output = temp.path().join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(temp.path(), &output)
            .await
            .unwrap();

        let report = std::fs::read_to_string(&output).unwrap();
        assert_eq!(report, "mode: count\na.x:1.1,2.2 1 1\n\nb.x:1.1,2.2 1 0\n");
        assert_eq!(report.matches("mode:").count(), 1);
        assert_eq!(summary.lines, 3);
        assert!(summary.mode_mismatches.is_empty());
    }

    #[tokio::test]
    async fn empty_cache_writes_header_only() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(&temp.path().join("cache"), &output)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "mode: count\n");
        assert_eq!(summary.fragments, 0);
    }

    #[tokio::test]
    async fn unreadable_fragment_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_fragment(temp.path(), "a", b"mode: count\na.x:1.1,2.2 1 1\n");
        let bad = write_fragment(temp.path(), "b", &[0xff, 0xfe, b'\n']);
        write_fragment(temp.path(), "c", b"mode: count\nc.x:1.1,2.2 1 3\n");
        let output = temp.path().join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(temp.path(), &output)
            .await
            .unwrap();

        assert_eq!(summary.fragments, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, bad);
        let report = std::fs::read_to_string(&output).unwrap();
        assert_eq!(report, "mode: count\na.x:1.1,2.2 1 1\nc.x:1.1,2.2 1 3\n");
    }

    #[tokio::test]
    async fn partial_and_foreign_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path());
        let key = UnitKey::encode("a").unwrap();
        std::fs::write(store.partial_path(&key, &sum('b')), "mode: count\nhalf 1 1\n").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not coverage\n").unwrap();
        let output = temp.path().join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(temp.path(), &output)
            .await
            .unwrap();

        assert_eq!(summary.fragments, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "mode: count\n");
    }

    #[tokio::test]
    async fn mode_mismatch_is_recorded() {
        let temp = TempDir::new().unwrap();
        let path = write_fragment(temp.path(), "a", b"mode: set\na.x:1.1,2.2 1 1\n");
        let output = temp.path().join("profile.cov");

        let summary = ReportMerger::new("count")
            .merge(temp.path(), &output)
            .await
            .unwrap();

        assert_eq!(summary.mode_mismatches, vec![path]);
        assert_eq!(summary.lines, 1);
    }

    #[tokio::test]
    async fn uncreatable_output_is_fatal() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = ReportMerger::new("count")
            .merge(temp.path(), &blocker.join("profile.cov"))
            .await
            .unwrap_err();
        assert!(matches!(err, CovcacheError::ReportWrite { .. }));
    }
}
