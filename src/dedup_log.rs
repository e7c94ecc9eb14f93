// src/dedup_log.rs
use crate::types::BucketFinderError;
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only result logs, one file per category, where a line is never
/// written twice over the lifetime of the file.
///
/// Each category keeps the set of lines already on disk, read once on first
/// use. Check and append for a category happen under one lock, so workers
/// writing concurrently cannot both append the same line.
pub struct DedupLog {
    dir: PathBuf,
    categories: DashMap<String, Arc<Mutex<CategoryLog>>>,
}

struct CategoryLog {
    path: PathBuf,
    seen: HashSet<String>,
    file: Option<File>,
}

impl CategoryLog {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            seen: HashSet::new(),
            file: None,
        }
    }

    /// Load the lines already on disk and open the file for appending.
    async fn ensure_open(&mut self) -> Result<(), BucketFinderError> {
        if self.file.is_some() {
            return Ok(());
        }

        let mut needs_newline = false;
        // lossy: one bad byte must not lock the category out for the whole scan
        match fs::read(&self.path).await {
            Ok(bytes) => {
                needs_newline = bytes.last().is_some_and(|b| *b != b'\n');
                self.seen.extend(
                    String::from_utf8_lossy(&bytes)
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string),
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        if needs_newline {
            file.write_all(b"\n").await?;
        }
        self.file = Some(file);
        Ok(())
    }

    async fn append(&mut self, line: &str) -> Result<(), BucketFinderError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| BucketFinderError::OutputError(format!("{} is not open", self.path.display())))?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        self.seen.insert(line.to_string());
        Ok(())
    }
}

impl DedupLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            categories: DashMap::new(),
        }
    }

    pub fn path(&self, category: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", category))
    }

    /// Append `line` to `category` unless it is already there.
    /// Returns whether the line was written.
    pub async fn write(&self, category: &str, line: &str) -> Result<bool, BucketFinderError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(false);
        }

        let handle = self
            .categories
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CategoryLog::new(self.path(category)))))
            .clone();

        let mut log = handle.lock().await;
        log.ensure_open().await?;
        if log.seen.contains(line) {
            return Ok(false);
        }
        log.append(line).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    async fn occurrences(path: &Path, line: &str) -> usize {
        fs::read_to_string(path)
            .await
            .unwrap_or_default()
            .lines()
            .filter(|l| *l == line)
            .count()
    }

    #[tokio::test]
    async fn test_existing_log_with_invalid_utf8_stays_writable() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path());
        fs::write(log.path("open"), b"https://acme.s3.amazonaws.com\n\xff\n").await.unwrap();

        assert!(!log.write("open", "https://acme.s3.amazonaws.com").await.unwrap());
        assert!(log.write("open", "https://acme-dev.s3.amazonaws.com").await.unwrap());
        assert!(log.write("open", "https://acme-prod.s3.amazonaws.com").await.unwrap());

        let bytes = fs::read(log.path("open")).await.unwrap();
        assert!(bytes.starts_with(b"https://acme.s3.amazonaws.com\n\xff\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.lines().filter(|l| l.contains("acme-dev")).count(), 1);
        assert_eq!(text.lines().filter(|l| l.contains("acme-prod")).count(), 1);
    }

    #[tokio::test]
    async fn test_same_line_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path());

        assert!(log.write("open", "https://acme.s3.amazonaws.com").await.unwrap());
        assert!(!log.write("open", "https://acme.s3.amazonaws.com").await.unwrap());
        assert_eq!(occurrences(&log.path("open"), "https://acme.s3.amazonaws.com").await, 1);
    }

    #[tokio::test]
    async fn test_different_lines_both_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path());

        log.write("open", "a").await.unwrap();
        log.write("open", "b").await.unwrap();
        let content = fs::read_to_string(log.path("open")).await.unwrap();
        assert_eq!(content, "a\nb\n");
    }

    #[tokio::test]
    async fn test_categories_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path());

        assert!(log.write("open", "a").await.unwrap());
        assert!(log.write("found", "a").await.unwrap());
        assert_eq!(occurrences(&log.path("open"), "a").await, 1);
        assert_eq!(occurrences(&log.path("found"), "a").await, 1);
    }

    #[tokio::test]
    async fn test_idempotent_across_runs() {
        let dir = tempfile::tempdir().unwrap();

        let first = DedupLog::new(dir.path());
        first.write("protected", "https://acme.s3.amazonaws.com").await.unwrap();
        drop(first);

        let second = DedupLog::new(dir.path());
        assert!(!second.write("protected", "https://acme.s3.amazonaws.com").await.unwrap());
        assert!(second.write("protected", "https://other.s3.amazonaws.com").await.unwrap());

        let path = second.path("protected");
        assert_eq!(occurrences(&path, "https://acme.s3.amazonaws.com").await, 1);
        assert_eq!(occurrences(&path, "https://other.s3.amazonaws.com").await, 1);
    }

    #[tokio::test]
    async fn test_existing_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path());
        fs::write(log.path("open"), "a").await.unwrap();

        assert!(!log.write("open", "a").await.unwrap());
        assert!(log.write("open", "b").await.unwrap());
        assert_eq!(fs::read_to_string(log.path("open")).await.unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::new(dir.path().join("nested").join("out"));
        assert!(log.write("found", "a").await.unwrap());
        assert!(log.path("found").exists());
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(DedupLog::new(dir.path()));

        let mut handles = Vec::new();
        for i in 0..32 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.write("found", "shared").await.unwrap();
                log.write("found", &format!("line-{}", i % 4)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let path = log.path("found");
        assert_eq!(occurrences(&path, "shared").await, 1);
        for i in 0..4 {
            assert_eq!(occurrences(&path, &format!("line-{}", i)).await, 1);
        }
    }
}
