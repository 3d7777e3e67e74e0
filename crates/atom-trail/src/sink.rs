//! Trail stores for ATOM entries

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::entry::AtomEntry;
use crate::error::AtomError;

/// File name of the JSONL trail inside the configured directory.
pub const ATOM_TRAIL_FILE: &str = "atom-trail.jsonl";

/// Append-only store for ATOM entries.
///
/// Implementations must write each entry as one indivisible unit and must
/// never rewrite or drop entries already appended.
#[async_trait]
pub trait AtomSink: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: &AtomEntry) -> Result<(), AtomError>;
}

/// In-memory sink for testing
#[derive(Default)]
pub struct MemoryAtomSink {
    entries: RwLock<Vec<AtomEntry>>,
}

impl MemoryAtomSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in write order
    pub fn entries(&self) -> Vec<AtomEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl AtomSink for MemoryAtomSink {
    async fn append(&self, entry: &AtomEntry) -> Result<(), AtomError> {
        self.entries.write().push(entry.clone());
        Ok(())
    }
}

/// Sink that discards every entry (audit disabled).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAtomSink;

#[async_trait]
impl AtomSink for NullAtomSink {
    async fn append(&self, _entry: &AtomEntry) -> Result<(), AtomError> {
        Ok(())
    }
}

/// JSONL sink: one complete entry per line, appended with `O_APPEND`.
///
/// The containing directory is created on first write if absent. Writers in
/// this process are serialized so a line is never interleaved with another.
pub struct FileAtomSink {
    root: PathBuf,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAtomSink {
    /// Sink writing `<root>/atom-trail.jsonl`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(ATOM_TRAIL_FILE);
        Self {
            root,
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries back, for tooling and tests. The engine itself never
    /// reads the trail.
    pub async fn read_all(&self) -> Result<Vec<AtomEntry>, AtomError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut entries = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }

        Ok(entries)
    }
}

#[async_trait]
impl AtomSink for FileAtomSink {
    async fn append(&self, entry: &AtomEntry) -> Result<(), AtomError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.root).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entry::AtomOutcome;

    fn create_entry(decision: &str) -> AtomEntry {
        AtomEntry::builder()
            .decision(decision)
            .rationale("test")
            .outcome(AtomOutcome::Init)
            .tag("test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemoryAtomSink::new();
        assert!(sink.is_empty());

        sink.append(&create_entry("first")).await.unwrap();
        sink.append(&create_entry("second")).await.unwrap();

        let entries = sink.entries();
        assert_eq!(sink.len(), 2);
        assert_eq!(entries[0].decision, "first");
        assert_eq!(entries[1].decision, "second");
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        NullAtomSink.append(&create_entry("ignored")).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_sink_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nested").join("atoms");
        let sink = FileAtomSink::new(&root);
        assert!(!root.exists());

        sink.append(&create_entry("one")).await.unwrap();

        assert!(root.exists());
        assert_eq!(sink.path(), root.join(ATOM_TRAIL_FILE));
    }

    #[tokio::test]
    async fn test_file_sink_one_line_per_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sink = FileAtomSink::new(temp_dir.path());

        for n in 0..3 {
            sink.append(&create_entry(&format!("decision-{}", n))).await.unwrap();
        }

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(raw.ends_with('\n'));
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["outcome"], "INIT");
        }

        let entries = sink.read_all().await.unwrap();
        let decisions: Vec<&str> = entries.iter().map(|e| e.decision.as_str()).collect();
        assert_eq!(decisions, vec!["decision-0", "decision-1", "decision-2"]);
    }

    #[tokio::test]
    async fn test_file_sink_appends_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();

        {
            let sink = FileAtomSink::new(temp_dir.path());
            sink.append(&create_entry("before")).await.unwrap();
        }

        let sink = FileAtomSink::new(temp_dir.path());
        sink.append(&create_entry("after")).await.unwrap();

        let entries = sink.read_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].decision, "before");
    }

    #[tokio::test]
    async fn test_read_all_without_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sink = FileAtomSink::new(temp_dir.path().join("missing"));
        assert!(sink.read_all().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_stay_intact() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FileAtomSink::new(temp_dir.path()));

        let mut handles = Vec::new();
        for n in 0..32 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move {
                let entry = AtomEntry::builder()
                    .decision(format!("concurrent-{}", n))
                    .rationale("x".repeat(4096))
                    .outcome(AtomOutcome::Verify)
                    .build()
                    .unwrap();
                sink.append(&entry).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = sink.read_all().await.unwrap();
        assert_eq!(entries.len(), 32);
        assert!(entries.iter().all(|e| e.rationale.len() == 4096));
    }
}
