use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cockpit_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One record of an invocation, written after the outcome is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub mode: String,
    /// `"ok"` or `"error"`.
    pub status: String,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Append-only sink for evidence entries.
#[async_trait]
pub trait EvidenceSink: Send + Sync {
    async fn append(&self, entry: &EvidenceEntry) -> Result<()>;
}

pub struct NoopEvidence;

#[async_trait]
impl EvidenceSink for NoopEvidence {
    async fn append(&self, _entry: &EvidenceEntry) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per line to a file, creating it on first use.
pub struct JsonlEvidenceLog {
    path: PathBuf,
    // serializes appends so concurrent lines never interleave
    write_lock: Mutex<()>,
}

impl JsonlEvidenceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EvidenceSink for JsonlEvidenceLog {
    async fn append(&self, entry: &EvidenceEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
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
    use super::*;
    use serde_json::json;

    fn entry(agent: &str, status: &str) -> EvidenceEntry {
        EvidenceEntry {
            timestamp: Utc::now(),
            agent: agent.to_string(),
            mode: "local".to_string(),
            status: status.to_string(),
            input: json!("hi"),
            detail: None,
        }
    }

    #[tokio::test]
    async fn jsonl_log_appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlEvidenceLog::new(dir.path().join("evidence.jsonl"));

        log.append(&entry("echo", "ok")).await.unwrap();
        log.append(&entry("ghc_dt", "error")).await.unwrap();

        let contents = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<EvidenceEntry> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].agent, "echo");
        assert_eq!(lines[1].status, "error");
    }

    #[tokio::test]
    async fn jsonl_log_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlEvidenceLog::new(dir.path().join("missing").join("evidence.jsonl"));
        assert!(log.append(&entry("echo", "ok")).await.is_err());
    }

    #[tokio::test]
    async fn noop_accepts_everything() {
        assert!(NoopEvidence.append(&entry("echo", "ok")).await.is_ok());
    }
}
