//! Append-only history of game actions, plus per-user statistics types.

mod endpoints;
pub mod persistence;
pub mod types;

pub use endpoints::{
    get_statistics, list_history, okapi_add_operation_for_get_statistics_,
    okapi_add_operation_for_list_history_, okapi_add_operation_for_reset_progress_,
    reset_progress,
};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use persistence::FileWriter;
use types::{HistoryEntry, HistoryPayload, HistoryQuery};

use crate::error::{GameError, GameResult};
use crate::game::types::UserId;
use crate::lock;

#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Mutex<Vec<HistoryEntry>>,
    seq: AtomicU64,
    writer: Option<FileWriter>,
}

fn now_millis() -> u64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(dur) => dur.as_millis() as u64,
        Err(_) => 0,
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON-lines history file. Blank lines are skipped.
    pub fn load_from_file(path: &Path) -> GameResult<HistoryLog> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut max_seq = 0u64;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: HistoryEntry = serde_json::from_str(&line).map_err(|e| {
                GameError::Internal(format!("corrupt history line in {}: {e}", path.display()))
            })?;
            max_seq = max_seq.max(entry.seq);
            entries.push(entry);
        }
        Ok(HistoryLog {
            entries: Mutex::new(entries),
            seq: AtomicU64::new(max_seq),
            writer: None,
        })
    }

    /// In-memory log, or one restored from and appended to `path`.
    pub fn open(path: Option<&Path>) -> GameResult<HistoryLog> {
        let Some(path) = path else {
            return Ok(HistoryLog::new());
        };
        let mut history = if path.exists() {
            HistoryLog::load_from_file(path)?
        } else {
            HistoryLog::new()
        };
        log::info!(
            "history log at {} ({} entries restored)",
            path.display(),
            history.len()
        );
        history.writer = Some(FileWriter::new(path.to_path_buf())?);
        Ok(history)
    }

    /// Append an entry with the next sequence number.
    pub fn append(&self, user_id: UserId, payload: HistoryPayload) -> HistoryEntry {
        let mut entries = lock(&self.entries);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = HistoryEntry {
            seq,
            user_id,
            action_type: payload.action_type().to_string(),
            payload,
            created_at: now_millis(),
        };
        entries.push(entry.clone());
        if let Some(writer) = &self.writer {
            writer.send(entry.clone());
        }
        entry
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        lock(&self.entries).clone()
    }

    /// One user's entries, newest first, filtered and paged by `query`.
    pub fn for_user(&self, user_id: UserId, query: &HistoryQuery) -> Vec<HistoryEntry> {
        lock(&self.entries)
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .filter(|e| {
                query
                    .action_type
                    .as_deref()
                    .map_or(true, |at| e.action_type == at)
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect()
    }

    /// Flush and close the file writer, if any.
    pub fn shutdown(&self) {
        if let Some(w) = &self.writer {
            w.close();
        }
    }
}
