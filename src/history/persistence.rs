use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use super::types::HistoryEntry;
use crate::lock;

/// Appends history entries to a JSON-lines file from a background thread.
#[derive(Clone, Debug)]
pub struct FileWriter {
    // Taken and dropped by close() so the thread sees the channel end.
    sender: Arc<Mutex<Option<Sender<HistoryEntry>>>>,
    handle: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> std::io::Result<Self> {
        // Open up front so a bad path fails here instead of inside the thread.
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let (tx, rx) = mpsc::channel::<HistoryEntry>();
        let handle = thread::spawn(move || {
            let mut writer = BufWriter::new(file);
            for entry in rx {
                match serde_json::to_vec(&entry) {
                    Ok(mut bytes) => {
                        bytes.push(b'\n');
                        if let Err(e) = writer.write_all(&bytes) {
                            log::error!("history writer: write to {:?} failed: {}", path, e);
                        }
                        if let Err(e) = writer.flush() {
                            log::error!("history writer: flush of {:?} failed: {}", path, e);
                        }
                    }
                    Err(e) => {
                        log::error!("history writer: failed to encode entry {}: {}", entry.seq, e);
                    }
                }
            }
            let _ = writer.flush();
        });

        Ok(FileWriter {
            sender: Arc::new(Mutex::new(Some(tx))),
            handle: Arc::new(Mutex::new(Some(handle))),
        })
    }

    /// Best effort; entries sent after close() are dropped.
    pub fn send(&self, entry: HistoryEntry) {
        if let Some(tx) = &*lock(&self.sender) {
            let _ = tx.send(entry);
        }
    }

    /// Drop the sender and wait for the thread to flush everything queued.
    pub fn close(&self) {
        lock(&self.sender).take();
        let handle = lock(&self.handle).take();
        if let Some(h) = handle {
            let _ = h.join();
        }
    }
}
