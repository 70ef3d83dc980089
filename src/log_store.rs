use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_RETAINED_LOGS;
use crate::types::GameLog;

/// Capability handed to the round orchestrator for log history. The engine
/// only appends and reads; retention and persistence are the store's
/// concern. Sessions holding a store cross task boundaries, so
/// implementations must be usable from any thread.
pub trait LogStore: Send + Sync {
    fn append(&mut self, entry: &GameLog);
    fn load_all(&self) -> Vec<GameLog>;
    fn clear(&mut self);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLogStore {
    logs: Vec<GameLog>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&mut self, entry: &GameLog) {
        self.logs.push(entry.clone());
        if self.logs.len() > MAX_RETAINED_LOGS {
            let excess = self.logs.len() - MAX_RETAINED_LOGS;
            self.logs.drain(..excess);
        }
    }

    fn load_all(&self) -> Vec<GameLog> {
        self.logs.clone()
    }

    fn clear(&mut self) {
        self.logs.clear();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LogStoreFile {
    version: u8,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    logs: Vec<GameLog>,
}

/// JSON-file backed store. A corrupt or unwritable file is reported and the
/// store resets to empty; round computation is never affected.
pub struct FileLogStore {
    file_path: PathBuf,
    logs: Vec<GameLog>,
}

impl FileLogStore {
    pub fn new(file_path: PathBuf) -> Self {
        let logs = load_logs(&file_path);
        Self { file_path, logs }
    }

    fn save(&mut self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[log-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                self.reset_after_failure();
                return;
            }
        }

        let payload = LogStoreFile {
            version: 1,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            logs: self.logs.clone(),
        };
        match serde_json::to_string(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[log-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                    self.reset_after_failure();
                }
            }
            Err(error) => {
                eprintln!(
                    "[log-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
                self.reset_after_failure();
            }
        }
    }

    fn reset_after_failure(&mut self) {
        self.logs.clear();
        let _ = fs::remove_file(&self.file_path);
    }
}

impl LogStore for FileLogStore {
    fn append(&mut self, entry: &GameLog) {
        self.logs.push(entry.clone());
        if self.logs.len() > MAX_RETAINED_LOGS {
            let excess = self.logs.len() - MAX_RETAINED_LOGS;
            self.logs.drain(..excess);
        }
        self.save();
    }

    fn load_all(&self) -> Vec<GameLog> {
        self.logs.clone()
    }

    fn clear(&mut self) {
        self.logs.clear();
        let _ = fs::remove_file(&self.file_path);
    }
}

fn load_logs(path: &Path) -> Vec<GameLog> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[log-store] failed to read {}: {error}", path.display());
            }
            return Vec::new();
        }
    };
    match serde_json::from_str::<LogStoreFile>(&text) {
        Ok(parsed) if parsed.version == 1 => parsed.logs,
        Ok(parsed) => {
            eprintln!(
                "[log-store] unsupported version {} at {}",
                parsed.version,
                path.display()
            );
            Vec::new()
        }
        Err(error) => {
            eprintln!("[log-store] failed to parse {}: {error}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_log(round: u32) -> GameLog {
        GameLog {
            setting: None,
            id: u64::from(round),
            round,
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            trains: Vec::new(),
            stations: Vec::new(),
            tracks: Vec::new(),
            player_actions: Vec::new(),
            score_change: 0,
            total_score: 0,
            decision_time_used: 0,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!("{}-{}", name, std::process::id());
        std::env::temp_dir().join(unique).join("game_logs.json")
    }

    #[test]
    fn stores_are_usable_from_any_thread() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn LogStore>();
        assert_send_sync::<MemoryLogStore>();
        assert_send_sync::<FileLogStore>();
    }

    #[test]
    fn memory_store_caps_history_dropping_oldest() {
        let mut store = MemoryLogStore::new();
        for round in 0..(MAX_RETAINED_LOGS as u32 + 10) {
            store.append(&make_log(round));
        }
        let logs = store.load_all();
        assert_eq!(logs.len(), MAX_RETAINED_LOGS);
        assert_eq!(logs.first().map(|log| log.round), Some(10));
    }

    #[test]
    fn file_store_round_trips_appended_logs() {
        let path = temp_file("log-store-roundtrip");
        let _ = fs::remove_file(&path);
        {
            let mut store = FileLogStore::new(path.clone());
            store.append(&make_log(0));
            store.append(&make_log(1));
        }
        let reloaded = FileLogStore::new(path.clone());
        let logs = reloaded.load_all();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].round, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_resets_to_empty() {
        let path = temp_file("log-store-corrupt");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        fs::write(&path, "{not json").expect("write file");

        let store = FileLogStore::new(path.clone());
        assert!(store.load_all().is_empty());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn clear_removes_file_and_history() {
        let path = temp_file("log-store-clear");
        let _ = fs::remove_file(&path);
        let mut store = FileLogStore::new(path.clone());
        store.append(&make_log(0));
        store.clear();
        assert!(store.load_all().is_empty());
        assert!(!path.exists());
    }
}
