use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub const LOG_FILE_NAME: &str = "seatpilot.log";

pub fn event_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs").join(LOG_FILE_NAME)
}

pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Append-only JSON-line event log shared by every component.
///
/// Writes are best effort: a log that cannot be opened never fails the caller.
#[derive(Debug, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            write_lock: Mutex::new(()),
        }
    }

    pub fn under_state_root(state_root: &Path) -> Self {
        Self::new(event_log_path(state_root))
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append("error", event, message);
    }

    pub fn append(&self, level: &str, event: &str, message: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": now_secs(),
            "level": level,
            "event": event,
            "message": message,
        });
        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };

        // interleaved partial lines from worker threads would break the jsonl format
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_one_json_object_per_line() {
        let dir = tempdir().expect("tempdir");
        let log = EventLog::under_state_root(dir.path());
        log.info("catalog.discover", "found 3 tools");
        log.warn("telemetry.stale", "serving previous snapshot");

        let raw = fs::read_to_string(event_log_path(dir.path())).expect("read log");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["level"], "info");
        assert_eq!(first["event"], "catalog.discover");
        assert_eq!(first["message"], "found 3 tools");
    }

    #[test]
    fn disabled_log_is_a_no_op() {
        let log = EventLog::disabled();
        log.error("anything", "ignored");
        assert!(log.path().is_none());
    }
}
