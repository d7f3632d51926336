use super::{Clock, LiveStateSnapshot, TelemetryError, TelemetrySource};
use crate::shared::EventLog;
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug)]
struct CacheState {
    snapshot: Arc<LiveStateSnapshot>,
    last_attempt_ms: Option<u64>,
    loaded_modified: Option<SystemTime>,
}

/// Telemetry snapshot with a freshness deadline.
///
/// The staleness check and the reload run under one lock, so any number of readers
/// that find the snapshot stale at the same moment cause a single reload attempt.
/// A failed reload keeps serving the previous snapshot.
pub struct TelemetryCache {
    source: Arc<dyn TelemetrySource>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
    log: Arc<EventLog>,
    state: Mutex<CacheState>,
    attempts: AtomicU64,
    loads: AtomicU64,
}

impl TelemetryCache {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        clock: Arc<dyn Clock>,
        freshness: Duration,
        log: Arc<EventLog>,
    ) -> Self {
        Self {
            source,
            clock,
            freshness,
            log,
            state: Mutex::new(CacheState {
                snapshot: Arc::new(LiveStateSnapshot::empty()),
                last_attempt_ms: None,
                loaded_modified: None,
            }),
            attempts: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Fresh-enough snapshot, reloading first when the deadline has passed.
    pub fn get(&self) -> Arc<LiveStateSnapshot> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now_ms();
        let stale = match state.last_attempt_ms {
            None => true,
            Some(last) => now.saturating_sub(last) > self.freshness.as_millis() as u64,
        };
        if stale {
            // failure is logged and the previous snapshot stays in place
            let _ = self.reload_locked(&mut state, now, false);
        }
        Arc::clone(&state.snapshot)
    }

    /// Reloads regardless of the deadline or the modification time.
    pub fn refresh(&self) -> Result<Arc<LiveStateSnapshot>, TelemetryError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now_ms();
        self.reload_locked(&mut state, now, true)?;
        Ok(Arc::clone(&state.snapshot))
    }

    pub fn raw(&self) -> Value {
        self.get().raw().clone()
    }

    pub fn formatted(&self) -> String {
        self.get().formatted()
    }

    pub fn motor_position(&self, motor: &str) -> Option<i64> {
        self.get().motor_position(motor)
    }

    /// Reload attempts made so far, including no-op and failed ones.
    pub fn reload_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Times the source was actually read and parsed successfully.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    fn reload_locked(
        &self,
        state: &mut CacheState,
        now_ms: u64,
        force: bool,
    ) -> Result<(), TelemetryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        state.last_attempt_ms = Some(now_ms);

        let result = self.source.modified().and_then(|modified| {
            let unchanged = modified.is_some() && modified == state.loaded_modified;
            if unchanged && !force {
                return Ok(false);
            }
            let raw = self.source.load()?;
            state.snapshot = Arc::new(LiveStateSnapshot::new(raw, Utc::now()));
            state.loaded_modified = modified;
            Ok(true)
        });

        match result {
            Ok(true) => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                self.log.info(
                    "telemetry.reloaded",
                    &format!("source={}", self.source.describe()),
                );
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                self.log.warn(
                    "telemetry.stale",
                    &format!("source={} error={err}", self.source.describe()),
                );
                Err(err)
            }
        }
    }
}
