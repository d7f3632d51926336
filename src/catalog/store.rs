use super::{discover, CapabilityCatalog};
use crate::config::BackendConfig;
use crate::shared::EventLog;
use crate::transport::BackendTransport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Built {
    catalog: Arc<CapabilityCatalog>,
    at: Instant,
}

/// Process-wide owner of the current catalog.
///
/// Readers take an `Arc` and never block on discovery unless the catalog is missing
/// or expired. Concurrent refreshes collapse into one discovery pass: a caller that
/// waited on the refresh lock while another pass finished reuses that result.
pub struct SharedCatalog {
    backends: Vec<BackendConfig>,
    transport: Arc<dyn BackendTransport>,
    log: Arc<EventLog>,
    max_age: Option<Duration>,
    current: RwLock<Option<Built>>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl SharedCatalog {
    pub fn new(
        backends: Vec<BackendConfig>,
        transport: Arc<dyn BackendTransport>,
        log: Arc<EventLog>,
        max_age: Option<Duration>,
    ) -> Self {
        Self {
            backends,
            transport,
            log,
            max_age,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of completed discovery passes.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The last built catalog, without triggering discovery.
    pub fn peek(&self) -> Option<Arc<CapabilityCatalog>> {
        self.read_built().map(|built| built.catalog)
    }

    /// The catalog to route against, discovering first when none was built yet or
    /// the configured max age has elapsed.
    pub fn current(&self) -> Arc<CapabilityCatalog> {
        if let Some(built) = self.read_built() {
            if !self.is_expired(&built) {
                return built.catalog;
            }
        }

        let _guard = self.refresh_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(built) = self.read_built() {
            if !self.is_expired(&built) {
                return built.catalog;
            }
        }
        self.rebuild()
    }

    /// Forces a discovery pass. Refresh collapses into any pass still in flight when
    /// it is called, even one that began earlier; queued callers get that result.
    pub fn refresh(&self) -> Arc<CapabilityCatalog> {
        let observed = self.generation();
        let _guard = self.refresh_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation() != observed {
            if let Some(catalog) = self.peek() {
                return catalog;
            }
        }
        self.rebuild()
    }

    // caller holds refresh_lock
    fn rebuild(&self) -> Arc<CapabilityCatalog> {
        let catalog = Arc::new(discover(&self.backends, self.transport.as_ref(), &self.log));
        let built = Built {
            catalog: Arc::clone(&catalog),
            at: Instant::now(),
        };
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(built);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.log.info(
            "catalog.refreshed",
            &format!("generation={generation} tools={}", catalog.tool_count()),
        );
        catalog
    }

    fn read_built(&self) -> Option<Built> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_expired(&self, built: &Built) -> bool {
        self.max_age
            .is_some_and(|max_age| built.at.elapsed() > max_age)
    }
}
