use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub cycles_completed: IntCounter,
    pub cycles_aborted: IntCounter,
    pub rows_scanned: IntCounter,
    pub timer_restarts: IntCounter,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("cycles_completed", &self.cycles_completed.get())
            .field("cycles_aborted", &self.cycles_aborted.get())
            .field("rows_scanned", &self.rows_scanned.get())
            .field("timer_restarts", &self.timer_restarts.get())
            .finish()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let cycles_completed = IntCounter::with_opts(Opts::new(
            "cycles_completed",
            "Number of search cycles run to completion",
        ))
        .unwrap();
        let cycles_aborted = IntCounter::with_opts(Opts::new(
            "cycles_aborted",
            "Number of search cycles aborted by an error",
        ))
        .unwrap();
        let rows_scanned =
            IntCounter::with_opts(Opts::new("rows_scanned", "Number of rows matched against a query"))
                .unwrap();
        let timer_restarts = IntCounter::with_opts(Opts::new(
            "timer_restarts",
            "Number of pending debounce timers replaced by newer input",
        ))
        .unwrap();

        registry.register(Box::new(cycles_completed.clone())).ok();
        registry.register(Box::new(cycles_aborted.clone())).ok();
        registry.register(Box::new(rows_scanned.clone())).ok();
        registry.register(Box::new(timer_restarts.clone())).ok();

        Metrics {
            cycles_completed,
            cycles_aborted,
            rows_scanned,
            timer_restarts,
            registry: Arc::new(registry),
        }
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
