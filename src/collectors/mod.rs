pub mod board;
pub mod command;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod screen;
pub mod sensors;
pub mod system;

use tracing::debug;

/// One data source for a telemetry field. Returns `None` when the source is unavailable.
pub struct Probe<'a, T> {
    pub source: &'static str,
    run: Box<dyn FnOnce() -> Option<T> + 'a>,
}

impl<'a, T> Probe<'a, T> {
    pub fn new(source: &'static str, run: impl FnOnce() -> Option<T> + 'a) -> Self {
        Self {
            source,
            run: Box::new(run),
        }
    }
}

/// Tries each probe in order and stops at the first one that yields a value.
pub fn first_available<'a, T>(
    field: &'static str,
    chain: impl IntoIterator<Item = Probe<'a, T>>,
) -> Option<T> {
    for probe in chain {
        let source = probe.source;
        if let Some(value) = (probe.run)() {
            debug!(field, source, "источник ответил");
            return Some(value);
        }
        debug!(field, source, "источник недоступен");
    }
    None
}
