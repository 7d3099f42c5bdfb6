//! How the engine reports back to whoever drives it.

/// Callbacks invoked synchronously on the processing thread. `progress` fires
/// at most once per segment, `log` at least once per retained, removed or
/// errored frame. Implementations that touch another thread's state must
/// dispatch to it themselves.
pub trait EventSink {
    fn progress(&self, percent: f64, label: &str);
    fn log(&self, message: &str);
}

/// Forwards everything to the `log` crate.
pub struct LogSink;

impl EventSink for LogSink {
    fn progress(&self, percent: f64, label: &str) {
        log::info!("[{percent:5.1}%] {label}");
    }

    fn log(&self, message: &str) {
        log::info!("{message}");
    }
}

/// Swallows everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn progress(&self, _percent: f64, _label: &str) {}

    fn log(&self, _message: &str) {}
}
