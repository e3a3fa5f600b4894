//! Process-wide tee logging.
//!
//! The original tool keeps a global tee log so the serialized run log can be
//! embedded verbatim into the JavaScript report as `antonieLog`. We keep
//! that behavior but pass the sink explicitly: [`CapturingLayer`] is a
//! `tracing_subscriber` layer that mirrors every formatted event into an
//! in-memory buffer, in addition to whatever the `fmt` layer writes to
//! stderr.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Shared handle to the in-memory log buffer.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<String>>);

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the captured log as a single string, newline-separated.
    pub fn take(&self) -> String {
        self.0.lock().unwrap().clone()
    }
}

/// A `tracing_subscriber` layer that appends a plain-text rendering of each
/// event to a [`LogBuffer`].
pub struct CapturingLayer {
    buffer: LogBuffer,
}

impl CapturingLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        }
    }
}

impl<S> Layer<S> for CapturingLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut buffer = self.buffer.lock_or_panic();
        let _ = writeln!(buffer, "[{}] {}", event.metadata().level(), visitor.message);
    }
}

trait LockOrPanic {
    fn lock_or_panic(&self) -> std::sync::MutexGuard<'_, String>;
}

impl LockOrPanic for LogBuffer {
    fn lock_or_panic(&self) -> std::sync::MutexGuard<'_, String> {
        self.0.lock().unwrap()
    }
}

/// Installs a combined stderr-formatting + in-memory-capturing subscriber as
/// the global default, returning the buffer handle.
pub fn init() -> LogBuffer {
    let buffer = LogBuffer::new();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with(fmt_layer)
        .with(CapturingLayer::new(buffer.clone()));

    let _ = tracing::subscriber::set_global_default(subscriber);

    buffer
}
