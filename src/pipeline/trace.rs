//! Trace output for teaching pipelines.
//!
//! Lessons wrap their predicates, transforms and combiners so every call
//! writes a line such as `filter:3`, `map   :4` or `reduce:0, 4`. Reading the
//! lines back shows the order in which a drain actually invoked them.
//!
//! Lines go to a [`TraceSink`]. Sinks must accept concurrent writes from
//! parallel workers without garbling a line; the relative order of lines from
//! different workers is not meaningful.

use crate::config::TraceTarget;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Destination for trace lines.
#[cfg_attr(test, mockall::automock)]
pub trait TraceSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes each line to stdout under the stdout lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTrace;

impl TraceSink for ConsoleTrace {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}", line);
    }
}

/// Forwards lines to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn write_line(&self, line: &str) {
        tracing::info!(target: "lazy_pipeline::trace", "{}", line);
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn write_line(&self, _line: &str) {}
}

/// A captured trace line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLine {
    pub at: DateTime<Utc>,
    /// Name of the writing thread, if it has one.
    pub thread: Option<String>,
    pub text: String,
}

/// Sends lines over a crossbeam channel so they can be read back.
///
/// A bounded channel never blocks the writer: lines that do not fit are
/// counted as dropped.
#[derive(Debug, Clone)]
pub struct ChannelTrace {
    tx: Sender<TraceLine>,
    dropped: Arc<AtomicU64>,
}

impl ChannelTrace {
    pub fn bounded(capacity: usize) -> (Self, Receiver<TraceLine>) {
        let (tx, rx) = bounded(capacity);
        (Self::from_sender(tx), rx)
    }

    pub fn unbounded() -> (Self, Receiver<TraceLine>) {
        let (tx, rx) = unbounded();
        (Self::from_sender(tx), rx)
    }

    fn from_sender(tx: Sender<TraceLine>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lines lost because the channel was full or disconnected.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TraceSink for ChannelTrace {
    fn write_line(&self, line: &str) {
        let entry = TraceLine {
            at: Utc::now(),
            thread: std::thread::current().name().map(str::to_string),
            text: line.to_string(),
        };
        if self.tx.try_send(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Cheaply cloneable handle to a trace sink.
#[derive(Clone)]
pub struct Trace {
    sink: Arc<dyn TraceSink>,
}

impl Trace {
    pub fn new(sink: impl TraceSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn console() -> Self {
        Self::new(ConsoleTrace)
    }

    pub fn log() -> Self {
        Self::new(LogTrace)
    }

    pub fn off() -> Self {
        Self::new(NullTrace)
    }

    pub fn from_target(target: TraceTarget) -> Self {
        match target {
            TraceTarget::Console => Self::console(),
            TraceTarget::Log => Self::log(),
            TraceTarget::Off => Self::off(),
        }
    }

    /// Trace handle writing into a fresh unbounded channel.
    pub fn capture() -> (Self, Receiver<TraceLine>) {
        let (sink, rx) = ChannelTrace::unbounded();
        (Self::new(sink), rx)
    }

    pub fn line(&self, text: impl AsRef<str>) {
        self.sink.write_line(text.as_ref());
    }

    /// Wrap a predicate so each call writes `label:item`.
    pub fn predicate<T, P>(&self, label: &'static str, predicate: P) -> impl Fn(&T) -> bool + Send + Sync
    where
        T: Display,
        P: Fn(&T) -> bool + Send + Sync,
    {
        let trace = self.clone();
        move |item: &T| {
            trace.line(format!("{}:{}", label, item));
            predicate(item)
        }
    }

    /// Wrap a transform so each call writes `label:item`.
    pub fn transform<T, U, F>(&self, label: &'static str, transform: F) -> impl Fn(T) -> U + Send + Sync
    where
        T: Display,
        F: Fn(T) -> U + Send + Sync,
    {
        let trace = self.clone();
        move |item: T| {
            trace.line(format!("{}:{}", label, item));
            transform(item)
        }
    }

    /// Wrap a combiner so each call writes `label:left, right`.
    pub fn combiner<A, B, F>(&self, label: &'static str, combiner: F) -> impl Fn(A, B) -> A + Send + Sync
    where
        A: Display,
        B: Display,
        F: Fn(A, B) -> A + Send + Sync,
    {
        let trace = self.clone();
        move |left: A, right: B| {
            trace.line(format!("{}:{}, {}", label, left, right));
            combiner(left, right)
        }
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::console()
    }
}

impl std::fmt::Debug for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trace").finish_non_exhaustive()
    }
}

/// Collect the text of every line currently buffered in `rx`.
pub fn drain_lines(rx: &Receiver<TraceLine>) -> Vec<String> {
    rx.try_iter().map(|line| line.text).collect()
}
