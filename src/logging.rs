//! Tracing setup and optional log forwarding.
//!
//! Nothing here runs on its own: the binary calls [`init_tracing`], and a
//! host that wants to mirror logs elsewhere installs a [`LogForwarder`]
//! through [`init_tracing_with_forwarder`] and subscribes to it.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Default channel capacity for forwarded log records.
pub const FORWARD_CHANNEL_CAPACITY: usize = 256;

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("docverify=debug")
        } else {
            EnvFilter::new("docverify=warn")
        }
    })
}

/// Install the global subscriber: `RUST_LOG` if set, otherwise `warn`
/// (or `debug` when `verbose`). Output goes to stderr.
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(verbose: bool) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Same as [`init_tracing`], with `forwarder` receiving every record that
/// passes the filter.
pub fn init_tracing_with_forwarder(verbose: bool, forwarder: LogForwarder) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(forwarder)
        .try_init()
        .is_ok()
}

/// One log record as seen by forwarding subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardedLog {
    pub level: String,
    pub target: String,
    pub message: String,
    /// Remaining event fields rendered as `key=value`
    pub fields: Vec<String>,
    pub timestamp: String,
}

/// A `tracing` layer that copies records onto a broadcast channel.
///
/// Records are dropped silently when nobody is subscribed.
#[derive(Debug, Clone)]
pub struct LogForwarder {
    tx: broadcast::Sender<ForwardedLog>,
    min_level: Level,
}

impl LogForwarder {
    /// Create a forwarder and the first receiver for it.
    pub fn channel() -> (Self, broadcast::Receiver<ForwardedLog>) {
        let (tx, rx) = broadcast::channel(FORWARD_CHANNEL_CAPACITY);
        (
            Self {
                tx,
                min_level: Level::INFO,
            },
            rx,
        )
    }

    /// Forward only records at `level` or more severe.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ForwardedLog> {
        self.tx.subscribe()
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogForwarder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering: TRACE > DEBUG > INFO > WARN > ERROR
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let _ = self.tx.send(ForwardedLog {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }
}
