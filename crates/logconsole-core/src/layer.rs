use std::fmt::{self, Write as _};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use logconsole_types::Severity;

use crate::ConsoleError;

/// One log notification from the host, before it becomes an entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLog {
    pub message: String,
    pub context: String,
    pub severity: Severity,
}

type Slot = Arc<Mutex<Option<mpsc::UnboundedSender<RawLog>>>>;

/// Tracing layer that forwards events to the console
///
/// Events are only forwarded while a [`Subscription`] is held. Install the
/// layer once in the process subscriber and attach through [`LayerHandle`].
pub struct ConsoleLayer {
    slot: Slot,
    capture_level: Level,
}

impl ConsoleLayer {
    /// Capture events at `capture_level` and above
    pub fn new(capture_level: Level) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            capture_level,
        }
    }

    /// Get a handle for attaching a receiver after the layer is installed
    pub fn handle(&self) -> LayerHandle {
        LayerHandle {
            slot: Arc::clone(&self.slot),
        }
    }

    fn captures(&self, metadata: &Metadata<'_>) -> bool {
        // More verbose levels compare greater
        *metadata.level() <= self.capture_level
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.captures(metadata) {
            return;
        }

        let slot = self.slot.lock();
        let Some(sender) = slot.as_ref() else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let raw = RawLog {
            context: visitor.context(metadata),
            message: visitor.message,
            severity: severity_for(metadata.level()),
        };

        // Receiver gone: the console is shutting down
        let _ = sender.send(raw);
    }
}

/// Attach point for a running [`ConsoleLayer`]
#[derive(Clone)]
pub struct LayerHandle {
    slot: Slot,
}

impl LayerHandle {
    /// Start forwarding events to `sender`
    ///
    /// Only one subscription may be active at a time.
    pub fn subscribe(
        &self,
        sender: mpsc::UnboundedSender<RawLog>,
    ) -> Result<Subscription, ConsoleError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(ConsoleError::AlreadySubscribed);
        }
        *slot = Some(sender);

        Ok(Subscription {
            slot: Arc::clone(&self.slot),
        })
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.lock().is_some()
    }
}

/// Active forwarding from the layer; detaches on drop
pub struct Subscription {
    slot: Slot,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

/// Map a tracing level onto the console's three severities
pub fn severity_for(level: &Level) -> Severity {
    if *level == Level::ERROR {
        Severity::Error
    } else if *level == Level::WARN {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// Collects the message and the remaining fields of an event
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl FieldVisitor {
    /// Fields first, then the emitting location, one per line
    fn context(&self, metadata: &Metadata<'_>) -> String {
        let mut context = String::new();
        for (name, value) in &self.fields {
            let _ = writeln!(context, "{} = {}", name, value);
        }

        let _ = write!(context, "at {}", metadata.target());
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            let _ = write!(context, " ({}:{})", file, line);
        }
        context
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture<F: FnOnce()>(layer: ConsoleLayer, emit: F) {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, emit);
    }

    #[test]
    fn test_forwards_message_and_severity() {
        let layer = ConsoleLayer::new(Level::INFO);
        let handle = layer.handle();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = handle.subscribe(tx).unwrap();

        capture(layer, || {
            tracing::info!("server started on {}", 8080);
            tracing::warn!(attempt = 3, "retrying");
            tracing::error!("boom");
        });

        let first = rx.try_recv().unwrap();
        assert_eq!(first.message, "server started on 8080");
        assert_eq!(first.severity, Severity::Info);

        let second = rx.try_recv().unwrap();
        assert_eq!(second.message, "retrying");
        assert_eq!(second.severity, Severity::Warning);
        assert!(second.context.starts_with("attempt = 3\nat "));

        assert_eq!(rx.try_recv().unwrap().severity, Severity::Error);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_respects_capture_level() {
        let layer = ConsoleLayer::new(Level::WARN);
        let handle = layer.handle();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = handle.subscribe(tx).unwrap();

        capture(layer, || {
            tracing::debug!("noise");
            tracing::info!("still noise");
            tracing::warn!("kept");
        });

        assert_eq!(rx.try_recv().unwrap().message, "kept");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_single_subscription() {
        let layer = ConsoleLayer::new(Level::INFO);
        let handle = layer.handle();
        let (tx, _rx) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let subscription = handle.subscribe(tx).unwrap();
        assert!(matches!(
            handle.subscribe(tx2.clone()),
            Err(ConsoleError::AlreadySubscribed)
        ));

        drop(subscription);
        assert!(!handle.is_subscribed());
        assert!(handle.subscribe(tx2).is_ok());
    }

    #[test]
    fn test_ignores_events_after_unsubscribe() {
        let layer = ConsoleLayer::new(Level::INFO);
        let handle = layer.handle();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = handle.subscribe(tx).unwrap();

        capture(layer, || {
            tracing::info!("before");
            drop(subscription);
            tracing::info!("after");
        });

        assert_eq!(rx.try_recv().unwrap().message, "before");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_for(&Level::TRACE), Severity::Info);
        assert_eq!(severity_for(&Level::DEBUG), Severity::Info);
        assert_eq!(severity_for(&Level::WARN), Severity::Warning);
        assert_eq!(severity_for(&Level::ERROR), Severity::Error);
    }
}
