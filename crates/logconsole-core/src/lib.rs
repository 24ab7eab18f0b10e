//! Log ingestion and presentation pipeline for logconsole
//!
//! This crate provides the entry store, the severity/text filter, the
//! collapse engine with its per-severity counters, and the tracing layer
//! that feeds host log events into the console.

mod console;
mod counters;
mod error;
mod filter;
mod instance;
mod layer;
mod store;
mod view;

pub use console::{Console, ConsoleOptions};
pub use counters::SeverityCounts;
pub use error::ConsoleError;
pub use filter::{CompiledFilter, FilterConfig};
pub use instance::ConsoleInstance;
pub use layer::{ConsoleLayer, LayerHandle, RawLog, Subscription, severity_for};
pub use store::EntryStore;
pub use view::CollapseView;

// Re-export types used in our public API
pub use logconsole_types::{Entry, IdentityKey, Severity};
