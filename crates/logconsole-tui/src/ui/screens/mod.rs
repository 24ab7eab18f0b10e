//! Screen implementations

mod console;

pub use console::ConsoleScreen;
