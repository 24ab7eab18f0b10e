//! Terminal front end for the log console
//!
//! State and actions, keybindings, the settings file, terminal handling and
//! the widgets that draw a [`logconsole_core::Console`].

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, UiState};
pub use config::{
    ExportFormat, ExportSettings, KeyBinding, KeyBindings, KeyContext, Settings, SettingsError,
};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{
    Command, CommandPalette, CommandPaletteState, DetailPanel, HelpOverlay, StatusBar,
    console_commands, console_hints,
};
pub use ui::screens::ConsoleScreen;
pub use ui::{Layout, Theme};
