//! Keybindings and settings file

mod keybindings;
mod settings;

pub use keybindings::{KeyBinding, KeyBindings, KeyContext};
pub use settings::{
    CaptureSettings, ConsoleSettings, DisplaySettings, ExportFormat, ExportSettings, Settings,
    SettingsError,
};
