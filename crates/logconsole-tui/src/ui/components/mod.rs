mod command_palette;
mod detail_panel;
mod help_overlay;
mod status_bar;

pub use command_palette::{Command, CommandPalette, CommandPaletteState, console_commands};
pub use detail_panel::DetailPanel;
pub use help_overlay::HelpOverlay;
pub use status_bar::{StatusBar, console_hints};
