use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use logconsole_core::{Console, ConsoleInstance, ConsoleLayer, LayerHandle, RawLog};
use logconsole_tui::{
    Action, AppState, Command, CommandPalette, CommandPaletteState, ConsoleScreen, DetailPanel,
    Event, EventHandler, ExportFormat, ExportSettings, HelpOverlay, KeyBindings, KeyContext,
    Settings, Tui, console_commands,
};

mod demo;

/// logconsole - An in-application log console with filtering and collapsing
#[derive(Parser, Debug)]
#[command(name = "logconsole")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Lowest level captured into the console (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    capture_level: Option<String>,

    /// Start with repeated entries collapsed
    #[arg(long)]
    collapse: bool,

    /// Initial message filter (regex)
    #[arg(long, value_name = "PATTERN")]
    filter: Option<String>,

    /// Interval between demo log events
    #[arg(long, default_value = "500")]
    demo_interval_ms: u64,

    /// Do not run the demo log producer
    #[arg(long)]
    no_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = load_settings(&args)?;
    let console_layer = ConsoleLayer::new(settings.capture_level()?);
    let handle = console_layer.handle();
    init_tracing(args.log_file.as_deref(), console_layer)?;

    // Run the application
    let result = run_app(args, settings, handle).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// Settings file values with command line overrides applied
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if args.collapse {
        settings.console.collapsed = true;
    }
    if let Some(filter) = &args.filter {
        settings.console.filter = filter.clone();
    }
    if let Some(level) = &args.capture_level {
        settings.capture.level = level.clone();
    }

    Ok(settings)
}

/// Install the console layer, plus a file layer when `log_file` is set
///
/// Nothing is written to the terminal while the TUI owns it.
fn init_tracing(log_file: Option<&Path>, console_layer: ConsoleLayer) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let filter =
                EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    Ok(())
}

async fn run_app(args: Args, settings: Settings, handle: LayerHandle) -> Result<()> {
    // Create channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (log_tx, mut log_rx) = mpsc::unbounded_channel::<RawLog>();

    let mut console = ConsoleInstance::acquire(settings.console_options())?;
    let subscription = handle.subscribe(log_tx)?;
    let mut state = AppState::new(action_tx, &settings.display);

    let demo_cancel = CancellationToken::new();
    if !args.no_demo {
        tokio::spawn(demo::run(
            Duration::from_millis(args.demo_interval_ms),
            demo_cancel.clone(),
        ));
    }

    // Initialize TUI
    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let keybindings = KeyBindings::new();

    // Command palette
    let mut palette_state = CommandPaletteState::default();
    let commands = console_commands();

    info!(collapsed = console.is_collapsed(), "Log console attached");

    render(&mut tui, &mut state, &console, &mut palette_state, &commands)?;

    // Main event loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if palette_state.visible {
                            keybindings.get_palette_action(&key)
                        } else {
                            match state.key_context() {
                                KeyContext::FilterInput => keybindings.get_filter_input_action(&key),
                                context => keybindings.get_action(context, &key),
                            }
                        };
                        if let Some(action) = action {
                            let _ = state.action_tx.send(action);
                        }
                    }
                    Event::Paste(text) => {
                        if state.ui_state.search_active {
                            text.chars()
                                .filter(|c| !c.is_control())
                                .for_each(|c| state.search_input_char(c));
                        }
                    }
                    Event::Error(e) => {
                        state.show_message(format!("Input error: {}", e));
                    }
                    // Redrawn below
                    Event::Tick | Event::Resize(_, _) => {}
                }
            }

            // Ingest host logs; drain what is queued so bursts cost one redraw
            Some(raw) = log_rx.recv() => {
                console.ingest_raw(raw);
                while let Ok(raw) = log_rx.try_recv() {
                    console.ingest_raw(raw);
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(
                    &mut state,
                    &mut console,
                    &mut palette_state,
                    &commands,
                    &settings.export,
                    action,
                );
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state, &console, &mut palette_state, &commands)?;
    }

    // Cleanup
    demo_cancel.cancel();
    drop(subscription);
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(
    state: &mut AppState,
    console: &mut Console,
    palette_state: &mut CommandPaletteState,
    commands: &[Command],
    export: &ExportSettings,
    action: Action,
) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::ToggleCommandPalette => {
            if palette_state.visible {
                palette_state.close();
            } else {
                palette_state.open(commands);
            }
        }

        // Command palette actions
        Action::PaletteUp => {
            palette_state.move_up();
        }
        Action::PaletteDown => {
            palette_state.move_down();
        }
        Action::PaletteInput(c) => {
            palette_state.input_char(c, commands);
        }
        Action::PaletteBackspace => {
            palette_state.input_backspace(commands);
        }
        Action::PaletteClose => {
            palette_state.close();
        }
        Action::PaletteSelect => {
            if let Some(cmd) = palette_state.selected_command(commands) {
                let action = cmd.action.clone();
                palette_state.close();
                // Recursively handle the selected action
                handle_action(state, console, palette_state, commands, export, action);
            }
        }

        // Entry list navigation
        Action::SelectUp(n) => {
            state.select_up(n);
        }
        Action::SelectDown(n) => {
            state.select_down(n, console.shown_len());
        }
        Action::PageUp => {
            state.page_up();
        }
        Action::PageDown => {
            state.page_down(console.shown_len());
        }
        Action::SelectFirst => {
            state.select_first();
        }
        Action::SelectLast => {
            state.select_last(console.shown_len());
        }
        Action::ToggleAutoScroll => {
            if state.ui_state.auto_scroll {
                state.ui_state.auto_scroll = false;
            } else {
                state.select_last(console.shown_len());
            }
        }

        // Detail window
        Action::OpenDetail => {
            state.open_detail(console);
        }
        Action::CloseDetail => {
            state.close_detail();
        }
        Action::DetailScrollUp => {
            state.ui_state.detail_scroll = state.ui_state.detail_scroll.saturating_sub(1);
        }
        Action::DetailScrollDown => {
            state.ui_state.detail_scroll = state.ui_state.detail_scroll.saturating_add(1);
        }
        Action::CopyEntry => {
            // Stands in for the clipboard; the event comes back into the console
            if let Some(text) = state.copy_selected(console) {
                info!("copy -> {}", text);
            }
        }

        // Console configuration
        Action::ToggleCollapse => {
            console.set_collapsed(!console.is_collapsed());
            state.show_message(if console.is_collapsed() {
                "Collapse on".to_string()
            } else {
                "Collapse off".to_string()
            });
        }
        Action::ToggleSeverity(severity) => {
            console.toggle_severity(severity);
        }
        Action::ClearLogs => {
            console.clear();
            state.close_detail();
            state.select_last(0);
            state.ui_state.scroll = 0;
            state.show_message("Cleared".to_string());
        }

        // Filter input
        Action::OpenSearch => {
            state.start_search(console);
        }
        Action::CloseSearch => {
            state.cancel_search();
        }
        Action::SearchInput(c) => {
            state.search_input_char(c);
        }
        Action::SearchBackspace => {
            state.search_input_backspace();
        }
        Action::SearchClear => {
            state.ui_state.search_input.clear();
        }
        Action::ApplyFilter => {
            state.apply_filter(console);
        }
        Action::ClearFilter => {
            state.clear_filter(console);
        }
        Action::ToggleCaseSensitive => {
            state.toggle_case_sensitive(console);
        }

        // Display
        Action::ToggleTimestamps => {
            state.ui_state.show_timestamps = !state.ui_state.show_timestamps;
        }
        Action::ToggleLocalTime => {
            state.ui_state.use_local_time = !state.ui_state.use_local_time;
        }
        Action::ExportLogs => {
            let result = export_logs(console, export, ExportScope::Shown);
            report_export(state, result);
        }
        Action::ExportAllLogs => {
            let result = export_logs(console, export, ExportScope::All);
            report_export(state, result);
        }

        Action::DismissMessage => {
            state.dismiss_message();
        }
    }
}

fn render(
    tui: &mut Tui,
    state: &mut AppState,
    console: &Console,
    palette_state: &mut CommandPaletteState,
    commands: &[Command],
) -> Result<()> {
    tui.draw(|frame| {
        ConsoleScreen::render(frame, state, console);

        if state.ui_state.detail_visible {
            DetailPanel::render(frame, state, console);
        }

        // Render command palette overlay if visible
        if palette_state.visible {
            CommandPalette::render(frame, palette_state, commands);
        }

        // Render help overlay if visible
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;

    Ok(())
}

/// Which entries an export writes
#[derive(Clone, Copy, Debug)]
enum ExportScope {
    /// The filtered, possibly collapsed view
    Shown,
    /// Every stored entry, ignoring filter and collapse
    All,
}

fn report_export(state: &mut AppState, result: Result<(PathBuf, usize)>) {
    match result {
        Ok((path, count)) => {
            state.show_message(format!("Exported {} entries to {}", count, path.display()));
        }
        Err(e) => {
            state.show_message(format!("Export failed: {:#}", e));
        }
    }
}

/// Write entries to a timestamped file
fn export_logs(
    console: &Console,
    export: &ExportSettings,
    scope: ExportScope,
) -> Result<(PathBuf, usize)> {
    let filename = format!(
        "logconsole_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        export.format.extension()
    );
    let path = match &export.directory {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    };

    let (mut content, count) = match (scope, export.format) {
        (ExportScope::Shown, ExportFormat::Text) => (console.export_shown(), console.shown_len()),
        (ExportScope::Shown, ExportFormat::Json) => {
            (console.export_shown_json()?, console.shown_len())
        }
        (ExportScope::All, ExportFormat::Text) => (console.export_all(), console.entries().len()),
        (ExportScope::All, ExportFormat::Json) => {
            (console.export_all_json()?, console.entries().len())
        }
    };
    content.push('\n');

    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), entries = count, ?scope, "exported logs");

    Ok((path, count))
}
