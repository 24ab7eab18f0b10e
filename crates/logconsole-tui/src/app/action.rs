use logconsole_types::Severity;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // UI toggles
    ToggleCommandPalette,
    ToggleHelp,

    // Command palette
    PaletteUp,
    PaletteDown,
    PaletteSelect,
    PaletteInput(char),
    PaletteBackspace,
    PaletteClose,

    // Entry list navigation
    SelectUp(usize),
    SelectDown(usize),
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,
    ToggleAutoScroll,

    // Detail window
    OpenDetail,
    CloseDetail,
    DetailScrollUp,
    DetailScrollDown,
    CopyEntry,

    // Console configuration
    ToggleCollapse,
    ToggleSeverity(Severity),
    ClearLogs,

    // Filter input
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ApplyFilter,
    ClearFilter,
    ToggleCaseSensitive,

    // Display
    ToggleTimestamps,
    ToggleLocalTime,
    ExportLogs,
    ExportAllLogs,

    // Messages
    DismissMessage,
}
