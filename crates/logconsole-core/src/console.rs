use tracing::{debug, warn};

use logconsole_types::{Entry, Severity};

use crate::ConsoleError;
use crate::counters::SeverityCounts;
use crate::filter::{CompiledFilter, FilterConfig};
use crate::layer::RawLog;
use crate::store::EntryStore;
use crate::view::CollapseView;

/// Initial console configuration
#[derive(Clone, Debug)]
pub struct ConsoleOptions {
    pub collapsed: bool,
    pub info_enabled: bool,
    pub warning_enabled: bool,
    pub error_enabled: bool,
    pub pattern: String,
    pub case_insensitive: bool,
    /// Initial store capacity
    pub capacity: usize,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            collapsed: false,
            info_enabled: true,
            warning_enabled: true,
            error_enabled: true,
            pattern: String::new(),
            case_insensitive: false,
            capacity: 128,
        }
    }
}

/// The log console: store, view, counters and their configuration
///
/// New entries update the view incrementally. Every configuration change
/// replays the whole store into a fresh view instead.
#[derive(Debug)]
pub struct Console {
    store: EntryStore,
    view: CollapseView,
    counts: SeverityCounts,
    filter: FilterConfig,
    collapsed: bool,
}

impl Console {
    /// Create a console; fails only if the initial pattern does not compile
    pub fn new(options: ConsoleOptions) -> Result<Self, ConsoleError> {
        let text = CompiledFilter::new(&options.pattern, options.case_insensitive)?;

        Ok(Self {
            store: EntryStore::with_capacity(options.capacity),
            view: CollapseView::default(),
            counts: SeverityCounts::default(),
            filter: FilterConfig {
                info_enabled: options.info_enabled,
                warning_enabled: options.warning_enabled,
                error_enabled: options.error_enabled,
                text,
            },
            collapsed: options.collapsed,
        })
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Record one log occurrence and fold it into the view
    pub fn ingest(
        &mut self,
        message: impl Into<std::sync::Arc<str>>,
        context: impl Into<String>,
        severity: Severity,
    ) -> usize {
        self.ingest_entry(Entry::new(message, context, severity))
    }

    /// Record a log forwarded by the ingestion layer
    pub fn ingest_raw(&mut self, raw: RawLog) -> usize {
        self.ingest(raw.message, raw.context, raw.severity)
    }

    /// Record a pre-built entry (its repeat count is reset)
    pub fn ingest_entry(&mut self, mut entry: Entry) -> usize {
        entry.reset();
        let index = self.store.push(entry);
        self.view.ingest(
            &mut self.store,
            index,
            &self.filter,
            self.collapsed,
            &mut self.counts,
        );
        index
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        self.rebuild();
    }

    pub fn set_severity_enabled(&mut self, severity: Severity, enabled: bool) {
        self.filter.set_severity_enabled(severity, enabled);
        self.rebuild();
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        let enabled = self.filter.severity_enabled(severity);
        self.set_severity_enabled(severity, !enabled);
    }

    /// Replace the text pattern; on error the previous filter stays in effect
    pub fn set_text_pattern(&mut self, pattern: &str) -> Result<(), ConsoleError> {
        let case_insensitive = self.filter.text.is_case_insensitive();
        self.replace_text_filter(pattern, case_insensitive)
    }

    /// Switch case sensitivity, recompiling the current pattern
    pub fn set_case_insensitive(&mut self, case_insensitive: bool) -> Result<(), ConsoleError> {
        let pattern = self.filter.text.pattern().to_string();
        self.replace_text_filter(&pattern, case_insensitive)
    }

    fn replace_text_filter(
        &mut self,
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<(), ConsoleError> {
        match CompiledFilter::new(pattern, case_insensitive) {
            Ok(text) => {
                self.filter.text = text;
                self.rebuild();
                Ok(())
            }
            Err(e) => {
                warn!(pattern, "rejected filter pattern: {}", e);
                Err(e)
            }
        }
    }

    /// Drop every entry and reset the view and counters
    pub fn clear(&mut self) {
        self.store.clear();
        self.rebuild();
    }

    /// Recompute the view and counters by replaying the store
    pub fn rebuild(&mut self) {
        self.counts.reset();
        self.view.reset();

        for index in 0..self.store.len() {
            if let Some(entry) = self.store.get_mut(index) {
                entry.reset();
            }
            self.view.ingest(
                &mut self.store,
                index,
                &self.filter,
                self.collapsed,
                &mut self.counts,
            );
        }

        debug!(
            entries = self.store.len(),
            shown = self.view.len(),
            collapsed = self.collapsed,
            "console view rebuilt"
        );
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Shown entries in order
    pub fn shown(&self) -> impl Iterator<Item = &Entry> {
        self.view
            .indices()
            .iter()
            .filter_map(|&index| self.store.get(index))
    }

    pub fn shown_len(&self) -> usize {
        self.view.len()
    }

    /// Entry at `position` in the shown sequence
    pub fn shown_entry(&self, position: usize) -> Option<&Entry> {
        self.view
            .indices()
            .get(position)
            .and_then(|&index| self.store.get(index))
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    /// The full store, including entries that are not shown
    pub fn entries(&self) -> &EntryStore {
        &self.store
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn severity_enabled(&self, severity: Severity) -> bool {
        self.filter.severity_enabled(severity)
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    /// Text handed to the clipboard for one entry
    pub fn copy_text(&self, entry: &Entry) -> String {
        entry.display_text()
    }

    /// Export the shown entries as text blocks
    pub fn export_shown(&self) -> String {
        self.shown()
            .map(|entry| {
                let mut block = format!("[{}] {}", entry.severity().as_str(), self.copy_text(entry));
                if self.collapsed && entry.repeat_count() > 1 {
                    block.push_str(&format!(" (x{})", entry.repeat_count()));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Export the shown entries as JSON lines
    pub fn export_shown_json(&self) -> Result<String, serde_json::Error> {
        let lines = self
            .shown()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Export every stored entry as text blocks, ignoring filter and collapse
    pub fn export_all(&self) -> String {
        self.store.export_text()
    }

    /// Export every stored entry as JSON lines
    pub fn export_all_json(&self) -> Result<String, serde_json::Error> {
        let lines = self
            .store
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

impl Default for Console {
    fn default() -> Self {
        Self {
            store: EntryStore::default(),
            view: CollapseView::default(),
            counts: SeverityCounts::default(),
            filter: FilterConfig::default(),
            collapsed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(console: &Console) -> Vec<(String, u32)> {
        console
            .shown()
            .map(|e| (e.message().to_string(), e.repeat_count()))
            .collect()
    }

    #[test]
    fn test_invalid_initial_pattern() {
        let options = ConsoleOptions {
            pattern: "(".to_string(),
            ..Default::default()
        };
        assert!(Console::new(options).is_err());
    }

    #[test]
    fn test_invalid_pattern_keeps_last_good_view() {
        let mut console = Console::default();
        console.ingest("alpha", "", Severity::Info);
        console.ingest("beta", "", Severity::Info);
        console.set_text_pattern("alp").unwrap();
        assert_eq!(console.shown_len(), 1);

        let err = console.set_text_pattern("[unclosed");
        assert!(matches!(err, Err(ConsoleError::InvalidFilterPattern { .. })));
        assert_eq!(console.filter().text.pattern(), "alp");
        assert_eq!(messages(&console), vec![("alpha".to_string(), 1)]);
    }

    #[test]
    fn test_toggle_collapse_rebuilds_repeat_counts() {
        let mut console = Console::default();
        console.ingest("x", "", Severity::Error);
        console.ingest("x", "", Severity::Error);
        console.ingest("y", "", Severity::Error);
        assert_eq!(console.shown_len(), 3);
        assert_eq!(console.counts().error(), 3);

        console.set_collapsed(true);
        assert_eq!(
            messages(&console),
            vec![("x".to_string(), 2), ("y".to_string(), 1)]
        );
        assert_eq!(console.counts().error(), 2);

        console.set_collapsed(false);
        assert!(console.shown().all(|e| e.repeat_count() == 1));
        assert_eq!(console.shown_len(), 3);
        assert_eq!(console.counts().error(), 3);
    }

    #[test]
    fn test_case_insensitive_toggle() {
        let mut console = Console::default();
        console.ingest("Disk full", "", Severity::Warning);
        console.set_text_pattern("disk").unwrap();
        assert_eq!(console.shown_len(), 0);

        console.set_case_insensitive(true).unwrap();
        assert_eq!(console.shown_len(), 1);
        assert_eq!(console.filter().text.pattern(), "disk");
    }

    #[test]
    fn test_toggle_severity() {
        let mut console = Console::default();
        console.ingest("a", "", Severity::Warning);
        console.toggle_severity(Severity::Warning);
        assert!(!console.severity_enabled(Severity::Warning));
        assert_eq!(console.shown_len(), 0);
        assert_eq!(console.counts().warning(), 1);
    }

    #[test]
    fn test_ingest_entry_resets_repeat_count() {
        let mut console = Console::default();
        let mut entry = Entry::new("x", "", Severity::Info);
        entry.increment_repeat();
        let index = console.ingest_entry(entry);
        assert_eq!(console.entries().get(index).map(|e| e.repeat_count()), Some(1));
    }

    #[test]
    fn test_copy_text() {
        let mut console = Console::default();
        console.ingest("boom", "at worker::run", Severity::Error);
        let entry = console.shown_entry(0).unwrap();
        assert_eq!(console.copy_text(entry), "boom\nat worker::run");
    }

    #[test]
    fn test_export_shown_collapsed() {
        let mut console = Console::new(ConsoleOptions {
            collapsed: true,
            ..Default::default()
        })
        .unwrap();
        console.ingest("tick", "", Severity::Info);
        console.ingest("tick", "", Severity::Info);
        console.ingest("fail", "", Severity::Error);

        assert_eq!(console.export_shown(), "[INF] tick (x2)\n\n[ERR] fail");
    }

    #[test]
    fn test_export_shown_json() {
        let mut console = Console::default();
        console.ingest("tick", "", Severity::Info);
        console.ingest("fail", "", Severity::Error);

        let json = console.export_shown_json().unwrap();
        let lines: Vec<serde_json::Value> = json
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["message"], "fail");
        assert_eq!(lines[1]["severity"], "error");
    }

    #[test]
    fn test_export_all_ignores_filter_and_collapse() {
        let mut console = Console::new(ConsoleOptions {
            collapsed: true,
            pattern: "fail".to_string(),
            ..Default::default()
        })
        .unwrap();
        console.ingest("tick", "", Severity::Info);
        console.ingest("tick", "", Severity::Info);
        console.ingest("fail", "at main", Severity::Error);

        assert_eq!(console.export_shown(), "[ERR] fail\nat main");
        assert_eq!(
            console.export_all(),
            "[INF] tick\n\n[INF] tick\n\n[ERR] fail\nat main"
        );
        assert_eq!(console.export_all_json().unwrap().lines().count(), 3);
    }
}
