use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use logconsole_types::Severity;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Console,
    Detail,
    Help,
    FilterInput,
    CommandPalette,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(
            KeyBinding::new(KeyCode::Char(' ')),
            Action::ToggleCommandPalette,
        );
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Console bindings - less-like navigation
        let mut console = HashMap::new();
        console.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectDown(1));
        console.insert(KeyBinding::new(KeyCode::Down), Action::SelectDown(1));
        console.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectUp(1));
        console.insert(KeyBinding::new(KeyCode::Up), Action::SelectUp(1));
        console.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        console.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        console.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        console.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        console.insert(KeyBinding::new(KeyCode::Char('g')), Action::SelectFirst);
        console.insert(KeyBinding::shift(KeyCode::Char('G')), Action::SelectLast);
        console.insert(KeyBinding::new(KeyCode::Home), Action::SelectFirst);
        console.insert(KeyBinding::new(KeyCode::End), Action::SelectLast);
        console.insert(KeyBinding::new(KeyCode::Enter), Action::OpenDetail);
        console.insert(KeyBinding::new(KeyCode::Char('y')), Action::CopyEntry);
        console.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleAutoScroll);
        console.insert(KeyBinding::new(KeyCode::Char('t')), Action::ToggleTimestamps);
        console.insert(KeyBinding::shift(KeyCode::Char('T')), Action::ToggleLocalTime);
        // Console configuration
        console.insert(KeyBinding::new(KeyCode::Char('c')), Action::ToggleCollapse);
        console.insert(
            KeyBinding::new(KeyCode::Char('1')),
            Action::ToggleSeverity(Severity::Info),
        );
        console.insert(
            KeyBinding::new(KeyCode::Char('2')),
            Action::ToggleSeverity(Severity::Warning),
        );
        console.insert(
            KeyBinding::new(KeyCode::Char('3')),
            Action::ToggleSeverity(Severity::Error),
        );
        console.insert(KeyBinding::new(KeyCode::Char('x')), Action::ClearLogs);
        console.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        console.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearFilter);
        console.insert(KeyBinding::new(KeyCode::Char('i')), Action::ToggleCaseSensitive);
        console.insert(KeyBinding::new(KeyCode::Char('e')), Action::ExportLogs);
        console.insert(KeyBinding::shift(KeyCode::Char('E')), Action::ExportAllLogs);
        console.insert(KeyBinding::new(KeyCode::Esc), Action::DismissMessage);
        bindings.insert(KeyContext::Console, console);

        // Detail window bindings
        let mut detail = HashMap::new();
        detail.insert(KeyBinding::new(KeyCode::Esc), Action::CloseDetail);
        detail.insert(KeyBinding::new(KeyCode::Enter), Action::CloseDetail);
        detail.insert(KeyBinding::new(KeyCode::Char('j')), Action::DetailScrollDown);
        detail.insert(KeyBinding::new(KeyCode::Down), Action::DetailScrollDown);
        detail.insert(KeyBinding::new(KeyCode::Char('k')), Action::DetailScrollUp);
        detail.insert(KeyBinding::new(KeyCode::Up), Action::DetailScrollUp);
        detail.insert(KeyBinding::new(KeyCode::Char('y')), Action::CopyEntry);
        bindings.insert(KeyContext::Detail, detail);

        // Help overlay bindings; console keys are inactive underneath
        let mut help = HashMap::new();
        help.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleHelp);
        bindings.insert(KeyContext::Help, help);

        // Filter input bindings (when search bar is active)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplyFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        bindings.insert(KeyContext::FilterInput, filter_input);

        // Command palette bindings
        let mut palette = HashMap::new();
        palette.insert(KeyBinding::new(KeyCode::Up), Action::PaletteUp);
        palette.insert(KeyBinding::new(KeyCode::Down), Action::PaletteDown);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('p')), Action::PaletteUp);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('n')), Action::PaletteDown);
        palette.insert(KeyBinding::new(KeyCode::Enter), Action::PaletteSelect);
        palette.insert(KeyBinding::new(KeyCode::Esc), Action::PaletteClose);
        palette.insert(KeyBinding::new(KeyCode::Backspace), Action::PaletteBackspace);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::PaletteClose);
        bindings.insert(KeyContext::CommandPalette, palette);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in filter input mode
    /// Returns Some(Action) for special keys, None for unhandled keys
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::FilterInput, key, Action::SearchInput)
    }

    /// Handle key event in command palette mode
    pub fn get_palette_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::CommandPalette, key, Action::PaletteInput)
    }

    /// Context bindings first, then plain characters become text input
    fn text_input_action(
        &self,
        context: KeyContext,
        key: &KeyEvent,
        input: fn(char) -> Action,
    ) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        if let KeyCode::Char(c) = key.code
            && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
        {
            return Some(input(c));
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_console_bindings() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::Console, &key(KeyCode::Char('c'))),
            Some(Action::ToggleCollapse)
        );
        assert_eq!(
            bindings.get_action(KeyContext::Console, &key(KeyCode::Char('3'))),
            Some(Action::ToggleSeverity(Severity::Error))
        );
    }

    #[test]
    fn test_global_fallback() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::Detail, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            bindings.get_action(KeyContext::Detail, &key(KeyCode::Char('z'))),
            None
        );
    }

    #[test]
    fn test_help_context_closes_on_esc() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::Help, &key(KeyCode::Esc)),
            Some(Action::ToggleHelp)
        );
        assert_eq!(
            bindings.get_action(KeyContext::Help, &key(KeyCode::Char('?'))),
            Some(Action::ToggleHelp)
        );
        assert_eq!(
            bindings.get_action(KeyContext::Help, &key(KeyCode::Char('c'))),
            None
        );
    }

    #[test]
    fn test_export_all_binding() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(
                KeyContext::Console,
                &KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT)
            ),
            Some(Action::ExportAllLogs)
        );
    }

    #[test]
    fn test_filter_input_captures_characters() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('q'))),
            Some(Action::SearchInput('q'))
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Enter)),
            Some(Action::ApplyFilter)
        );
        assert_eq!(
            bindings.get_filter_input_action(&KeyEvent::new(
                KeyCode::Char('u'),
                KeyModifiers::CONTROL
            )),
            Some(Action::SearchClear)
        );
    }

    #[test]
    fn test_palette_input() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_palette_action(&KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT)),
            Some(Action::PaletteInput('C'))
        );
    }
}
