use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    /// Value changed by typing or deleting
    Changed,
    Submit,
    Cancel,
}

/// Single-line text input wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    cursor: usize,
    text_color: Option<Color>,
    background_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            cursor: 0,
            text_color: None,
            background_color: None,
            focused: false,
        };
        widget.apply_colors_to_textarea();
        widget
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
        self.cursor = self.textarea.cursor().1;
    }

    fn apply_colors_to_textarea(&mut self) {
        let mut style = Style::default();
        if let Some(text_color) = self.text_color {
            style = style.fg(text_color);
        }
        if let Some(bg_color) = self.background_color {
            style = style.bg(bg_color);
        }
        self.textarea.set_style(style);
        // No underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
    }

    fn sync_to_textarea(&mut self) {
        let single_line = self.value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line]);
        // A new TextArea resets styling
        self.apply_colors_to_textarea();
        self.set_focused(self.focused);
        self.textarea.move_cursor(CursorMove::Jump(
            0,
            self.cursor.min(u16::MAX as usize) as u16,
        ));
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self.apply_colors_to_textarea();
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self.apply_colors_to_textarea();
        self
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.apply_colors_to_textarea();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            // Same style as the text hides the cursor
            let textarea_style = self.textarea.style();
            self.textarea.set_cursor_style(textarea_style);
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value and put the cursor at its end.
    pub fn set_value(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
        self.sync_to_textarea();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.sync_to_textarea();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            // Single line: Enter submits instead of inserting a newline
            KeyCode::Enter => return TextInputEvent::Submit,
            KeyCode::Esc => return TextInputEvent::Cancel,
            _ => {}
        }

        let input = key_event_to_input(event);
        if matches!(input.key, Key::Char('\n') | Key::Char('\r') | Key::Null) {
            return TextInputEvent::None;
        }
        let before = self.value.clone();
        self.textarea.input(input);
        self.sync_from_textarea();
        if self.value != before {
            TextInputEvent::Changed
        } else {
            TextInputEvent::None
        }
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Esc,
        // Vertical movement and tabs mean nothing on one line
        _ => Key::Null,
    };

    Input {
        key,
        ctrl,
        alt,
        shift,
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        // tui-textarea underlines the cursor line; strip it
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_new() {
        let input = TextInput::new();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
        assert!(!input.is_focused());
    }

    #[test]
    fn test_set_value_moves_cursor_to_end() {
        let mut input = TextInput::new();
        input.set_value("hello".to_string());
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::Char('a'))), TextInputEvent::Changed);
        assert_eq!(input.handle_key(&key(KeyCode::Char('b'))), TextInputEvent::Changed);
        assert_eq!(input.value(), "ab");
        assert_eq!(input.handle_key(&key(KeyCode::Backspace)), TextInputEvent::Changed);
        assert_eq!(input.value(), "a");
        assert_eq!(input.handle_key(&key(KeyCode::Up)), TextInputEvent::None);
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), TextInputEvent::Submit);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), TextInputEvent::Cancel);
    }

    #[test]
    fn test_clear() {
        let mut input = TextInput::new();
        input.set_value("hello".to_string());
        input.clear();
        assert!(input.is_empty());
    }
}
