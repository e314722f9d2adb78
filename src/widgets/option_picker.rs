//! Checkbox list for a multi-select column filter.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::table::OptionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    None,
    Toggle(String),
    /// Deselect everything, which removes the filter.
    ClearAll,
    Close,
}

#[derive(Debug, Default, Clone)]
pub struct OptionPicker {
    pub accessor: String,
    pub title: String,
    pub options: Vec<OptionState>,
    pub cursor: usize,
    pub active: bool,
}

impl OptionPicker {
    pub fn open(&mut self, accessor: &str, title: &str, options: Vec<OptionState>) {
        self.accessor = accessor.to_string();
        self.title = title.to_string();
        self.options = options;
        self.cursor = 0;
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    /// Refresh checkbox state after the table applied a toggle.
    pub fn sync(&mut self, options: Vec<OptionState>) {
        self.options = options;
        self.cursor = self.cursor.min(self.options.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> PickerEvent {
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                PickerEvent::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.options.len() {
                    self.cursor += 1;
                }
                PickerEvent::None
            }
            KeyCode::Char(' ') | KeyCode::Enter => match self.options.get(self.cursor) {
                Some(option) => PickerEvent::Toggle(option.label.clone()),
                None => PickerEvent::None,
            },
            KeyCode::Char('c') => PickerEvent::ClearAll,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => PickerEvent::Close,
            _ => PickerEvent::None,
        }
    }

    /// Rows needed to show every option inside the border.
    pub fn height(&self) -> u16 {
        (self.options.len() as u16).saturating_add(2)
    }

    pub fn width(&self) -> u16 {
        let widest = self
            .options
            .iter()
            .map(|o| o.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.title.chars().count());
        (widest as u16).saturating_add(8)
    }
}

pub struct OptionPickerView<'a> {
    picker: &'a OptionPicker,
    border_color: Color,
    active_color: Color,
}

impl<'a> OptionPickerView<'a> {
    pub fn new(picker: &'a OptionPicker, border_color: Color, active_color: Color) -> Self {
        Self {
            picker,
            border_color,
            active_color,
        }
    }
}

impl Widget for OptionPickerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.picker.title.as_str())
            .border_style(Style::default().fg(self.border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .picker
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let marker = if option.selected { "[x]" } else { "[ ]" };
                let mut style = if option.selected {
                    Style::default().fg(self.active_color)
                } else {
                    Style::default()
                };
                if i == self.picker.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(format!("{} {}", marker, option.label), style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn picker() -> OptionPicker {
        let mut picker = OptionPicker::default();
        picker.open(
            "status",
            "Status",
            vec![
                OptionState {
                    label: "Done".to_string(),
                    selected: false,
                },
                OptionState {
                    label: "Not Done".to_string(),
                    selected: true,
                },
            ],
        );
        picker
    }

    #[test]
    fn test_navigation_and_toggle() {
        let mut picker = picker();
        assert_eq!(
            picker.handle_key(&key(KeyCode::Char(' '))),
            PickerEvent::Toggle("Done".to_string())
        );
        picker.handle_key(&key(KeyCode::Down));
        picker.handle_key(&key(KeyCode::Down));
        assert_eq!(picker.cursor, 1);
        assert_eq!(
            picker.handle_key(&key(KeyCode::Enter)),
            PickerEvent::Toggle("Not Done".to_string())
        );
        assert_eq!(picker.handle_key(&key(KeyCode::Esc)), PickerEvent::Close);
    }

    #[test]
    fn test_render_checkboxes() {
        let picker = picker();
        let area = Rect::new(0, 0, picker.width(), picker.height());
        let mut buf = Buffer::empty(area);
        OptionPickerView::new(&picker, Color::White, Color::Cyan).render(area, &mut buf);
        let row = |y: u16| -> String { (0..area.width).map(|x| buf[(x, y)].symbol()).collect() };
        assert!(row(1).contains("[ ] Done"));
        assert!(row(2).contains("[x] Not Done"));
    }
}
