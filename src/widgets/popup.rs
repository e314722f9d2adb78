//! Popups over the grid: row detail and delete confirmation.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::row::Row;

/// Centered rect with fixed width and height, clamped to fit inside `r`.
pub fn centered_rect_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + r.width.saturating_sub(w) / 2;
    let y = r.y + r.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Centered rect within `r` with given percentage width and height.
pub fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Pretty-printed row for the detail popup.
pub fn detail_text(row: &Row) -> String {
    serde_json::to_string_pretty(row).unwrap_or_else(|_| format!("{:?}", row))
}

/// Scrollable view of one row.
#[derive(Debug, Default, Clone)]
pub struct DetailPopup {
    pub text: String,
    pub scroll: u16,
    pub active: bool,
}

impl DetailPopup {
    pub fn open(&mut self, row: &Row) {
        self.text = detail_text(row);
        self.scroll = 0;
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn scroll_down(&mut self) {
        let max = self.text.lines().count().saturating_sub(1) as u16;
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, border: Color, text: Color) {
        let popup_area = centered_rect(area, 70, 70);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("Row")
            .border_style(Style::default().fg(border));
        Paragraph::new(self.text.as_str())
            .style(Style::default().fg(text))
            .block(block)
            .scroll((self.scroll, 0))
            .render(popup_area, buf);
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfirmationModal {
    pub message: String,
    pub focus_yes: bool,
    pub active: bool,
}

impl ConfirmationModal {
    pub fn open(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.focus_yes = false;
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, border_active: Color, text: Color) {
        let popup_area = centered_rect_fixed(area, 50, 9);
        Clear.render(popup_area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("Confirm")
            .border_style(Style::default().fg(border_active));
        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(inner_area);

        Paragraph::new(self.message.as_str())
            .style(Style::default().fg(text))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let button_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(2),
                Constraint::Length(12),
                Constraint::Fill(1),
            ])
            .split(chunks[1]);

        let focused = Style::default().fg(border_active);
        let (yes_style, no_style) = if self.focus_yes {
            (focused, Style::default())
        } else {
            (Style::default(), focused)
        };

        Paragraph::new("Yes")
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(yes_style),
            )
            .render(button_chunks[1], buf);
        Paragraph::new("No")
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(no_style),
            )
            .render(button_chunks[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let r = centered_rect_fixed(Rect::new(0, 0, 20, 10), 50, 4);
        assert_eq!(r, Rect::new(0, 3, 20, 4));
    }

    #[test]
    fn test_detail_keeps_key_order() {
        let row = json!({"id": 1, "b": [1, 2], "a": null})
            .as_object()
            .cloned()
            .unwrap();
        let text = detail_text(&row);
        let id = text.find("\"id\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        let a = text.find("\"a\"").unwrap();
        assert!(id < b && b < a);
    }

    #[test]
    fn test_detail_scroll_bounds() {
        let row = json!({"id": 1}).as_object().cloned().unwrap();
        let mut popup = DetailPopup::default();
        popup.open(&row);
        popup.scroll_up();
        assert_eq!(popup.scroll, 0);
        for _ in 0..10 {
            popup.scroll_down();
        }
        assert_eq!(popup.scroll as usize, popup.text.lines().count() - 1);
    }
}
