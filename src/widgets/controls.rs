use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

use crate::config::Theme;

const DEFAULT_CONTROLS: [(&str, &str); 8] = [
    ("/", "Search"),
    ("f", "Filter"),
    ("s", "Sort"),
    ("⏎", "View"),
    ("e", "Edit"),
    ("x", "Export"),
    ("d", "Delete"),
    ("q", "Quit"),
];

/// Bottom bar: key hints on the left, page and row count on the right.
pub struct Controls {
    pub row_count: Option<usize>,
    pub page_label: Option<String>,
    pub dimmed: bool,
    pub search_active: bool,
    pub custom_controls: Option<Vec<(&'static str, &'static str)>>,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
    pub active_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            page_label: None,
            dimmed: false,
            search_active: false,
            custom_controls: None,
            bg_color: Color::Indexed(236),
            key_color: Color::Cyan,
            label_color: Color::White,
            active_color: Color::Cyan,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_page_label(mut self, label: impl Into<String>) -> Self {
        self.page_label = Some(label.into());
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_search_active(mut self, search_active: bool) -> Self {
        self.search_active = search_active;
        self
    }

    pub fn with_custom_controls(mut self, controls: Vec<(&'static str, &'static str)>) -> Self {
        self.custom_controls = Some(controls);
        self
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.get("controls_bg");
        self.key_color = theme.get("keybind_hints");
        self.label_color = theme.get("keybind_labels");
        self.active_color = theme.get("primary");
        self
    }
}

/// Format a count with thousands separators.
pub fn format_number_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls: &[(&str, &str)] = match &self.custom_controls {
            Some(custom) => custom,
            None => &DEFAULT_CONTROLS,
        };

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        let status = match (&self.page_label, self.row_count) {
            (Some(page), Some(count)) => {
                Some(format!("{}  Rows: {}", page, format_number_with_commas(count)))
            }
            (Some(page), None) => Some(page.clone()),
            (None, Some(count)) => Some(format!("Rows: {}", format_number_with_commas(count))),
            (None, None) => None,
        };
        constraints.push(Constraint::Fill(1));
        if let Some(status) = &status {
            constraints.push(Constraint::Length(status.chars().count() as u16 + 1));
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_color, label_color) = if self.dimmed {
            (Color::DarkGray, Color::DarkGray)
        } else {
            (self.key_color, self.label_color)
        };
        let base_style = Style::default().bg(self.bg_color);

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.fg(key_color).add_modifier(Modifier::BOLD))
                .centered()
                .render(layout[j], buf);
            let action_style = if *action == "Search" && self.search_active {
                base_style.fg(self.active_color)
            } else {
                base_style.fg(label_color)
            };
            Paragraph::new(*action)
                .style(action_style)
                .render(layout[j + 1], buf);
        }

        let fill_idx = controls.len() * 2;
        Paragraph::new("").style(base_style).render(layout[fill_idx], buf);

        if let Some(status) = status {
            Paragraph::new(status)
                .style(base_style.fg(label_color))
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}
