//! Grid rendering of a [`TableView`]: two-line headers (label with sort arrow,
//! filter summary), the current page of rows, and the Edit/Delete action
//! columns when the role allows them.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::config::Theme;
use crate::table::{FilterControl, TableView};

pub const EDIT_LABEL: &str = "Edit";
pub const DELETE_LABEL: &str = "Delete";
const EMPTY_MESSAGE: &str = "No data available";

/// Selection and horizontal scroll for the grid.
#[derive(Debug, Default, Clone)]
pub struct GridState {
    pub table_state: TableState,
    pub focused_column: usize,
    column_offset: usize,
}

impl GridState {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default().with_selected(Some(0)),
            focused_column: 0,
            column_offset: 0,
        }
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn select_row(&mut self, row: Option<usize>) {
        self.table_state.select(row);
    }

    pub fn next_row(&mut self, rows: usize) {
        if rows == 0 {
            self.table_state.select(None);
            return;
        }
        let next = self.selected_row().map_or(0, |i| (i + 1).min(rows - 1));
        self.table_state.select(Some(next));
    }

    pub fn previous_row(&mut self, rows: usize) {
        if rows == 0 {
            self.table_state.select(None);
            return;
        }
        let previous = self.selected_row().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(previous));
    }

    pub fn next_column(&mut self, columns: usize) {
        if columns > 0 {
            self.focused_column = (self.focused_column + 1).min(columns - 1);
        }
    }

    pub fn previous_column(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }

    pub fn column_offset(&self) -> usize {
        self.column_offset
    }

    /// Keep the selection inside a page of `rows` rows and `columns` columns.
    pub fn clamp(&mut self, rows: usize, columns: usize) {
        self.focused_column = self.focused_column.min(columns.saturating_sub(1));
        self.column_offset = self.column_offset.min(self.focused_column);
        match (rows, self.selected_row()) {
            (0, _) => self.table_state.select(None),
            (n, Some(i)) if i >= n => self.table_state.select(Some(n - 1)),
            (_, None) => self.table_state.select(Some(0)),
            _ => {}
        }
    }
}

/// Text shown under a header label, and whether the filter is active.
pub fn filter_summary(control: &FilterControl) -> (String, bool) {
    match control {
        FilterControl::Text { value } if value.is_empty() => (String::new(), false),
        FilterControl::Text { value } => (format!("\"{}\"", value), true),
        FilterControl::MultiSelect { options } => {
            let selected: Vec<&str> = options
                .iter()
                .filter(|o| o.selected)
                .map(|o| o.label.as_str())
                .collect();
            match selected.as_slice() {
                [] => ("[any]".to_string(), false),
                [one] => (format!("[{}]", one), true),
                many => (format!("[{} selected]", many.len()), true),
            }
        }
    }
}

pub struct DataGrid<'a> {
    view: &'a TableView,
    cell_padding: u16,
    row_numbers: bool,
    header_fg: Color,
    header_bg: Color,
    alternate_row_bg: Option<Color>,
    row_numbers_fg: Color,
    sort_fg: Color,
    filter_fg: Color,
    dimmed_fg: Color,
    edit_fg: Color,
    delete_fg: Color,
    focused: bool,
}

impl<'a> DataGrid<'a> {
    pub fn new(view: &'a TableView) -> Self {
        Self {
            view,
            cell_padding: 1,
            row_numbers: false,
            header_fg: Color::White,
            header_bg: Color::Reset,
            alternate_row_bg: None,
            row_numbers_fg: Color::DarkGray,
            sort_fg: Color::Yellow,
            filter_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
            edit_fg: Color::Blue,
            delete_fg: Color::Red,
            focused: true,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.header_fg = theme.get("table_header");
        self.row_numbers_fg = theme.get("row_numbers");
        self.sort_fg = theme.get("sort_indicator");
        self.filter_fg = theme.get("filter_active");
        self.dimmed_fg = theme.get("dimmed");
        self.edit_fg = theme.get("action_edit");
        self.delete_fg = theme.get("action_delete");
        self.alternate_row_bg = theme
            .get_optional("alternate_row_color")
            .filter(|c| *c != Color::Reset);
        self
    }

    pub fn with_cell_padding(mut self, padding: u16) -> Self {
        self.cell_padding = padding;
        self
    }

    pub fn with_row_numbers(mut self, row_numbers: bool) -> Self {
        self.row_numbers = row_numbers;
        self
    }

    pub fn with_alternate_row_bg(mut self, color: Option<Color>) -> Self {
        self.alternate_row_bg = color;
        self
    }

    /// An unfocused grid (behind a popup) draws no selection highlight.
    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn header_style(&self) -> Style {
        if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        }
    }

    /// Widest of the label, filter summary and page cells, per column.
    fn content_widths(&self) -> Vec<u16> {
        self.view
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let label = header.display_label().chars().count();
                let filter = filter_summary(&header.filter).0.chars().count();
                let cells = self
                    .view
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(col))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                label.max(filter).max(cells).min(u16::MAX as usize) as u16
            })
            .collect()
    }

    fn row_number_width(&self) -> u16 {
        let last = self.view.rows.last().map_or(1, |r| r.index + 1);
        (last.to_string().len() as u16).max(1)
    }

    /// Columns that fit in `available`, starting at `offset`. The last one may
    /// be cut to the remaining width.
    fn fit_columns(&self, widths: &[u16], offset: usize, available: u16) -> Vec<(usize, u16)> {
        let mut used: u16 = 0;
        let mut visible = Vec::new();
        for (col, &width) in widths.iter().enumerate().skip(offset) {
            // Use > so the last column is shown when it fits exactly
            if used.saturating_add(width) > available {
                let rest = available.saturating_sub(used);
                if rest > 0 {
                    visible.push((col, rest));
                }
                break;
            }
            visible.push((col, width));
            used = used.saturating_add(width + self.cell_padding);
        }
        visible
    }

    /// Scroll right until the focused column fits.
    fn adjust_offset(&self, widths: &[u16], state: &mut GridState, available: u16) {
        let focused = state.focused_column.min(widths.len().saturating_sub(1));
        if focused < state.column_offset {
            state.column_offset = focused;
        }
        while state.column_offset < focused {
            let span: u16 = widths[state.column_offset..=focused]
                .iter()
                .map(|w| w + self.cell_padding)
                .sum();
            if span <= available {
                break;
            }
            state.column_offset += 1;
        }
    }

    fn header_cell(&self, col: usize, focused: bool) -> Cell<'a> {
        let header = &self.view.headers[col];
        let mut label_style = Style::default().add_modifier(Modifier::BOLD);
        if focused {
            label_style = label_style.add_modifier(Modifier::UNDERLINED);
        }
        let mut label = vec![Span::styled(header.label.clone(), label_style)];
        if let Some(direction) = header.sort {
            label.push(Span::styled(
                format!(" {}", direction.indicator()),
                Style::default().fg(self.sort_fg),
            ));
        }
        let (summary, active) = filter_summary(&header.filter);
        let summary_style = if active {
            Style::default().fg(self.filter_fg)
        } else {
            Style::default().fg(self.dimmed_fg)
        };
        Cell::from(Text::from(vec![
            Line::from(label),
            Line::from(Span::styled(summary, summary_style)),
        ]))
    }
}

impl StatefulWidget for DataGrid<'_> {
    type State = GridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GridState) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        state.clamp(self.view.rows.len(), self.view.headers.len());

        let number_width = self.row_number_width();
        let mut reserved: u16 = 0;
        if self.row_numbers {
            reserved += number_width + self.cell_padding;
        }
        if self.view.show_edit {
            reserved += EDIT_LABEL.len() as u16 + self.cell_padding;
        }
        if self.view.show_delete {
            reserved += DELETE_LABEL.len() as u16 + self.cell_padding;
        }
        let available = area.width.saturating_sub(reserved);

        let widths = self.content_widths();
        if !widths.is_empty() {
            self.adjust_offset(&widths, state, available);
        }
        let visible = self.fit_columns(&widths, state.column_offset, available);

        let mut constraints: Vec<u16> = Vec::new();
        let mut headers: Vec<Cell> = Vec::new();
        if self.row_numbers {
            constraints.push(number_width);
            headers.push(Cell::from(""));
        }
        for &(col, width) in &visible {
            constraints.push(width);
            headers.push(self.header_cell(col, col == state.focused_column));
        }
        if self.view.show_edit {
            constraints.push(EDIT_LABEL.len() as u16);
            headers.push(Cell::from(""));
        }
        if self.view.show_delete {
            constraints.push(DELETE_LABEL.len() as u16);
            headers.push(Cell::from(""));
        }

        let rows: Vec<Row> = self
            .view
            .rows
            .iter()
            .enumerate()
            .map(|(position, row)| {
                let mut cells: Vec<Cell> = Vec::with_capacity(constraints.len());
                if self.row_numbers {
                    cells.push(Cell::from(Span::styled(
                        (row.index + 1).to_string(),
                        Style::default().fg(self.row_numbers_fg),
                    )));
                }
                for &(col, _) in &visible {
                    cells.push(Cell::from(row.cells.get(col).cloned().unwrap_or_default()));
                }
                if self.view.show_edit {
                    cells.push(Cell::from(Span::styled(
                        EDIT_LABEL,
                        Style::default().fg(self.edit_fg),
                    )));
                }
                if self.view.show_delete {
                    cells.push(Cell::from(Span::styled(
                        DELETE_LABEL,
                        Style::default().fg(self.delete_fg),
                    )));
                }
                let style = if position % 2 == 1 {
                    self.alternate_row_bg
                        .map(|c| Style::default().bg(c))
                        .unwrap_or_default()
                } else {
                    Style::default()
                };
                Row::new(cells).style(style)
            })
            .collect();

        let highlight = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let empty = rows.is_empty();
        StatefulWidget::render(
            Table::new(rows, constraints)
                .column_spacing(self.cell_padding)
                .header(Row::new(headers).height(2).style(self.header_style()))
                .row_highlight_style(highlight),
            area,
            buf,
            &mut state.table_state,
        );

        if empty && area.height > 2 {
            let message_area = Rect::new(area.x, area.y + 2, area.width, 1);
            Paragraph::new(EMPTY_MESSAGE)
                .style(Style::default().fg(self.dimmed_fg))
                .centered()
                .render(message_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Actions;
    use crate::column::Column;
    use crate::table::{DataTable, OptionState, TableOptions};
    use serde_json::json;

    fn table() -> DataTable {
        let rows = (0..3)
            .map(|i| {
                json!({"id": i, "name": format!("item {}", i), "done": i == 1})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        let columns = vec![
            Column::new("id", "ID"),
            Column::new("name", "Name"),
            Column::new("done", "Done").with_multi_select(["true", "false"]),
        ];
        DataTable::new(columns, rows, TableOptions::new()).unwrap()
    }

    fn lines(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn render(view: &TableView, width: u16, state: &mut GridState) -> Vec<String> {
        let area = Rect::new(0, 0, width, 8);
        let mut buf = Buffer::empty(area);
        DataGrid::new(view).render(area, &mut buf, state);
        lines(&buf)
    }

    #[test]
    fn test_filter_summary() {
        assert_eq!(
            filter_summary(&FilterControl::Text {
                value: String::new()
            }),
            (String::new(), false)
        );
        assert_eq!(
            filter_summary(&FilterControl::Text {
                value: "ann".to_string()
            }),
            ("\"ann\"".to_string(), true)
        );
        let options = vec![
            OptionState {
                label: "Done".to_string(),
                selected: true,
            },
            OptionState {
                label: "Open".to_string(),
                selected: false,
            },
        ];
        assert_eq!(
            filter_summary(&FilterControl::MultiSelect { options }),
            ("[Done]".to_string(), true)
        );
    }

    #[test]
    fn test_renders_headers_and_rows() {
        let mut table = table();
        table.toggle_sort("name");
        let view = table.view();
        let mut state = GridState::new();
        let lines = render(&view, 40, &mut state);
        assert!(lines[0].contains("ID"));
        assert!(lines[0].contains("Name ▲"));
        assert!(lines[1].contains("[any]"));
        assert!(lines[2].contains("item 0"));
        assert!(lines[4].contains("item 2"));
        assert!(!lines.iter().any(|l| l.contains(EDIT_LABEL)));
    }

    #[test]
    fn test_action_columns_follow_role() {
        let table = table().with_actions(
            Actions::new()
                .with_role("Admin")
                .with_edit(["Admin"], |_, _| {})
                .with_delete(["Admin"], |_, _| {}),
        );
        let view = table.view();
        let lines = render(&view, 50, &mut GridState::new());
        assert!(lines[2].contains(EDIT_LABEL));
        assert!(lines[2].contains(DELETE_LABEL));
    }

    #[test]
    fn test_empty_page_message() {
        let mut table = table();
        table.set_search("no such thing");
        let view = table.view();
        let mut state = GridState::new();
        let lines = render(&view, 40, &mut state);
        assert!(lines[2].contains(EMPTY_MESSAGE));
        assert_eq!(state.selected_row(), None);
    }

    #[test]
    fn test_scrolls_to_focused_column() {
        let table = table();
        let view = table.view();
        let mut state = GridState::new();
        state.focused_column = 2;
        let lines = render(&view, 8, &mut state);
        assert!(state.column_offset() > 0);
        assert!(lines[0].contains("Done"));
    }

    #[test]
    fn test_row_navigation_clamps() {
        let mut state = GridState::new();
        state.next_row(2);
        state.next_row(2);
        assert_eq!(state.selected_row(), Some(1));
        state.previous_row(2);
        state.previous_row(2);
        assert_eq!(state.selected_row(), Some(0));
        state.clamp(0, 3);
        assert_eq!(state.selected_row(), None);
    }
}
