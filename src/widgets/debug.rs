//! `--debug` status line.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::table::DataTable;

#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key: String,
    /// Last action taken (e.g. "next_page") for debugging key handling.
    pub last_action: String,
    pub mode: String,
    pub snapshot: TableSnapshot,
}

/// Engine state captured at render time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub visible_rows: usize,
    pub total_rows: usize,
    pub page: usize,
    pub total_pages: usize,
    pub sort: String,
    pub active_filters: usize,
}

impl TableSnapshot {
    pub fn of(table: &DataTable) -> Self {
        let sort = match &table.sort().accessor {
            Some(accessor) => format!("{}:{:?}", accessor, table.sort().direction),
            None => "-".to_string(),
        };
        Self {
            visible_rows: table.visible_len(),
            total_rows: table.rows().len(),
            page: table.current_page(),
            total_pages: table.total_pages(),
            sort,
            active_filters: table.filters().active_count(),
        }
    }
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key = format!("{:?}/{:?}", event.code, event.kind);
    }

    pub fn line(&self) -> String {
        let s = &self.snapshot;
        format!(
            "events={} keys={} last_key={} action={} mode={} frames={} rows={}/{} page={}/{} sort={} filters={}",
            self.num_events,
            self.num_key_events,
            self.last_key,
            self.last_action,
            self.mode,
            self.num_frames,
            s.visible_rows,
            s.total_rows,
            s.page,
            s.total_pages,
            s.sort,
            s.active_filters
        )
    }
}

/// Renders the debug line in a single color.
pub struct DebugLine<'a> {
    state: &'a DebugState,
    color: Color,
}

impl<'a> DebugLine<'a> {
    pub fn new(state: &'a DebugState, color: Color) -> Self {
        Self { state, color }
    }
}

impl Widget for DebugLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            self.state.line(),
            Style::default().fg(self.color),
        ));
        Paragraph::new(line).render(area, buf);
    }
}
