use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, StatefulWidget};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod actions;
pub mod column;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod paginate;
pub mod row;
pub mod schema;
pub mod sort;
pub mod source;
pub mod table;
pub mod widgets;

pub use actions::{Actions, ClickTarget, DEFAULT_ACTION_ROLES};
pub use column::{Column, FilterKind, Projection, Render};
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use datagrid_cli::{Args, RowFormat};
pub use error::{RenderError, TableError};
pub use export::CsvExport;
pub use filter::{ColumnFilter, FilterState};
pub use row::{CellValue, Row};
pub use schema::TableSchema;
pub use sort::{ComparatorChain, KeyComparator, OrdinalDomain, SortDirection, SortState};
pub use table::{DataTable, TableOptions, TableView};

use export::export_file_name;
use widgets::controls::Controls;
use widgets::datatable::{DataGrid, GridState};
use widgets::debug::{DebugLine, DebugState, TableSnapshot};
use widgets::option_picker::{OptionPicker, OptionPickerView, PickerEvent};
use widgets::popup::{centered_rect_fixed, ConfirmationModal, DetailPopup};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for config and log directories
pub const APP_NAME: &str = "datagrid";

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16), // resized (width, height)
    /// Posted by the view callback with the clicked row.
    ViewRequested(Row),
    /// Posted by the edit callback with the row's absolute index. The
    /// App applies the change to the row it captured at click time.
    EditRequested(usize),
    DeleteRequested(usize),
    Export,
    Exit,
    Crash(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    ColumnFilter,
    OptionPicker,
    Detail,
    Edit,
    ConfirmDelete,
}

/// Table options layered as config `[display]` and `[sorting]`, then the
/// schema, then command-line overrides.
pub fn table_options(config: &AppConfig, schema: &TableSchema, args: &Args) -> Result<TableOptions> {
    let base = TableOptions::new()
        .with_page_size(config.display.page_size)
        .with_placeholder(config.display.placeholder.clone())
        .with_ordinals(config.sorting.domains()?);
    let mut options = schema.apply_options(base)?;
    if let Some(page_size) = args.page_size {
        options.page_size = page_size;
    }
    if let Some(title) = &args.title {
        options.title = Some(title.clone());
    }
    Ok(options)
}

/// Build the table for `rows` and apply the initial search, filters and sort
/// from `args`.
pub fn build_table(
    rows: Vec<Row>,
    schema: &TableSchema,
    config: &AppConfig,
    args: &Args,
) -> Result<DataTable> {
    let columns = schema.to_columns(&rows)?;
    let options = table_options(config, schema, args)?;
    let mut table = DataTable::new(columns, rows, options)?;
    apply_args(&mut table, args)?;
    Ok(table)
}

pub fn apply_args(table: &mut DataTable, args: &Args) -> Result<()> {
    if let Some(search) = &args.search {
        table.set_search(search.clone());
    }
    for filter in &args.filter {
        let multi_select = table
            .column(&filter.accessor)
            .map(Column::is_multi_select)
            .ok_or_else(|| eyre!("--filter: no column with accessor '{}'", filter.accessor))?;
        if multi_select {
            table.set_multi_filter(&filter.accessor, filter.options());
        } else {
            table.set_text_filter(&filter.accessor, filter.value.clone());
        }
    }
    if let Some(sort) = &args.sort {
        let direction = if sort.descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        if !table.set_sort(&sort.accessor, direction) {
            return Err(eyre!("--sort: no column with accessor '{}'", sort.accessor));
        }
    }
    Ok(())
}

/// Actions whose callbacks post back to the event loop. The role comes from
/// `--role`, falling back to config `[session] role`.
pub fn event_actions(config: &AppConfig, role: Option<String>, events: &Sender<AppEvent>) -> Actions {
    let edit_tx = events.clone();
    let delete_tx = events.clone();
    let view_tx = events.clone();
    let mut actions = Actions::new()
        .with_edit(config.permissions.edit_roles.clone(), move |_, index| {
            send_or_log(&edit_tx, AppEvent::EditRequested(index));
        })
        .with_delete(config.permissions.delete_roles.clone(), move |_, index| {
            send_or_log(&delete_tx, AppEvent::DeleteRequested(index));
        })
        .with_view(move |row| {
            send_or_log(&view_tx, AppEvent::ViewRequested(row.clone()));
        });
    actions.set_role(role.or_else(|| config.session.role.clone()));
    actions
}

fn send_or_log(events: &Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = events.send(event) {
        log::warn!("event loop is gone: {}", e);
    }
}

/// Typed value for an edited cell, shaped like the value it replaces.
pub fn parse_edit_value(text: &str, previous: Option<&Value>) -> Value {
    let trimmed = text.trim();
    match previous {
        Some(Value::Number(_)) => {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Value::from(n);
            }
            if let Some(n) = trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                return Value::Number(n);
            }
        }
        Some(Value::Bool(_)) => match trimmed.to_lowercase().as_str() {
            "true" | "yes" | "1" => return Value::Bool(true),
            "false" | "no" | "0" => return Value::Bool(false),
            _ => {}
        },
        Some(Value::Array(_)) => {
            return Value::Array(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )
        }
        _ => {}
    }
    Value::String(text.to_string())
}

/// Text the edit input starts with for a cell.
fn edit_text(value: CellValue<'_>) -> String {
    match value {
        CellValue::Sequence(_) => value.fragments().join(", "),
        other => other.fragments().into_iter().next().unwrap_or_default(),
    }
}

pub struct App {
    table: DataTable,
    config: AppConfig,
    theme: Theme,
    events: Sender<AppEvent>,
    pub input_mode: InputMode,
    grid_state: GridState,
    search_input: TextInput,
    filter_input: TextInput,
    edit_input: TextInput,
    /// Column the filter or edit input applies to.
    input_accessor: Option<String>,
    /// Edit waiting for its EditRequested event.
    pending_edit: Option<PendingEdit>,
    /// Row confirmed for deletion, waiting for its DeleteRequested event.
    pending_delete: Option<RowTarget>,
    picker: OptionPicker,
    detail: DetailPopup,
    confirmation: ConfirmationModal,
    status: Option<String>,
    debug: DebugState,
}

/// A row picked for an edit or delete.
#[derive(Debug, Clone)]
struct RowTarget {
    source: usize,
    row: Row,
}

impl RowTarget {
    /// Current source index of the row, following it if the rows were
    /// replaced since it was picked.
    fn locate(&self, rows: &[Row]) -> Option<usize> {
        if rows.get(self.source) == Some(&self.row) {
            return Some(self.source);
        }
        rows.iter().position(|row| row == &self.row)
    }
}

#[derive(Debug, Clone)]
struct PendingEdit {
    target: RowTarget,
    accessor: String,
    text: String,
}

impl App {
    pub fn new(table: DataTable, config: AppConfig, theme: Theme, events: Sender<AppEvent>) -> Self {
        Self {
            table,
            search_input: TextInput::new().with_theme(&theme),
            filter_input: TextInput::new().with_theme(&theme),
            edit_input: TextInput::new().with_theme(&theme),
            config,
            theme,
            events,
            input_mode: InputMode::Normal,
            grid_state: GridState::new(),
            input_accessor: None,
            pending_edit: None,
            pending_delete: None,
            picker: OptionPicker::default(),
            detail: DetailPopup::default(),
            confirmation: ConfirmationModal::default(),
            status: None,
            debug: DebugState::default(),
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable {
        &mut self.table
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.grid_state.selected_row()
    }

    pub fn focused_column(&self) -> usize {
        self.grid_state.focused_column
    }

    pub fn detail_text(&self) -> Option<&str> {
        self.detail.active.then_some(self.detail.text.as_str())
    }

    fn focused_accessor(&self) -> Option<String> {
        self.table
            .columns()
            .get(self.grid_state.focused_column)
            .map(|c| c.accessor().to_string())
    }

    fn page_len(&self) -> usize {
        self.table.current_page_slice().items.len()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.status = Some(message);
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::ViewRequested(row) => {
                self.detail.open(row);
                self.input_mode = InputMode::Detail;
                None
            }
            AppEvent::EditRequested(index) => {
                self.apply_edit(*index);
                None
            }
            AppEvent::DeleteRequested(index) => {
                self.apply_delete(*index);
                None
            }
            AppEvent::Export => {
                self.export();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.debug.on_key(event);

        match self.input_mode {
            InputMode::Normal => self.normal_key(event),
            InputMode::Search => {
                match self.search_input.handle_key(event) {
                    TextInputEvent::Changed => {
                        self.table.set_search(self.search_input.value().to_string());
                        self.grid_state.select_row(Some(0));
                    }
                    TextInputEvent::Submit => self.leave_input(),
                    TextInputEvent::Cancel => {
                        self.search_input.clear();
                        self.table.set_search("");
                        self.leave_input();
                    }
                    TextInputEvent::None => {}
                }
                None
            }
            InputMode::ColumnFilter => {
                let accessor = self.input_accessor.clone()?;
                match self.filter_input.handle_key(event) {
                    TextInputEvent::Changed => {
                        self.table
                            .set_text_filter(&accessor, self.filter_input.value().to_string());
                        self.grid_state.select_row(Some(0));
                    }
                    TextInputEvent::Submit => self.leave_input(),
                    TextInputEvent::Cancel => {
                        self.table.clear_filter(&accessor);
                        self.leave_input();
                    }
                    TextInputEvent::None => {}
                }
                None
            }
            InputMode::OptionPicker => {
                let accessor = self.picker.accessor.clone();
                match self.picker.handle_key(event) {
                    PickerEvent::Toggle(label) => {
                        self.table.toggle_option(&accessor, &label);
                        self.sync_picker();
                    }
                    PickerEvent::ClearAll => {
                        self.table.clear_filter(&accessor);
                        self.sync_picker();
                    }
                    PickerEvent::Close => {
                        self.picker.close();
                        self.input_mode = InputMode::Normal;
                    }
                    PickerEvent::None => {}
                }
                None
            }
            InputMode::Detail => {
                match event.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                        self.detail.close();
                        self.input_mode = InputMode::Normal;
                    }
                    KeyCode::Down | KeyCode::Char('j') => self.detail.scroll_down(),
                    KeyCode::Up | KeyCode::Char('k') => self.detail.scroll_up(),
                    _ => {}
                }
                None
            }
            InputMode::Edit => {
                match self.edit_input.handle_key(event) {
                    TextInputEvent::Submit => {
                        self.commit_edit();
                        self.leave_input();
                    }
                    TextInputEvent::Cancel => self.leave_input(),
                    TextInputEvent::Changed | TextInputEvent::None => {}
                }
                None
            }
            InputMode::ConfirmDelete => {
                match event.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                        self.confirmation.focus_yes = !self.confirmation.focus_yes;
                    }
                    KeyCode::Char('y') => self.confirm_delete(true),
                    KeyCode::Char('n') | KeyCode::Esc => self.confirm_delete(false),
                    KeyCode::Enter => self.confirm_delete(self.confirmation.focus_yes),
                    _ => {}
                }
                None
            }
        }
    }

    fn normal_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let columns = self.table.columns().len();
        let action = match event.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.grid_state.next_row(self.page_len());
                "next_row"
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.grid_state.previous_row(self.page_len());
                "previous_row"
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.grid_state.next_column(columns);
                "next_column"
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.grid_state.previous_column();
                "previous_column"
            }
            KeyCode::Char('s') => {
                if let Some(accessor) = self.focused_accessor() {
                    self.table.toggle_sort(&accessor);
                    self.grid_state.select_row(Some(0));
                }
                "toggle_sort"
            }
            KeyCode::Char('/') => {
                self.search_input.set_value(self.table.search().to_string());
                self.search_input.set_focused(true);
                self.input_mode = InputMode::Search;
                "search"
            }
            KeyCode::Char('f') => {
                self.open_filter();
                "filter"
            }
            KeyCode::Char('c') => {
                if let Some(accessor) = self.focused_accessor() {
                    self.table.clear_filter(&accessor);
                }
                "clear_filter"
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                self.table.next_page();
                self.grid_state.select_row(Some(0));
                "next_page"
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                self.table.previous_page();
                self.grid_state.select_row(Some(0));
                "previous_page"
            }
            KeyCode::Enter => {
                if let Some(row) = self.selected_row() {
                    self.table.click(row, ClickTarget::Row);
                }
                "view"
            }
            KeyCode::Char('e') => {
                self.open_edit();
                "edit"
            }
            KeyCode::Char('d') => {
                self.open_delete();
                "delete"
            }
            KeyCode::Char('x') => return Some(AppEvent::Export),
            _ => return None,
        };
        self.debug.last_action = action.to_string();
        None
    }

    fn leave_input(&mut self) {
        self.search_input.set_focused(false);
        self.filter_input.set_focused(false);
        self.edit_input.set_focused(false);
        self.input_mode = InputMode::Normal;
    }

    fn open_filter(&mut self) {
        let Some(column) = self.table.columns().get(self.grid_state.focused_column) else {
            return;
        };
        let accessor = column.accessor().to_string();
        if column.is_multi_select() {
            let title = column.header().to_string();
            let options = self.option_states(&accessor);
            self.picker.open(&accessor, &title, options);
            self.input_mode = InputMode::OptionPicker;
        } else {
            self.filter_input
                .set_value(self.table.text_filter(&accessor).to_string());
            self.filter_input.set_focused(true);
            self.input_accessor = Some(accessor);
            self.input_mode = InputMode::ColumnFilter;
        }
    }

    fn option_states(&self, accessor: &str) -> Vec<table::OptionState> {
        let selected = self.table.selected_options(accessor);
        self.table
            .column(accessor)
            .map(|c| {
                c.options()
                    .iter()
                    .map(|label| table::OptionState {
                        label: label.clone(),
                        selected: selected.contains(label),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sync_picker(&mut self) {
        let options = self.option_states(&self.picker.accessor);
        self.picker.sync(options);
        self.grid_state.select_row(Some(0));
    }

    fn open_edit(&mut self) {
        if !self.table.actions().can_edit() {
            self.set_status(self.denied_message("edit"));
            return;
        }
        let (Some(page_row), Some(accessor)) = (self.selected_row(), self.focused_accessor())
        else {
            return;
        };
        let Some((row, _)) = self.table.row_at(page_row) else {
            return;
        };
        let text = edit_text(CellValue::of(row, &accessor));
        self.edit_input.set_value(text);
        self.edit_input.set_focused(true);
        self.input_accessor = Some(accessor);
        self.input_mode = InputMode::Edit;
    }

    fn commit_edit(&mut self) {
        let (Some(page_row), Some(accessor)) = (self.selected_row(), self.input_accessor.clone())
        else {
            return;
        };
        let Some(target) = self.target_at(page_row) else {
            return;
        };
        self.pending_edit = Some(PendingEdit {
            target,
            accessor,
            text: self.edit_input.value().to_string(),
        });
        if !self.table.click(page_row, ClickTarget::Edit) {
            self.pending_edit = None;
        }
    }

    /// Source position and contents of a page row, captured when the
    /// click fires so later sorts or filters cannot retarget the change.
    fn target_at(&self, page_row: usize) -> Option<RowTarget> {
        let (row, absolute) = self.table.row_at(page_row)?;
        let source = self.table.source_index(absolute)?;
        Some(RowTarget {
            source,
            row: row.clone(),
        })
    }

    fn apply_edit(&mut self, index: usize) {
        let Some(PendingEdit {
            target,
            accessor,
            text,
        }) = self.pending_edit.take()
        else {
            return;
        };
        let Some(source) = target.locate(self.table.rows()) else {
            log::warn!("edit target for row {} no longer exists", index + 1);
            return;
        };
        let mut rows = self.table.rows().to_vec();
        if let Some(row) = rows.get_mut(source) {
            let value = parse_edit_value(&text, row.get(&accessor));
            row.insert(accessor.clone(), value);
        }
        self.table.set_rows(rows);
        self.set_status(format!("Updated {} in row {}", accessor, index + 1));
    }

    fn open_delete(&mut self) {
        if !self.table.actions().can_delete() {
            self.set_status(self.denied_message("delete"));
            return;
        }
        let Some(page_row) = self.selected_row() else {
            return;
        };
        let Some((row, index)) = self.table.row_at(page_row) else {
            return;
        };
        let key = row::row_key(row, &self.table.options().id_field, page_row);
        self.confirmation
            .open(format!("Delete row {} (id {})?", index + 1, key));
        self.input_mode = InputMode::ConfirmDelete;
    }

    fn confirm_delete(&mut self, confirmed: bool) {
        self.confirmation.close();
        self.input_mode = InputMode::Normal;
        if !confirmed {
            return;
        }
        let Some(page_row) = self.selected_row() else {
            return;
        };
        self.pending_delete = self.target_at(page_row);
        if !self.table.click(page_row, ClickTarget::Delete) {
            self.pending_delete = None;
        }
    }

    fn apply_delete(&mut self, index: usize) {
        let Some(target) = self.pending_delete.take() else {
            return;
        };
        let Some(source) = target.locate(self.table.rows()) else {
            log::warn!("delete target for row {} no longer exists", index + 1);
            return;
        };
        let mut rows = self.table.rows().to_vec();
        rows.remove(source);
        self.table.set_rows(rows);
        self.grid_state.clamp(self.page_len(), self.table.columns().len());
        self.set_status(format!("Deleted row {}", index + 1));
    }

    fn denied_message(&self, action: &str) -> String {
        match self.table.actions().user_role() {
            Some(role) => format!("Role '{}' may not {} rows", role, action),
            None => format!("No role set; cannot {} rows", action),
        }
    }

    /// CSV of the filtered and sorted rows, named after the title or the
    /// configured default name.
    pub fn csv_export(&self) -> CsvExport {
        let mut export = self.table.export_csv();
        if self.table.options().title.is_none() {
            export.file_name = export_file_name(Some(&self.config.export.default_name));
        }
        export
    }

    /// Write the filtered and sorted rows to the export directory.
    pub fn export(&mut self) -> Option<PathBuf> {
        let export = self.csv_export();
        let dir = self
            .config
            .export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        match export.save_to(&dir) {
            Ok(path) => {
                self.set_status(format!(
                    "Exported {} rows to {}",
                    self.table.visible_len(),
                    path.display()
                ));
                Some(path)
            }
            Err(e) => {
                log::error!("export to {} failed: {}", dir.display(), e);
                self.status = Some(format!("Export failed: {}", e));
                None
            }
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let options = self.table.options();
        let mut spans = Vec::new();
        if let Some(title) = &options.title {
            spans.push(Span::styled(
                title.clone(),
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(caption) = &options.caption {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                caption.clone(),
                Style::default().fg(self.theme.get("dimmed")),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_input_strip(&self, area: Rect, buf: &mut Buffer) {
        let header = |accessor: &Option<String>| {
            accessor
                .as_deref()
                .and_then(|a| self.table.column(a))
                .map(|c| c.header().to_string())
                .unwrap_or_default()
        };
        let (label, input) = match self.input_mode {
            InputMode::ColumnFilter => (
                format!("Filter {}: ", header(&self.input_accessor)),
                &self.filter_input,
            ),
            InputMode::Edit => (
                format!("Edit {}: ", header(&self.input_accessor)),
                &self.edit_input,
            ),
            _ => ("Search: ".to_string(), &self.search_input),
        };
        let label_width = (label.chars().count() as u16).min(area.width);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(label_width), Constraint::Fill(1)])
            .split(area);
        Paragraph::new(label)
            .style(Style::default().fg(self.theme.get("keybind_labels")))
            .render(chunks[0], buf);
        input.render(chunks[1], buf);
    }

    fn render_pagination(&self, area: Rect, buf: &mut Buffer) {
        let page = self.table.page_info();
        let enabled = Style::default().fg(self.theme.get("text_primary"));
        let disabled = Style::default().fg(self.theme.get("dimmed"));
        let mut spans = vec![
            Span::styled(
                "< Prev",
                if page.has_previous { enabled } else { disabled },
            ),
            Span::raw("  "),
            Span::styled(page.label(), enabled),
            Span::raw("  "),
            Span::styled("Next >", if page.has_next { enabled } else { disabled }),
        ];
        let footer = &self.table.options().footer;
        if !footer.is_empty() {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                footer.join("  "),
                Style::default().fg(self.theme.get("secondary")),
            ));
        }
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(area);
        Paragraph::new(Line::from(spans)).render(chunks[0], buf);
        if let Some(status) = &self.status {
            Paragraph::new(status.as_str())
                .style(Style::default().fg(self.theme.get("success")))
                .right_aligned()
                .render(chunks[1], buf);
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        if self.debug.enabled {
            self.debug.mode = format!("{:?}", self.input_mode);
            self.debug.snapshot = TableSnapshot::of(&self.table);
        }

        Clear.render(area, buf);

        let options = self.table.options();
        let has_title = options.title.is_some() || options.caption.is_some();
        let mut constraints = Vec::new();
        if has_title {
            constraints.push(Constraint::Length(1));
        }
        constraints.extend([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut i = 0;
        if has_title {
            self.render_title(layout[i], buf);
            i += 1;
        }
        self.render_input_strip(layout[i], buf);
        let grid_area = layout[i + 1];

        let view = self.table.view();
        let grid = DataGrid::new(&view)
            .with_theme(&self.theme)
            .with_cell_padding(self.config.display.table_cell_padding)
            .with_row_numbers(self.config.display.row_numbers)
            .with_focus(self.input_mode == InputMode::Normal);
        grid.render(grid_area, buf, &mut self.grid_state);

        self.render_pagination(layout[i + 2], buf);

        let controls = Controls::new()
            .with_theme(&self.theme)
            .with_row_count(self.table.visible_len())
            .with_dimmed(self.input_mode != InputMode::Normal)
            .with_search_active(self.input_mode == InputMode::Search);
        (&controls).render(layout[i + 3], buf);

        if self.debug.enabled {
            DebugLine::new(&self.debug, self.theme.get("dimmed")).render(layout[i + 4], buf);
        }

        match self.input_mode {
            InputMode::OptionPicker => {
                let popup = centered_rect_fixed(grid_area, self.picker.width(), self.picker.height());
                OptionPickerView::new(
                    &self.picker,
                    self.theme.get("modal_border_active"),
                    self.theme.get("filter_active"),
                )
                .render(popup, buf);
            }
            InputMode::Detail => self.detail.render(
                area,
                buf,
                self.theme.get("modal_border"),
                self.theme.get("text_primary"),
            ),
            InputMode::ConfirmDelete => self.confirmation.render(
                area,
                buf,
                self.theme.get("modal_border_error"),
                self.theme.get("text_primary"),
            ),
            _ => {}
        }
    }
}
