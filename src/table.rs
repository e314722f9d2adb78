//! The table engine: owns filter, sort, and page state over caller rows.
//!
//! Every input runs the same synchronous pipeline: filter the rows, sort
//! the survivors, then clamp the page. The result is kept as a vector of
//! source indices so caller rows are never copied or reordered.

use crate::actions::{Actions, ClickTarget};
use crate::column::{validate_columns, Column, FilterKind};
use crate::error::{Result, TableError};
use crate::export::{export_file_name, to_csv, CsvExport};
use crate::filter::{filter_rows, ColumnFilter, FilterState};
use crate::paginate::{clamp_page, paginate, total_pages, Page};
use crate::row::{row_key, Row};
use crate::sort::{sort_rows, ComparatorChain, OrdinalDomain, SortDirection, SortState};
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_PLACEHOLDER: &str = "N/A";
pub const DEFAULT_ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub page_size: usize,
    /// Shown for missing values.
    pub placeholder: String,
    pub id_field: String,
    pub footer: Vec<String>,
    pub ordinals: Vec<OrdinalDomain>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self {
            title: None,
            caption: None,
            page_size: DEFAULT_PAGE_SIZE,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            footer: Vec::new(),
            ordinals: vec![OrdinalDomain::priority()],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_footer<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.footer = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the ordinal domains consulted when sorting.
    pub fn with_ordinals(mut self, ordinals: Vec<OrdinalDomain>) -> Self {
        self.ordinals = ordinals;
        self
    }
}

/// Filter control shown under a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterControl {
    Text { value: String },
    MultiSelect { options: Vec<OptionState> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionState {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub accessor: String,
    pub label: String,
    pub sort: Option<SortDirection>,
    pub filter: FilterControl,
}

impl HeaderView {
    /// Label with the sort arrow appended when this column is sorted.
    pub fn display_label(&self) -> String {
        match self.sort {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: String,
    /// Position in the filtered and sorted sequence.
    pub index: usize,
    /// Position in the caller's rows.
    pub source_index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// Everything a front end needs to draw the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub headers: Vec<HeaderView>,
    pub show_edit: bool,
    pub show_delete: bool,
    pub rows: Vec<RowView>,
    pub footer: Vec<String>,
    pub page: PageInfo,
}

pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    options: TableOptions,
    chain: ComparatorChain,
    actions: Actions,
    filters: FilterState,
    sort: SortState,
    page: usize,
    visible: Vec<usize>,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>, options: TableOptions) -> Result<Self> {
        if options.page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        validate_columns(&columns)?;
        let chain = ComparatorChain::with_ordinals(options.ordinals.clone());
        let mut table = Self {
            columns,
            rows,
            options,
            chain,
            actions: Actions::default(),
            filters: FilterState::default(),
            sort: SortState::default(),
            page: 1,
            visible: Vec::new(),
        };
        table.recompute();
        Ok(table)
    }

    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }

    /// Swap in a custom comparator chain and re-sort.
    pub fn with_comparators(mut self, chain: ComparatorChain) -> Self {
        self.chain = chain;
        self.recompute();
        self
    }

    pub fn set_actions(&mut self, actions: Actions) {
        self.actions = actions;
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, accessor: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.accessor() == accessor)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn search(&self) -> &str {
        &self.filters.search
    }

    pub fn page_size(&self) -> usize {
        self.options.page_size
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filters.search = term.into();
        self.reset_and_recompute();
    }

    /// Set a text filter. Ignored with a warning if `accessor` is not a
    /// text-filtered column.
    pub fn set_text_filter(&mut self, accessor: &str, text: impl Into<String>) -> bool {
        match self.column(accessor).map(Column::filter_kind) {
            Some(FilterKind::Text) => {}
            Some(FilterKind::MultiSelect { .. }) => {
                log::warn!("ignoring text filter on multi-select column `{}`", accessor);
                return false;
            }
            None => {
                log::warn!("ignoring filter on unknown column `{}`", accessor);
                return false;
            }
        }
        let text = text.into();
        if text.trim().is_empty() {
            self.filters.columns.remove(accessor);
        } else {
            self.filters
                .columns
                .insert(accessor.to_string(), ColumnFilter::Text(text));
        }
        self.reset_and_recompute();
        true
    }

    /// Replace the selected options of a multi-select filter. Labels that
    /// are not options of the column are dropped.
    pub fn set_multi_filter<I, S>(&mut self, accessor: &str, selected: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(options) = self.multi_select_options(accessor) else {
            return false;
        };
        let mut set = BTreeSet::new();
        for label in selected.into_iter().map(Into::into) {
            if options.contains(&label) {
                set.insert(label);
            } else {
                log::warn!("`{}` is not an option of column `{}`", label, accessor);
            }
        }
        if set.is_empty() {
            self.filters.columns.remove(accessor);
        } else {
            self.filters
                .columns
                .insert(accessor.to_string(), ColumnFilter::Options(set));
        }
        self.reset_and_recompute();
        true
    }

    /// Flip one option of a multi-select filter.
    pub fn toggle_option(&mut self, accessor: &str, option: &str) -> bool {
        let mut selected = self.selected_options(accessor);
        if !selected.remove(option) {
            selected.insert(option.to_string());
        }
        self.set_multi_filter(accessor, selected)
    }

    pub fn selected_options(&self, accessor: &str) -> BTreeSet<String> {
        match self.filters.get(accessor) {
            Some(ColumnFilter::Options(set)) => set.clone(),
            _ => BTreeSet::new(),
        }
    }

    pub fn text_filter(&self, accessor: &str) -> &str {
        match self.filters.get(accessor) {
            Some(ColumnFilter::Text(text)) => text,
            _ => "",
        }
    }

    fn multi_select_options(&self, accessor: &str) -> Option<Vec<String>> {
        match self.column(accessor).map(Column::filter_kind) {
            Some(FilterKind::MultiSelect { options, .. }) => Some(options.clone()),
            Some(FilterKind::Text) => {
                log::warn!("ignoring option filter on text column `{}`", accessor);
                None
            }
            None => {
                log::warn!("ignoring filter on unknown column `{}`", accessor);
                None
            }
        }
    }

    pub fn clear_filter(&mut self, accessor: &str) {
        if self.filters.columns.remove(accessor).is_some() {
            self.reset_and_recompute();
        }
    }

    /// Drop every column filter and the search term.
    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.reset_and_recompute();
    }

    pub fn toggle_sort(&mut self, accessor: &str) -> bool {
        if self.column(accessor).is_none() {
            log::warn!("ignoring sort on unknown column `{}`", accessor);
            return false;
        }
        self.sort.toggle(accessor);
        self.reset_and_recompute();
        true
    }

    pub fn set_sort(&mut self, accessor: &str, direction: SortDirection) -> bool {
        if self.column(accessor).is_none() {
            log::warn!("ignoring sort on unknown column `{}`", accessor);
            return false;
        }
        self.sort = SortState::by(accessor, direction);
        self.reset_and_recompute();
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortState::default();
        self.reset_and_recompute();
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.visible.len(), self.options.page_size)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.visible.len(), self.options.page_size);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// Replace the caller rows (after an external edit or delete). The page
    /// is clamped, not reset.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        log::info!("replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
        self.recompute();
        self.set_page(self.page);
    }

    /// Source indices of the filtered and sorted rows.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.visible.iter().filter_map(|&idx| self.rows.get(idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Source indices on the current page.
    pub fn current_page_slice(&self) -> Page<usize> {
        paginate(&self.visible, self.page, self.options.page_size)
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        self.current_page_slice()
            .items
            .into_iter()
            .filter_map(|idx| self.rows.get(idx))
            .collect()
    }

    /// Source index of the row at `position` in the filtered and sorted set.
    pub fn source_index(&self, position: usize) -> Option<usize> {
        self.visible.get(position).copied()
    }

    /// Absolute position of a row on the current page.
    pub fn absolute_index(&self, page_row: usize) -> usize {
        (self.page - 1) * self.options.page_size + page_row
    }

    /// Row on the current page with its absolute index.
    pub fn row_at(&self, page_row: usize) -> Option<(&Row, usize)> {
        if page_row >= self.options.page_size {
            return None;
        }
        let absolute = self.absolute_index(page_row);
        let source = self.source_index(absolute)?;
        self.rows.get(source).map(|row| (row, absolute))
    }

    /// Route a click on a page row. Edit and Delete only fire their own
    /// callback; the row callback never sees them.
    pub fn click(&mut self, page_row: usize, target: ClickTarget) -> bool {
        if page_row >= self.options.page_size {
            return false;
        }
        let absolute = self.absolute_index(page_row);
        let Some(row) = self
            .visible
            .get(absolute)
            .and_then(|&source| self.rows.get(source))
        else {
            return false;
        };
        self.actions.dispatch(target, row, absolute)
    }

    pub fn export_csv(&self) -> CsvExport {
        let data = to_csv(&self.rows, &self.visible, &self.columns);
        CsvExport {
            file_name: export_file_name(self.options.title.as_deref()),
            data,
        }
    }

    pub fn page_info(&self) -> PageInfo {
        let total = self.total_pages();
        PageInfo {
            page: self.page,
            total_pages: total,
            total_rows: self.visible.len(),
            has_previous: self.page > 1,
            has_next: self.page < total,
        }
    }

    pub fn view(&self) -> TableView {
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderView {
                accessor: column.accessor().to_string(),
                label: column.header().to_string(),
                sort: self.sort.direction_of(column.accessor()),
                filter: self.filter_control(column),
            })
            .collect();

        let page = self.current_page_slice();
        let rows = page
            .items
            .iter()
            .enumerate()
            .filter_map(|(position, &source)| {
                let row = self.rows.get(source)?;
                let index = page.offset + position;
                Some(RowView {
                    key: row_key(row, &self.options.id_field, position),
                    index,
                    source_index: source,
                    cells: self
                        .columns
                        .iter()
                        .map(|c| c.render_cell(row, index, &self.options.placeholder))
                        .collect(),
                })
            })
            .collect();

        TableView {
            title: self.options.title.clone(),
            caption: self.options.caption.clone(),
            headers,
            show_edit: self.actions.can_edit(),
            show_delete: self.actions.can_delete(),
            rows,
            footer: self.options.footer.clone(),
            page: self.page_info(),
        }
    }

    fn filter_control(&self, column: &Column) -> FilterControl {
        match column.filter_kind() {
            FilterKind::Text => FilterControl::Text {
                value: self.text_filter(column.accessor()).to_string(),
            },
            FilterKind::MultiSelect { options, .. } => {
                let selected = self.selected_options(column.accessor());
                FilterControl::MultiSelect {
                    options: options
                        .iter()
                        .map(|label| OptionState {
                            label: label.clone(),
                            selected: selected.contains(label),
                        })
                        .collect(),
                }
            }
        }
    }

    fn reset_and_recompute(&mut self) {
        self.page = 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        let filtered = filter_rows(&self.rows, &self.columns, &self.filters);
        self.visible = sort_rows(&self.rows, &filtered, &self.sort, &self.chain);
        log::debug!(
            "recomputed view: {} of {} rows, sort {:?}",
            self.visible.len(),
            self.rows.len(),
            self.sort
        );
    }
}

impl std::fmt::Debug for DataTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("options", &self.options)
            .field("chain", &self.chain)
            .field("actions", &self.actions)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("visible", &self.visible.len())
            .finish()
    }
}
