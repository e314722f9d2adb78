//! Filter stage: global search plus per-column filters, combined by AND.

use crate::column::{Column, FilterKind};
use crate::row::{CellValue, Row};
use std::collections::{BTreeMap, BTreeSet};

/// Constraint on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Case-insensitive substring.
    Text(String),
    /// Selected option labels of a multi-select column.
    Options(BTreeSet<String>),
}

impl ColumnFilter {
    pub fn is_active(&self) -> bool {
        match self {
            ColumnFilter::Text(text) => !text.trim().is_empty(),
            ColumnFilter::Options(set) => !set.is_empty(),
        }
    }

    /// Whether this filter can be applied to a column of the given kind.
    pub fn fits(&self, kind: &FilterKind) -> bool {
        matches!(
            (self, kind),
            (ColumnFilter::Text(_), FilterKind::Text)
                | (ColumnFilter::Options(_), FilterKind::MultiSelect { .. })
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub columns: BTreeMap<String, ColumnFilter>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && !self.columns.values().any(ColumnFilter::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.columns.values().filter(|f| f.is_active()).count()
    }

    pub fn get(&self, accessor: &str) -> Option<&ColumnFilter> {
        self.columns.get(accessor)
    }
}

/// Indices of the rows that pass `state`, in ascending source order.
pub fn filter_rows(rows: &[Row], columns: &[Column], state: &FilterState) -> Vec<usize> {
    // Whitespace-only terms are inactive, but a real term matches as typed
    let needle = if state.search.trim().is_empty() {
        String::new()
    } else {
        state.search.to_lowercase()
    };

    let active: Vec<(&Column, Matcher)> = columns
        .iter()
        .filter_map(|column| {
            let filter = state.columns.get(column.accessor())?;
            if !filter.is_active() || !filter.fits(column.filter_kind()) {
                return None;
            }
            Some((column, Matcher::new(filter)))
        })
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| needle.is_empty() || matches_search(row, columns, &needle))
        .filter(|(_, row)| active.iter().all(|(column, m)| m.matches(column, row)))
        .map(|(idx, _)| idx)
        .collect()
}

fn matches_search(row: &Row, columns: &[Column], needle: &str) -> bool {
    columns
        .iter()
        .any(|column| contains_text(column.value(row), needle))
}

fn contains_text(value: CellValue<'_>, needle: &str) -> bool {
    value
        .fragments()
        .iter()
        .any(|fragment| fragment.to_lowercase().contains(needle))
}

enum Matcher<'a> {
    Text(String),
    Options(&'a BTreeSet<String>),
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a ColumnFilter) -> Self {
        match filter {
            ColumnFilter::Text(text) => Matcher::Text(text.to_lowercase()),
            ColumnFilter::Options(set) => Matcher::Options(set),
        }
    }

    fn matches(&self, column: &Column, row: &Row) -> bool {
        match self {
            Matcher::Text(needle) => contains_text(column.value(row), needle),
            Matcher::Options(selected) => column
                .project(row)
                .iter()
                .any(|label| selected.contains(label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Projection;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("role", "Role").with_multi_select(["Admin", "Manager", "Employee"]),
            Column::new("active", "Active")
                .with_multi_select(["Yes", "No"])
                .with_projection(Projection::flag("Yes", "No")),
            Column::new("tags", "Tags"),
        ]
    }

    fn data() -> Vec<Row> {
        rows(vec![
            json!({"name": "Alice", "role": "Admin", "active": true, "tags": ["ops", "infra"]}),
            json!({"name": "Bob", "role": "Manager", "active": false, "tags": []}),
            json!({"name": "carol", "role": "Employee", "active": true}),
            json!({"name": null, "role": "Employee", "active": null, "tags": ["Ops"]}),
        ])
    }

    #[test]
    fn test_empty_state_keeps_everything() {
        let state = FilterState::default();
        assert!(state.is_empty());
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let state = FilterState {
            search: "CAR".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![2]);
    }

    #[test]
    fn test_surrounding_spaces_are_part_of_the_term() {
        let rows = rows(vec![json!({"name": "Ann Lee"}), json!({"name": "Joann"})]);
        let columns = vec![Column::new("name", "Name")];

        let state = FilterState {
            search: "ann ".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);

        let mut state = FilterState::default();
        state
            .columns
            .insert("name".to_string(), ColumnFilter::Text("ann ".to_string()));
        assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);

        let state = FilterState {
            search: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_rows(&rows, &columns, &state), vec![0, 1]);
    }

    #[test]
    fn test_search_matches_sequence_elements() {
        let state = FilterState {
            search: "ops".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![0, 3]);
    }

    #[test]
    fn test_text_filter_excludes_missing() {
        let mut state = FilterState::default();
        state
            .columns
            .insert("name".to_string(), ColumnFilter::Text("o".to_string()));
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![1, 2]);
    }

    #[test]
    fn test_multi_select_membership() {
        let mut state = FilterState::default();
        state.columns.insert(
            "role".to_string(),
            ColumnFilter::Options(["Admin", "Manager"].iter().map(|s| s.to_string()).collect()),
        );
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![0, 1]);
    }

    #[test]
    fn test_flag_filter_and_composition() {
        let mut state = FilterState::default();
        state.columns.insert(
            "active".to_string(),
            ColumnFilter::Options(std::iter::once("Yes".to_string()).collect()),
        );
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![0, 2]);

        state.search = "alice".to_string();
        assert_eq!(filter_rows(&data(), &columns(), &state), vec![0]);
    }

    #[test]
    fn test_empty_filters_are_inactive() {
        let mut state = FilterState::default();
        state
            .columns
            .insert("name".to_string(), ColumnFilter::Text("   ".to_string()));
        state
            .columns
            .insert("role".to_string(), ColumnFilter::Options(BTreeSet::new()));
        assert!(state.is_empty());
        assert_eq!(state.active_count(), 0);
        assert_eq!(filter_rows(&data(), &columns(), &state).len(), 4);
    }

    #[test]
    fn test_mismatched_filter_kind_is_ignored() {
        let mut state = FilterState::default();
        state
            .columns
            .insert("role".to_string(), ColumnFilter::Text("zzz".to_string()));
        assert_eq!(filter_rows(&data(), &columns(), &state).len(), 4);
    }
}
