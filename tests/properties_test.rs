mod common;

use common::obj;
use datagrid::filter::filter_rows;
use datagrid::paginate::{paginate, total_pages};
use datagrid::sort::{sort_rows, SortKey};
use datagrid::{
    Actions, CellValue, Column, ComparatorChain, DataTable, FilterState, Projection, Row,
    SortDirection, SortState, TableOptions,
};
use proptest::prelude::*;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeSet;

fn row_strategy() -> impl Strategy<Value = Row> {
    (
        "[a-c]{0,3}",
        any::<bool>(),
        prop::option::of(-50i64..50),
        prop::collection::vec("[a-c]{1,2}", 0..3),
        prop::sample::select(vec!["High", "Medium", "Low", "Other"]),
    )
        .prop_map(|(name, done, score, tags, priority)| {
            let mut row = json!({
                "name": name,
                "done": done,
                "tags": tags,
                "priority": priority,
            });
            if let Some(score) = score {
                row["score"] = json!(score);
            }
            obj(row)
        })
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(row_strategy(), 0..40)
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name"),
        Column::new("done", "Status")
            .with_multi_select(["Done", "Not Done"])
            .with_projection(Projection::flag("Done", "Not Done")),
        Column::new("score", "Score"),
        Column::new("tags", "Tags"),
        Column::new("priority", "Priority"),
    ]
}

fn search_state(term: &str) -> FilterState {
    FilterState {
        search: term.to_string(),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn filtering_twice_changes_nothing(rows in rows_strategy(), term in "[a-c]{0,2}") {
        let columns = columns();
        let state = search_state(&term);
        let first: Vec<Row> = filter_rows(&rows, &columns, &state)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect();
        let second = filter_rows(&first, &columns, &state);
        prop_assert_eq!(second, (0..first.len()).collect::<Vec<_>>());
    }

    #[test]
    fn extra_constraint_only_narrows(
        rows in rows_strategy(),
        term in "[a-c]{0,1}",
        name in "[a-c]{1,2}",
    ) {
        let columns = columns();
        let loose = search_state(&term);
        let mut strict = loose.clone();
        strict
            .columns
            .insert("name".to_string(), datagrid::ColumnFilter::Text(name));

        let loose: BTreeSet<usize> = filter_rows(&rows, &columns, &loose).into_iter().collect();
        let strict: BTreeSet<usize> = filter_rows(&rows, &columns, &strict).into_iter().collect();
        prop_assert!(strict.is_subset(&loose));
    }

    #[test]
    fn equal_keys_keep_input_order(
        rows in rows_strategy(),
        accessor in prop::sample::select(vec!["done", "priority", "tags", "score"]),
        descending in any::<bool>(),
    ) {
        let chain = ComparatorChain::default();
        let direction = if descending { SortDirection::Desc } else { SortDirection::Asc };
        let order: Vec<usize> = (0..rows.len()).collect();
        let sorted = sort_rows(&rows, &order, &SortState::by(accessor, direction), &chain);

        let mut seen = sorted.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, order);

        for pair in sorted.windows(2) {
            let a = SortKey::of(CellValue::of(&rows[pair[0]], accessor));
            let b = SortKey::of(CellValue::of(&rows[pair[1]], accessor));
            if chain.compare(&a, &b) == Ordering::Equal {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn pages_rebuild_the_sequence(len in 0usize..60, size in 1usize..12) {
        let items: Vec<usize> = (0..len).collect();
        let total = total_pages(len, size);
        prop_assert_eq!(total, std::cmp::max(1, len.div_ceil(size)));

        let rebuilt: Vec<usize> = (1..=total)
            .flat_map(|page| paginate(&items, page, size).items)
            .collect();
        prop_assert_eq!(rebuilt, items);
    }

    #[test]
    fn out_of_range_page_is_the_last_page(len in 1usize..60, size in 1usize..12, extra in 1usize..5) {
        let items: Vec<usize> = (0..len).collect();
        let total = total_pages(len, size);
        let last = paginate(&items, total, size);
        let beyond = paginate(&items, total + extra, size);
        prop_assert_eq!(beyond.page, total);
        prop_assert!(!beyond.items.is_empty());
        prop_assert_eq!(beyond.items, last.items);
    }

    #[test]
    fn export_has_every_visible_row(
        rows in rows_strategy(),
        term in "[a-c]{0,1}",
        size in 1usize..8,
        page in 1usize..6,
    ) {
        let mut table =
            DataTable::new(columns(), rows, TableOptions::new().with_page_size(size)).unwrap();
        table.set_search(term);
        table.set_page(page);

        let export = table.export_csv();
        let mut reader = csv::ReaderBuilder::new().from_reader(export.data.as_slice());
        let records = reader.records().filter(|r| r.is_ok()).count();
        prop_assert_eq!(records, table.visible_len());
    }

    #[test]
    fn controls_follow_role_and_callback(
        role in prop::option::of(prop::sample::select(vec!["Admin", "Super Admin", "Viewer"])),
        edit_roles in prop::collection::btree_set(
            prop::sample::select(vec!["Admin", "Super Admin", "Viewer"]), 0..3),
        with_edit in any::<bool>(),
        with_delete in any::<bool>(),
    ) {
        let mut actions = Actions::new();
        if with_edit {
            actions = actions.with_edit(edit_roles.iter().copied(), |_, _| {});
        }
        if with_delete {
            actions = actions.with_delete(datagrid::DEFAULT_ACTION_ROLES, |_, _| {});
        }
        actions.set_role(role.map(str::to_string));

        let table = DataTable::new(columns(), Vec::new(), TableOptions::new())
            .unwrap()
            .with_actions(actions);
        let view = table.view();

        let may_edit = role.is_some_and(|r| edit_roles.contains(r));
        let may_delete = role.is_some_and(|r| datagrid::DEFAULT_ACTION_ROLES.contains(&r));
        prop_assert_eq!(view.show_edit, with_edit && may_edit);
        prop_assert_eq!(view.show_delete, with_delete && may_delete);
    }
}
