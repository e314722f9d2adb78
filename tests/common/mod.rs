#![allow(dead_code)]

use datagrid::{Column, DataTable, Projection, Row, TableOptions};
use serde_json::{json, Value};

pub fn obj(value: Value) -> Row {
    value
        .as_object()
        .cloned()
        .expect("fixture rows are JSON objects")
}

/// `n` rows with ids 1..=n.
pub fn numbered_rows(n: usize) -> Vec<Row> {
    (1..=n)
        .map(|i| obj(json!({"id": i, "name": format!("Row {}", i)})))
        .collect()
}

pub fn numbered_table(n: usize, page_size: usize) -> DataTable {
    DataTable::new(
        vec![Column::new("id", "ID"), Column::new("name", "Name")],
        numbered_rows(n),
        TableOptions::new().with_page_size(page_size),
    )
    .expect("valid table")
}

/// Project rows with nested arrays, records, flags and a missing priority.
pub fn project_rows() -> Vec<Row> {
    vec![
        obj(json!({
            "id": 1,
            "project_name": "Apollo",
            "priority": "High",
            "assigned_names": ["Ann Admin", "Bo"],
            "project_subparts": [{"name": "Design", "hrs": 4}],
            "is_completed": true,
            "total_elapsed_hrs": 12.5,
            "code": "7"
        })),
        obj(json!({
            "id": 2,
            "project_name": "Borealis",
            "priority": "Low",
            "assigned_names": ["Cy"],
            "project_subparts": [],
            "is_completed": false,
            "total_elapsed_hrs": 3,
            "code": "12"
        })),
        obj(json!({
            "id": 3,
            "project_name": "Cassini",
            "priority": "Medium",
            "assigned_names": [],
            "is_completed": true,
            "total_elapsed_hrs": 40,
            "code": "3"
        })),
        obj(json!({
            "id": 4,
            "project_name": "Dawn \"Prime\"",
            "priority": null,
            "assigned_names": ["Dee", "Sam Admington"],
            "project_subparts": [{"name": "Build", "hrs": 10}, {"name": "Test", "hrs": 2}],
            "is_completed": false,
            "total_elapsed_hrs": 0,
            "code": "100"
        })),
        obj(json!({
            "id": 5,
            "project_name": "Europa",
            "priority": "High",
            "assigned_names": ["Eve"],
            "project_subparts": [],
            "is_completed": false,
            "total_elapsed_hrs": 7.25,
            "code": "12"
        })),
    ]
}

pub fn project_columns() -> Vec<Column> {
    vec![
        Column::new("project_name", "Project Name"),
        Column::new("priority", "Priority"),
        Column::new("assigned_names", "Assigned"),
        Column::new("is_completed", "Status")
            .with_multi_select(["Done", "Not Done"])
            .with_projection(Projection::flag("Done", "Not Done")),
        Column::new("total_elapsed_hrs", "Elapsed Hrs"),
        Column::new("code", "Code"),
    ]
}

pub fn project_table(options: TableOptions) -> DataTable {
    DataTable::new(project_columns(), project_rows(), options).expect("valid table")
}

/// Values of `accessor` for the visible rows, in order.
pub fn visible_values(table: &DataTable, accessor: &str) -> Vec<Value> {
    table
        .visible_rows()
        .map(|row| row.get(accessor).cloned().unwrap_or(Value::Null))
        .collect()
}
