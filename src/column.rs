//! Column schema: how each field is read, labelled, rendered and filtered.

use crate::error::{RenderError, Result, TableError};
use crate::row::{stringify, CellValue, Row};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub type RenderFn = Arc<dyn Fn(&Row, usize) -> std::result::Result<String, RenderError> + Send + Sync>;
pub type ProjectionFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// How a cell is turned into display text.
#[derive(Clone, Default)]
pub enum Render {
    /// Show the accessor value, or the placeholder when it is missing.
    #[default]
    Value,
    /// Caller-supplied renderer, given the row and its absolute index.
    Custom(RenderFn),
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Render::Value => f.write_str("Value"),
            Render::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Maps a cell value onto one of a multi-select column's option labels.
#[derive(Clone, Default)]
pub enum Projection {
    /// The stringified value is the label.
    #[default]
    Text,
    /// A boolean flag shown as one of two labels.
    Flag { on: String, off: String },
    Custom(ProjectionFn),
}

impl Projection {
    pub fn flag(on: impl Into<String>, off: impl Into<String>) -> Self {
        Projection::Flag {
            on: on.into(),
            off: off.into(),
        }
    }

    pub fn project(&self, value: &Value) -> Option<String> {
        match self {
            Projection::Text => Some(stringify(value)),
            Projection::Flag { on, off } => {
                truthy(value).map(|b| if b { on.clone() } else { off.clone() })
            }
            Projection::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Text => f.write_str("Text"),
            Projection::Flag { on, off } => f
                .debug_struct("Flag")
                .field("on", on)
                .field("off", off)
                .finish(),
            Projection::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub enum FilterKind {
    /// Free-text, case-insensitive substring filter.
    #[default]
    Text,
    /// Membership filter over a closed set of option labels.
    MultiSelect {
        options: Vec<String>,
        projection: Projection,
    },
}

/// One column of a table.
#[derive(Debug, Clone)]
pub struct Column {
    accessor: String,
    header: String,
    render: Render,
    filter: FilterKind,
}

impl Column {
    pub fn new(accessor: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            accessor: accessor.into(),
            header: header.into(),
            render: Render::Value,
            filter: FilterKind::Text,
        }
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Row, usize) -> std::result::Result<String, RenderError> + Send + Sync + 'static,
    {
        self.render = Render::Custom(Arc::new(render));
        self
    }

    /// Turn this into a multi-select column over `options`.
    pub fn with_multi_select<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        let projection = match self.filter {
            FilterKind::MultiSelect { projection, .. } => projection,
            FilterKind::Text => Projection::Text,
        };
        self.filter = FilterKind::MultiSelect {
            options,
            projection,
        };
        self
    }

    /// Set the projection used by a multi-select filter. Implies multi-select;
    /// a column given a projection but no options fails validation.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        let options = match self.filter {
            FilterKind::MultiSelect { options, .. } => options,
            FilterKind::Text => Vec::new(),
        };
        self.filter = FilterKind::MultiSelect {
            options,
            projection,
        };
        self
    }

    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn render(&self) -> &Render {
        &self.render
    }

    pub fn filter_kind(&self) -> &FilterKind {
        &self.filter
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self.filter, FilterKind::MultiSelect { .. })
    }

    pub fn options(&self) -> &[String] {
        match &self.filter {
            FilterKind::MultiSelect { options, .. } => options,
            FilterKind::Text => &[],
        }
    }

    pub fn value<'a>(&self, row: &'a Row) -> CellValue<'a> {
        CellValue::of(row, &self.accessor)
    }

    /// Option labels this row's value projects to (one per sequence element).
    pub fn project(&self, row: &Row) -> Vec<String> {
        let projection = match &self.filter {
            FilterKind::MultiSelect { projection, .. } => projection,
            FilterKind::Text => return Vec::new(),
        };
        match self.value(row) {
            CellValue::Missing => Vec::new(),
            CellValue::Scalar(value) => projection.project(value).into_iter().collect(),
            CellValue::Sequence(items) => items
                .iter()
                .filter_map(|item| projection.project(item))
                .collect(),
        }
    }

    /// Display text for one cell. A custom renderer that errors or panics
    /// falls back to the raw value, so one bad cell never blanks the row.
    pub fn render_cell(&self, row: &Row, index: usize, placeholder: &str) -> String {
        if let Render::Custom(render) = &self.render {
            match catch_unwind(AssertUnwindSafe(|| render(row, index))) {
                Ok(Ok(text)) => return text,
                Ok(Err(e)) => log::warn!(
                    "render for column `{}` failed on row {}: {}",
                    self.accessor,
                    index,
                    e
                ),
                Err(_) => log::warn!(
                    "render for column `{}` panicked on row {}",
                    self.accessor,
                    index
                ),
            }
        }
        self.value(row)
            .display()
            .unwrap_or_else(|| placeholder.to_string())
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.accessor.trim().is_empty() {
            return Err(TableError::MissingAccessor { index });
        }
        if self.header.trim().is_empty() {
            return Err(TableError::MissingHeader {
                accessor: self.accessor.clone(),
            });
        }
        if let FilterKind::MultiSelect { options, .. } = &self.filter {
            if options.is_empty() {
                return Err(TableError::MissingOptions {
                    accessor: self.accessor.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Check every column and reject duplicate accessors.
pub fn validate_columns(columns: &[Column]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, column) in columns.iter().enumerate() {
        column.validate(index)?;
        if !seen.insert(column.accessor.as_str()) {
            return Err(TableError::DuplicateAccessor {
                accessor: column.accessor.clone(),
            });
        }
    }
    Ok(())
}
