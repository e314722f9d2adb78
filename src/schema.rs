//! TOML table schema files.
//!
//! A schema names the columns of one table plus its title, caption, page
//! size and extra ordinal domains. Values given on the command line win
//! over the schema, and the schema wins over `[display]` config.

use crate::column::{Column, Projection};
use crate::error::{RenderError, Result, TableError};
use crate::row::{CellValue, Row};
use crate::sort::OrdinalDomain;
use crate::table::TableOptions;
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub page_size: Option<usize>,
    pub id_field: Option<String>,
    pub footer: Vec<String>,
    pub ordinals: Vec<OrdinalSpec>,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalSpec {
    pub name: String,
    pub ranks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    pub accessor: String,
    pub header: String,
    /// `text` (default) or `multi-select`.
    pub filter: Option<String>,
    pub options: Vec<String>,
    pub flag: Option<FlagSpec>,
    /// Display template; `{}` is replaced by the cell value.
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    pub on: String,
    pub off: String,
}

impl TableSchema {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read schema file at {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
            .map_err(|e| eyre!("Failed to parse schema file at {}: {}", path.display(), e))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build columns. With none declared, one text column per key of the
    /// first row, in key order.
    pub fn to_columns(&self, rows: &[Row]) -> Result<Vec<Column>> {
        if self.columns.is_empty() {
            return Ok(derive_columns(rows));
        }
        self.columns.iter().map(ColumnSpec::to_column).collect()
    }

    /// Apply the schema's overrides on top of `base`.
    pub fn apply_options(&self, mut base: TableOptions) -> Result<TableOptions> {
        if let Some(title) = &self.title {
            base.title = Some(title.clone());
        }
        if let Some(caption) = &self.caption {
            base.caption = Some(caption.clone());
        }
        if let Some(page_size) = self.page_size {
            base.page_size = page_size;
        }
        if let Some(id_field) = &self.id_field {
            base.id_field = id_field.clone();
        }
        if !self.footer.is_empty() {
            base.footer = self.footer.clone();
        }
        for spec in &self.ordinals {
            base.ordinals
                .push(OrdinalDomain::new(spec.name.clone(), spec.ranks.clone())?);
        }
        Ok(base)
    }
}

impl ColumnSpec {
    pub fn to_column(&self) -> Result<Column> {
        let mut column = Column::new(self.accessor.clone(), self.header.clone());

        let multi_select = match self.filter.as_deref().map(str::trim) {
            None => self.flag.is_some(),
            Some("text") => false,
            Some("multi-select" | "multiselect" | "multi_select") => true,
            Some(other) => return Err(TableError::UnknownFilterType(other.to_string())),
        };

        if multi_select {
            let options = match (&self.flag, self.options.is_empty()) {
                (Some(flag), true) => vec![flag.on.clone(), flag.off.clone()],
                _ => self.options.clone(),
            };
            column = column.with_multi_select(options);
            if let Some(flag) = &self.flag {
                column = column.with_projection(Projection::flag(&flag.on, &flag.off));
            }
        }

        if let Some(template) = &self.format {
            column = column.with_render(template_renderer(self.accessor.clone(), template.clone()));
        }

        Ok(column)
    }
}

fn template_renderer(
    accessor: String,
    template: String,
) -> impl Fn(&Row, usize) -> std::result::Result<String, RenderError> + Send + Sync + 'static {
    move |row, _| {
        let value = CellValue::of(row, &accessor)
            .display()
            .ok_or_else(|| RenderError::new(format!("no value for `{}`", accessor)))?;
        Ok(template.replace("{}", &value))
    }
}

pub fn derive_columns(rows: &[Row]) -> Vec<Column> {
    rows.first()
        .map(|row| {
            row.keys()
                .map(|key| Column::new(key.clone(), key.clone()))
                .collect()
        })
        .unwrap_or_default()
}
