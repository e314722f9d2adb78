//! Shared CLI definitions for datagrid.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Row file format (used to bypass extension-based detection).
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RowFormat {
    /// JSON array of objects
    Json,
    /// JSON Lines / NDJSON (one JSON object per line)
    Jsonl,
}

impl RowFormat {
    /// Detect format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

/// `ACCESSOR=VALUE` given to `--filter`. For multi-select columns the value
/// is a `|`-separated set of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub accessor: String,
    pub value: String,
}

impl FilterArg {
    /// Option labels when the value is read as a multi-select set.
    pub fn options(&self) -> Vec<String> {
        self.value
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (accessor, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ACCESSOR=VALUE, got '{}'", s))?;
    let accessor = accessor.trim();
    if accessor.is_empty() {
        return Err(format!("missing accessor in '{}'", s));
    }
    Ok(FilterArg {
        accessor: accessor.to_string(),
        value: value.to_string(),
    })
}

/// `ACCESSOR[:asc|desc]` given to `--sort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArg {
    pub accessor: String,
    pub descending: bool,
}

/// Only a trailing `asc` or `desc` is taken as the direction; otherwise the
/// whole argument is the accessor.
pub fn parse_sort(s: &str) -> Result<SortArg, String> {
    let (accessor, descending) = match s.rsplit_once(':') {
        Some((accessor, direction)) => match direction.trim().to_lowercase().as_str() {
            "asc" => (accessor, false),
            "desc" => (accessor, true),
            _ => (s, false),
        },
        None => (s, false),
    };
    let accessor = accessor.trim();
    if accessor.is_empty() {
        return Err(format!("missing accessor in '{}'", s));
    }
    Ok(SortArg {
        accessor: accessor.to_string(),
        descending,
    })
}

/// Command-line arguments for datagrid
#[derive(Clone, Parser, Debug)]
#[command(
    name = "datagrid",
    version,
    about = "Search, filter, sort, and page through tabular data in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the row file (JSON array or JSON Lines). Not required with --generate-config
    #[arg(required_unless_present = "generate_config", value_name = "ROWS")]
    pub rows: Option<PathBuf>,

    /// TOML table schema (columns, headers, filters). Without it, columns come from the first row
    #[arg(long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Force row format (json, jsonl). By default format is detected from the file extension
    #[arg(long = "format", value_enum)]
    pub format: Option<RowFormat>,

    /// Role of the current user; gates the edit and delete actions. Overrides config [session] role
    #[arg(long = "role", value_name = "ROLE")]
    pub role: Option<String>,

    /// Rows per page. Overrides the schema and config [display] page_size
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Table title, also used as the export file name. Overrides the schema title
    #[arg(long = "title", value_name = "TITLE")]
    pub title: Option<String>,

    /// Initial global search term
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Column filter as ACCESSOR=VALUE (repeatable). Multi-select columns take OPT1|OPT2
    #[arg(long = "filter", value_name = "ACCESSOR=VALUE", value_parser = parse_filter)]
    pub filter: Vec<FilterArg>,

    /// Initial sort as ACCESSOR[:asc|desc]
    #[arg(long = "sort", value_name = "ACCESSOR[:DIR]", value_parser = parse_sort)]
    pub sort: Option<SortArg>,

    /// Write the filtered and sorted rows as CSV to PATH (file or directory) and exit
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Enable debug mode to show operational information and write a log file
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/datagrid/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
