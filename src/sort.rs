//! Sort stage: type-aware, stable ordering of filtered row indices.
//!
//! Keys are compared through an ordered [`ComparatorChain`]. The first
//! comparator that recognizes both keys decides; lexical comparison is the
//! catch-all. Mixed-kind columns make the chain intransitive, so ordering
//! is done with a merge sort that only ever asks "is right before left?"
//! and never panics on an inconsistent comparator.

use crate::error::{Result, TableError};
use crate::row::{format_number, CellValue, Row};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub accessor: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(accessor: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            accessor: Some(accessor.into()),
            direction,
        }
    }

    /// Header-click behaviour: the same column flips direction, a new
    /// column starts ascending.
    pub fn toggle(&mut self, accessor: &str) {
        if self.accessor.as_deref() == Some(accessor) {
            self.direction = self.direction.toggle();
        } else {
            self.accessor = Some(accessor.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    /// Direction for `accessor` if it is the sorted column.
    pub fn direction_of(&self, accessor: &str) -> Option<SortDirection> {
        (self.accessor.as_deref() == Some(accessor)).then_some(self.direction)
    }
}

/// Comparable form of a cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Sequences sort by their length, not their contents.
    pub fn of(value: CellValue<'_>) -> Self {
        match value {
            CellValue::Missing => SortKey::Missing,
            CellValue::Sequence(items) => SortKey::Number(items.len() as f64),
            CellValue::Scalar(Value::Number(n)) => n
                .as_f64()
                .map(SortKey::Number)
                .unwrap_or_else(|| SortKey::Text(n.to_string())),
            CellValue::Scalar(Value::Bool(b)) => SortKey::Number(if *b { 1.0 } else { 0.0 }),
            CellValue::Scalar(Value::String(s)) => SortKey::Text(s.clone()),
            CellValue::Scalar(other) => SortKey::Text(other.to_string()),
        }
    }

    /// Numeric reading of the key, parsing decimal strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SortKey::Number(n) => Some(*n),
            SortKey::Text(s) => {
                let trimmed = s.trim();
                if numeric_pattern().is_some_and(|re| re.is_match(trimmed)) {
                    trimmed.parse().ok()
                } else {
                    None
                }
            }
            SortKey::Missing => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            SortKey::Missing => String::new(),
            SortKey::Number(n) => serde_json::Number::from_f64(*n)
                .map(|n| format_number(&n))
                .unwrap_or_else(|| n.to_string()),
            SortKey::Text(s) => s.clone(),
        }
    }
}

fn numeric_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").ok())
        .as_ref()
}

/// One link of the comparator chain. Returns `None` when it does not apply
/// to this pair of keys.
pub trait KeyComparator: Send + Sync {
    fn name(&self) -> &str;
    fn compare(&self, a: &SortKey, b: &SortKey) -> Option<Ordering>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumericComparator;

impl KeyComparator for NumericComparator {
    fn name(&self) -> &str {
        "numeric"
    }

    fn compare(&self, a: &SortKey, b: &SortKey) -> Option<Ordering> {
        let (x, y) = (a.as_number()?, b.as_number()?);
        x.partial_cmp(&y)
    }
}

/// A named, ranked set of labels such as `High < Medium < Low`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalDomain {
    name: String,
    ranks: Vec<String>,
}

impl OrdinalDomain {
    pub fn new<I, S>(name: impl Into<String>, ranks: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let ranks: Vec<String> = ranks.into_iter().map(Into::into).collect();
        if ranks.is_empty() {
            return Err(TableError::EmptyOrdinalDomain { name });
        }
        Ok(Self { name, ranks })
    }

    pub fn priority() -> Self {
        Self {
            name: "priority".to_string(),
            ranks: vec!["High".to_string(), "Medium".to_string(), "Low".to_string()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranks(&self) -> &[String] {
        &self.ranks
    }

    pub fn rank(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.ranks.iter().position(|r| r.eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone)]
pub struct OrdinalComparator {
    domains: Vec<OrdinalDomain>,
}

impl OrdinalComparator {
    pub fn new(domains: Vec<OrdinalDomain>) -> Self {
        Self { domains }
    }
}

impl KeyComparator for OrdinalComparator {
    fn name(&self) -> &str {
        "ordinal"
    }

    fn compare(&self, a: &SortKey, b: &SortKey) -> Option<Ordering> {
        let (SortKey::Text(a), SortKey::Text(b)) = (a, b) else {
            return None;
        };
        self.domains
            .iter()
            .find_map(|d| Some(d.rank(a)?.cmp(&d.rank(b)?)))
    }
}

/// Locale-style text order: case-insensitive first, lowercase before
/// uppercase on ties, then code points.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalComparator;

impl KeyComparator for LexicalComparator {
    fn name(&self) -> &str {
        "lexical"
    }

    fn compare(&self, a: &SortKey, b: &SortKey) -> Option<Ordering> {
        Some(locale_cmp(&a.as_text(), &b.as_text()))
    }
}

/// Case-insensitive text order with lowercase first on ties.
///
/// This compares lowercased code points, so it only matches a collation
/// order for ASCII text. Accented and other non-ASCII letters sort after
/// `z` rather than next to their base letter.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| case_tiebreak(a, b))
        .then_with(|| a.cmp(b))
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if x.is_lowercase() && y.is_uppercase() {
            return Ordering::Less;
        }
        if x.is_uppercase() && y.is_lowercase() {
            return Ordering::Greater;
        }
        return Ordering::Equal;
    }
    Ordering::Equal
}

/// Ordered list of comparators; the first one that applies wins.
pub struct ComparatorChain {
    comparators: Vec<Box<dyn KeyComparator>>,
}

impl ComparatorChain {
    pub fn new(comparators: Vec<Box<dyn KeyComparator>>) -> Self {
        Self { comparators }
    }

    /// Numeric, then the given ordinal domains, then lexical.
    pub fn with_ordinals(domains: Vec<OrdinalDomain>) -> Self {
        Self::new(vec![
            Box::new(NumericComparator),
            Box::new(OrdinalComparator::new(domains)),
            Box::new(LexicalComparator),
        ])
    }

    pub fn names(&self) -> Vec<&str> {
        self.comparators.iter().map(|c| c.name()).collect()
    }

    /// Ascending comparison. Missing keys come first.
    pub fn compare(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
            (SortKey::Missing, _) => return Ordering::Less,
            (_, SortKey::Missing) => return Ordering::Greater,
            _ => {}
        }
        self.comparators
            .iter()
            .find_map(|c| c.compare(a, b))
            .unwrap_or_else(|| locale_cmp(&a.as_text(), &b.as_text()))
    }
}

impl Default for ComparatorChain {
    fn default() -> Self {
        Self::with_ordinals(vec![OrdinalDomain::priority()])
    }
}

impl fmt::Debug for ComparatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Reorder `order` (indices into `rows`) by `sort`. Unsorted state returns
/// the input order unchanged.
pub fn sort_rows(
    rows: &[Row],
    order: &[usize],
    sort: &SortState,
    chain: &ComparatorChain,
) -> Vec<usize> {
    let Some(accessor) = sort.accessor.as_deref() else {
        return order.to_vec();
    };

    let mut keyed: Vec<(usize, SortKey)> = order
        .iter()
        .map(|&idx| {
            let key = rows
                .get(idx)
                .map(|row| SortKey::of(CellValue::of(row, accessor)))
                .unwrap_or(SortKey::Missing);
            (idx, key)
        })
        .collect();

    let direction = sort.direction;
    merge_sort_by(&mut keyed, |(_, a), (_, b)| {
        let ord = chain.compare(a, b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(idx, _)| idx).collect()
}

/// Stable bottom-up merge sort. Safe with comparators that are not a
/// total order: the result is then some permutation, never a panic.
pub fn merge_sort_by<T, F>(items: &mut Vec<T>, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut src: Vec<Option<T>> = items.drain(..).map(Some).collect();
    let mut dst: Vec<Option<T>> = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        dst.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j) = (start, mid);
            while i < mid && j < end {
                let take_right = match (&src[i], &src[j]) {
                    (Some(left), Some(right)) => cmp(right, left) == Ordering::Less,
                    _ => false,
                };
                if take_right {
                    dst.push(src[j].take());
                    j += 1;
                } else {
                    dst.push(src[i].take());
                    i += 1;
                }
            }
            dst.extend(src[i..mid].iter_mut().map(Option::take));
            dst.extend(src[j..end].iter_mut().map(Option::take));
            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    items.extend(src.into_iter().flatten());
}
