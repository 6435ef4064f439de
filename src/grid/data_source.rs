//! Data sources: where a grid gets its columns, default sorting and rows.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::column::ColumnRegistry;

/// Sort direction as jqGrid sends and expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse case-insensitively; anything other than "desc" sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Lower-case form used in grid settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default sort column and direction reported by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorting {
    pub index: String,
    pub direction: SortDirection,
}

impl Sorting {
    pub fn new(index: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            index: index.into(),
            direction,
        }
    }
}

/// The collaborator a grid needs to describe its columns.
pub trait DataSource: Send + Sync {
    fn columns(&self) -> &ColumnRegistry;

    fn columns_mut(&mut self) -> &mut ColumnRegistry;

    fn default_sorting(&self) -> Option<Sorting>;

    fn set_results_per_page(&mut self, amount: u32);
}

/// Parameters jqGrid posts when it asks for a page of rows.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GridRequest {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub sidx: String,
    #[serde(default)]
    pub sord: String,
}

fn first_page() -> u32 {
    1
}

impl Default for GridRequest {
    fn default() -> Self {
        Self {
            page: first_page(),
            rows: None,
            sidx: String::new(),
            sord: String::new(),
        }
    }
}

/// One row in jqGrid's JSON reader format.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridRow {
    pub id: Value,
    pub cell: Vec<Value>,
}

/// A page of rows in jqGrid's JSON reader format.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridResponse {
    pub page: u32,
    pub total: u32,
    pub records: usize,
    pub rows: Vec<GridRow>,
}

/// In-memory data source over a list of JSON objects.
#[derive(Debug, Clone)]
pub struct ArrayDataSource {
    columns: ColumnRegistry,
    rows: Vec<Map<String, Value>>,
    results_per_page: u32,
    default_sorting: Option<Sorting>,
    identifier_column: Option<String>,
}

impl ArrayDataSource {
    pub fn new(rows: Vec<Map<String, Value>>) -> Self {
        Self {
            columns: ColumnRegistry::new(),
            rows,
            results_per_page: super::DEFAULT_ROWS_PER_PAGE,
            default_sorting: None,
            identifier_column: None,
        }
    }

    /// Build from JSON values, skipping anything that isn't an object.
    pub fn from_values(values: Vec<Value>) -> Self {
        let rows = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Self::new(rows)
    }

    pub fn set_default_sorting(&mut self, index: impl Into<String>, direction: SortDirection) {
        self.default_sorting = Some(Sorting::new(index, direction));
    }

    /// Field whose value becomes the row id; row numbers are used otherwise.
    pub fn set_identifier_column(&mut self, name: impl Into<String>) {
        self.identifier_column = Some(name.into());
    }

    pub fn results_per_page(&self) -> u32 {
        self.results_per_page
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Answer a grid data request: sort, slice out the requested page and
    /// lay the cells out in column order.
    pub fn query(&self, request: &GridRequest) -> GridResponse {
        let per_page = request.rows.filter(|r| *r > 0).unwrap_or(self.results_per_page).max(1);
        let records = self.rows.len();
        let total = records.div_ceil(per_page as usize) as u32;
        let page = request.page.clamp(1, total.max(1));

        let mut rows: Vec<(usize, &Map<String, Value>)> = self.rows.iter().enumerate().collect();
        if let Some((field, direction)) = self.sort_field(request) {
            rows.sort_by(|(_, a), (_, b)| {
                let ordering = compare_values(a.get(&field), b.get(&field));
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let columns = self.columns.ordered();
        let offset = (page as usize - 1) * per_page as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .map(|(index, row)| {
                let id = self
                    .identifier_column
                    .as_ref()
                    .and_then(|field| row.get(field).cloned())
                    .unwrap_or_else(|| Value::from(index + 1));
                let cell = columns
                    .iter()
                    .map(|column| {
                        let field = column.data.as_deref().unwrap_or(&column.name);
                        row.get(field).cloned().unwrap_or(Value::Null)
                    })
                    .collect();
                GridRow { id, cell }
            })
            .collect();

        debug!(page, total, records, "Answered grid data request");

        GridResponse {
            page,
            total,
            records,
            rows,
        }
    }

    /// Resolve the row field to sort on. The requested index may be a
    /// column's sort index, a column name or a raw field name.
    fn sort_field(&self, request: &GridRequest) -> Option<(String, SortDirection)> {
        let (index, direction) = if request.sidx.trim().is_empty() {
            let sorting = self.default_sorting.as_ref()?;
            (sorting.index.clone(), sorting.direction)
        } else {
            (request.sidx.trim().to_string(), SortDirection::parse(&request.sord))
        };

        let field = self
            .columns
            .iter()
            .find(|c| c.sort_index.as_deref() == Some(index.as_str()) || c.name == index)
            .map(|c| c.data.clone().unwrap_or_else(|| c.name.clone()))
            .unwrap_or(index);

        Some((field, direction))
    }
}

impl DataSource for ArrayDataSource {
    fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut ColumnRegistry {
        &mut self.columns
    }

    fn default_sorting(&self) -> Option<Sorting> {
        self.default_sorting.clone()
    }

    fn set_results_per_page(&mut self, amount: u32) {
        self.results_per_page = amount;
    }
}

/// Nulls first, then numbers, then everything else by its string form.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}
