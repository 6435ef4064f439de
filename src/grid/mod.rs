//! Server-side builder for jqGrid tables.
//!
//! A [`Grid`] collects column definitions and display settings and renders
//! them into the HTML scaffold and JavaScript declaration jqGrid needs. The
//! columns live in the grid's [`DataSource`], which also answers the POST
//! requests jqGrid makes for its rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use pike::grid::{ArrayDataSource, Grid};
//!
//! let mut grid = Grid::with_data_source(ArrayDataSource::from_values(rows));
//! grid.set_id("users").set_url("/en/users/data");
//! grid.add_column("name", "name", Some("Name"), Some("name"), ())?;
//! grid.set_rows_per_page(-1)?;
//!
//! let page = format!("{}<script>{}</script>", grid.html(), grid.javascript(false)?);
//! ```

mod builder;
mod column;
mod data_source;
mod settings;

pub use builder::{Grid, GridMethod};
pub use column::{Column, ColumnOptions, ColumnRegistry};
pub use data_source::{
    ArrayDataSource, DataSource, GridRequest, GridResponse, GridRow, SortDirection, Sorting,
};
pub use settings::{GridAttributes, GridSetting};

/// Rows per page until `Grid::set_rows_per_page` is called.
pub const DEFAULT_ROWS_PER_PAGE: u32 = 50;

/// Page size standing in for "all rows"; jqGrid needs a number.
pub const UNLIMITED_ROWS: u32 = 9_999_999;

pub const DEFAULT_HEIGHT: &str = "100%";
