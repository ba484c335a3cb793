//! Table model for the column-merge engine.
//!
//! A [`Table`] is an ordered list of typed [`Column`]s over a shared row
//! count. Cells are [`CellValue`]s with an explicit `Missing` sentinel.

pub mod cell;
pub mod error;
pub mod table;

pub use cell::{CellValue, ColumnType};
pub use error::{ModelError, Result};
pub use table::{Column, Table};
