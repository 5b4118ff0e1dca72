//! Spreadsheet backend contract.

use crate::error::Result;
use async_trait::async_trait;

/// A remote spreadsheet made of named tabs.
///
/// The sync only ever needs four operations: discover tabs, add a missing one,
/// write the header row, and replace everything below it.
#[async_trait]
pub trait SpreadsheetBackend: Send + Sync {
    /// Titles of the existing tabs.
    async fn list_tabs(&self) -> Result<Vec<String>>;

    /// Adds an empty tab with the given title.
    async fn create_tab(&self, title: &str) -> Result<()>;

    /// Writes `headers` into the first row of `tab`.
    async fn write_header(&self, tab: &str, headers: &[String]) -> Result<()>;

    /// Clears every row below the header of `tab` and writes `rows` instead.
    async fn replace_rows(&self, tab: &str, rows: &[Vec<String>]) -> Result<()>;
}
