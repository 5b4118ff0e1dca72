//! Google Sheets spreadsheet backend.
//!
//! The spreadsheet is found by name through the Drive API and created through
//! the Sheets API when it does not exist yet.

use crate::google_auth::{GoogleAuth, ServiceAccountKey};
use crate::http::{build_client, ensure_success, parse_json, request_error};
use async_trait::async_trait;
use pokerbook_core::config::AppConfig;
use pokerbook_core::sheet::SpreadsheetBackend;
use pokerbook_core::{LedgerError, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const SERVICE: &str = "Google Sheets";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const NEW_TAB_ROWS: u32 = 1000;
const NEW_TAB_COLUMNS: u32 = 10;

pub struct GoogleSheetsBackend {
    client: Client,
    auth: GoogleAuth,
    spreadsheet_id: String,
}

impl std::fmt::Debug for GoogleSheetsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsBackend")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsBackend {
    /// Authenticates and opens (or creates) the configured spreadsheet.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let credentials = config
            .google_credentials_file
            .as_deref()
            .ok_or_else(|| LedgerError::config("google_credentials_file is not set"))?;
        let sheet_name = config
            .google_sheet_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LedgerError::config("google_sheet_name is not set"))?;

        let key = ServiceAccountKey::from_file(credentials)?;
        let client = build_client(SERVICE)?;
        let auth = GoogleAuth::new(client.clone(), key)?;
        tracing::info!(
            "[SheetSync] Connecting to '{}' as {}",
            sheet_name,
            auth.client_email()
        );

        let mut backend = Self {
            client,
            auth,
            spreadsheet_id: String::new(),
        };
        backend.spreadsheet_id = match backend.find_spreadsheet(sheet_name).await? {
            Some(id) => id,
            None => {
                tracing::info!("[SheetSync] Spreadsheet not found, creating '{}'", sheet_name);
                backend.create_spreadsheet(sheet_name).await?
            }
        };
        Ok(backend)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.bearer_auth(self.auth.access_token().await?))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;
        ensure_success(SERVICE, response).await
    }

    async fn find_spreadsheet(&self, name: &str) -> Result<Option<String>> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let request = self
            .client
            .get(DRIVE_FILES_API)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")]);
        let list: DriveFileList = parse_json(SERVICE, self.send(request).await?).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_spreadsheet(&self, name: &str) -> Result<String> {
        let request = self
            .client
            .post(SHEETS_API)
            .json(&json!({ "properties": { "title": name } }));
        let created: CreatedSpreadsheet = parse_json(SERVICE, self.send(request).await?).await?;
        Ok(created.spreadsheet_id)
    }

    /// `.../spreadsheets/{id}/values/{range}{suffix}` with the range encoded
    /// as a single path segment.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API)
            .map_err(|e| LedgerError::external(SERVICE, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LedgerError::external(SERVICE, "invalid API base URL"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn write_values(&self, range: &str, values: serde_json::Value, input: &str) -> Result<()> {
        let url = self.values_url(range, "")?;
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", input)])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": values }));
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl SpreadsheetBackend for GoogleSheetsBackend {
    async fn list_tabs(&self) -> Result<Vec<String>> {
        let request = self
            .client
            .get(format!("{SHEETS_API}/{}", self.spreadsheet_id))
            .query(&[("fields", "sheets.properties.title")]);
        let spreadsheet: SpreadsheetMeta = parse_json(SERVICE, self.send(request).await?).await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    async fn create_tab(&self, title: &str) -> Result<()> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": NEW_TAB_ROWS, "columnCount": NEW_TAB_COLUMNS }
                    }
                }
            }]
        });
        let request = self
            .client
            .post(format!("{SHEETS_API}/{}:batchUpdate", self.spreadsheet_id))
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn write_header(&self, tab: &str, headers: &[String]) -> Result<()> {
        self.write_values(&a1_range(tab, "A1"), json!([headers]), "RAW")
            .await
    }

    async fn replace_rows(&self, tab: &str, rows: &[Vec<String>]) -> Result<()> {
        let body_range = a1_range(tab, &body_cells());
        let clear = self
            .client
            .post(self.values_url(&body_range, ":clear")?)
            .json(&json!({}));
        self.send(clear).await?;

        if rows.is_empty() {
            return Ok(());
        }
        // USER_ENTERED lets the sheet read numeric cells as numbers.
        self.write_values(&a1_range(tab, "A2"), json!(rows), "USER_ENTERED")
            .await
    }
}

/// Data rows of a tab, spanning the columns `create_tab` gives it.
fn body_cells() -> String {
    format!("A2:{}", column_letter(NEW_TAB_COLUMNS))
}

/// 1-based column number to its A1 letters: 1 is `A`, 27 is `AA`.
fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// `'Tab Name'!A1`, with quotes in the tab name doubled.
fn a1_range(tab: &str, cells: &str) -> String {
    format!("'{}'!{cells}", tab.replace('\'', "''"))
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}
