use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::credentials::{ServiceAccount, parse_service_account};
use super::error::SourceError;
use super::{SourceKey, TableSource, http_agent};
use crate::data::loader::table_from_sheet_values;
use crate::data::model::Table;

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;

/// All records of one worksheet, read through the spreadsheet API with a
/// service account.
pub struct SheetsApiSource {
    spreadsheet_id: String,
    worksheet: Option<String>,
    credentials: String,
    agent: ureq::Agent,
}

impl SheetsApiSource {
    /// `credentials` is the raw blob (JSON, path, or base64); it is parsed on
    /// fetch so a malformed blob only matters when this source is used.
    pub fn new(spreadsheet_id: &str, worksheet: Option<String>, credentials: String) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id_from(spreadsheet_id),
            worksheet,
            credentials,
            agent: http_agent(),
        }
    }

    fn access_token(&self, account: &ServiceAccount) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before epoch")?
            .as_secs();
        let claims = Claims {
            iss: &account.client_email,
            scope: READONLY_SCOPE,
            aud: &account.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .context("reading service-account private key")?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .context("signing token request")?;

        let token: TokenResponse = self
            .agent
            .post(&account.token_uri)
            .send_form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            .context("requesting access token")?
            .into_json()
            .context("decoding access token response")?;
        Ok(token.access_token)
    }

    fn worksheets(&self, token: &str) -> Result<Vec<SheetProperties>> {
        let meta: SpreadsheetMeta = self
            .agent
            .get(&format!("{SHEETS_API}/{}", self.spreadsheet_id))
            .query("fields", "sheets.properties(sheetId,title,index)")
            .set("Authorization", &format!("Bearer {token}"))
            .call()
            .context("requesting spreadsheet metadata")?
            .into_json()
            .context("decoding spreadsheet metadata")?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    fn values(&self, token: &str, title: &str) -> Result<Vec<Vec<JsonValue>>> {
        let batch: BatchValues = self
            .agent
            .get(&format!("{SHEETS_API}/{}/values:batchGet", self.spreadsheet_id))
            .query("ranges", &quote_sheet_title(title))
            .query("valueRenderOption", "UNFORMATTED_VALUE")
            .query("majorDimension", "ROWS")
            .set("Authorization", &format!("Bearer {token}"))
            .call()
            .context("requesting worksheet values")?
            .into_json()
            .context("decoding worksheet values")?;
        Ok(batch
            .value_ranges
            .into_iter()
            .next()
            .map(|r| r.values)
            .unwrap_or_default())
    }

    fn download(&self, account: &ServiceAccount) -> Result<Table> {
        if !is_valid_spreadsheet_id(&self.spreadsheet_id) {
            bail!("'{}' is not a spreadsheet id", self.spreadsheet_id);
        }
        let token = self.access_token(account)?;
        let sheets = self.worksheets(&token)?;
        let sheet = select_worksheet(&sheets, self.worksheet.as_deref())
            .context("spreadsheet has no worksheets")?;
        log::info!(
            "Reading worksheet '{}' of spreadsheet {}",
            sheet.title,
            self.spreadsheet_id
        );
        let rows = self.values(&token, &sheet.title)?;
        table_from_sheet_values(&rows)
    }
}

impl TableSource for SheetsApiSource {
    fn key(&self) -> SourceKey {
        SourceKey::Sheet {
            spreadsheet_id: self.spreadsheet_id.clone(),
            worksheet: self.worksheet.clone(),
        }
    }

    fn fetch(&self) -> Result<Table, SourceError> {
        let account = parse_service_account(&self.credentials)?;
        self.download(&account)
            .map_err(|e| SourceError::unavailable("the spreadsheet API", &e))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchValues {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pick the worksheet named by `wanted` (numeric sheet id or title). Falls
/// back to the first worksheet when `wanted` is absent or matches nothing.
pub fn select_worksheet<'a>(
    sheets: &'a [SheetProperties],
    wanted: Option<&str>,
) -> Option<&'a SheetProperties> {
    let first = move || sheets.iter().min_by_key(|s| s.index);
    let Some(wanted) = wanted.map(str::trim).filter(|w| !w.is_empty()) else {
        return first();
    };
    let by_id = wanted
        .parse::<i64>()
        .ok()
        .and_then(|id| sheets.iter().find(|s| s.sheet_id == id));
    by_id
        .or_else(|| sheets.iter().find(|s| s.title == wanted))
        .or_else(|| {
            log::warn!("Worksheet '{wanted}' not found, using the first worksheet");
            first()
        })
}

/// Accept either a bare id or a full spreadsheet URL (`…/spreadsheets/d/<id>/…`).
pub fn spreadsheet_id_from(input: &str) -> String {
    let input = input.trim();
    input
        .split_once("/spreadsheets/d/")
        .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or(rest))
        .unwrap_or(input)
        .to_string()
}

fn is_valid_spreadsheet_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A1-notation range covering a whole sheet: `'Title'` with quotes doubled.
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets() -> Vec<SheetProperties> {
        vec![
            SheetProperties {
                sheet_id: 912,
                title: "Leads".into(),
                index: 1,
            },
            SheetProperties {
                sheet_id: 0,
                title: "Summary".into(),
                index: 0,
            },
        ]
    }

    #[test]
    fn worksheet_defaults_to_first() {
        let sheets = sheets();
        assert_eq!(select_worksheet(&sheets, None).unwrap().title, "Summary");
        assert_eq!(select_worksheet(&sheets, Some("  ")).unwrap().title, "Summary");
    }

    #[test]
    fn worksheet_by_id_or_title() {
        let sheets = sheets();
        assert_eq!(select_worksheet(&sheets, Some("912")).unwrap().title, "Leads");
        assert_eq!(select_worksheet(&sheets, Some("Leads")).unwrap().sheet_id, 912);
    }

    #[test]
    fn unmatched_worksheet_falls_back_to_first() {
        let sheets = sheets();
        assert_eq!(select_worksheet(&sheets, Some("Nope")).unwrap().title, "Summary");
        assert!(select_worksheet(&[], None).is_none());
    }

    #[test]
    fn spreadsheet_id_from_url() {
        assert_eq!(
            spreadsheet_id_from("https://docs.google.com/spreadsheets/d/1AbC-x_9/edit#gid=0"),
            "1AbC-x_9"
        );
        assert_eq!(spreadsheet_id_from(" 1AbC "), "1AbC");
        assert!(is_valid_spreadsheet_id("1AbC-x_9"));
        assert!(!is_valid_spreadsheet_id("a/b"));
    }

    #[test]
    fn sheet_titles_are_quoted() {
        assert_eq!(quote_sheet_title("Q1 Leads"), "'Q1 Leads'");
        assert_eq!(quote_sheet_title("Bob's"), "'Bob''s'");
    }

    #[test]
    fn metadata_and_values_decode() {
        let meta: SpreadsheetMeta = serde_json::from_str(
            r#"{"sheets":[{"properties":{"sheetId":7,"title":"Data","index":0}}]}"#,
        )
        .unwrap();
        assert_eq!(meta.sheets[0].properties.sheet_id, 7);

        let batch: BatchValues = serde_json::from_str(
            r#"{"spreadsheetId":"x","valueRanges":[{"range":"Data!A1:B2","values":[["a","b"],[1,2]]}]}"#,
        )
        .unwrap();
        assert_eq!(batch.value_ranges[0].values.len(), 2);

        let empty: BatchValues =
            serde_json::from_str(r#"{"valueRanges":[{"range":"Data!A1"}]}"#).unwrap();
        assert!(empty.value_ranges[0].values.is_empty());
    }

    #[test]
    fn malformed_credentials_surface_on_fetch() {
        let source = SheetsApiSource::new("abc", None, "not-a-credential!".into());
        assert!(matches!(
            source.fetch(),
            Err(SourceError::CredentialMalformed { .. })
        ));
    }
}
