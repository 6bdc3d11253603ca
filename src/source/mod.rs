/// Data acquisition: where tables come from and how loads are memoized.
///
/// ```text
///   UI inputs ─┐
///   env vars  ─┼─▶ ProviderChain ─▶ SourceSettings
///   secrets   ─┘                        │
///                       ┌───────────────┴───────────────┐
///                       ▼                               ▼
///                 CsvUrlSource  ── failure falls ──▶ SheetsApiSource
///                       │           back to             │
///                       └──────────▶ SourceCache ◀──────┘
///                                  (normalized tables)
/// ```
pub mod credentials;
pub mod csv_url;
pub mod error;
pub mod sheets;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config;
use crate::data::model::Table;
use crate::data::normalize::normalize_table;
use credentials::ProviderChain;
use csv_url::CsvUrlSource;
use error::SourceError;
use sheets::SheetsApiSource;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build()
}

// ---------------------------------------------------------------------------
// TableSource
// ---------------------------------------------------------------------------

/// Identifies a source for memoization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    CsvUrl(String),
    Sheet {
        spreadsheet_id: String,
        worksheet: Option<String>,
    },
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::CsvUrl(url) => write!(f, "{url}"),
            SourceKey::Sheet {
                spreadsheet_id,
                worksheet: Some(ws),
            } => write!(f, "spreadsheet {spreadsheet_id} / {ws}"),
            SourceKey::Sheet { spreadsheet_id, .. } => write!(f, "spreadsheet {spreadsheet_id}"),
        }
    }
}

/// Something that can produce a raw (not yet normalized) table.
pub trait TableSource {
    fn key(&self) -> SourceKey;
    fn fetch(&self) -> Result<Table, SourceError>;
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Normalized tables by source key. Failures are never stored, so the next
/// load attempt retries.
#[derive(Default)]
pub struct SourceCache {
    tables: HashMap<SourceKey, Arc<Table>>,
}

impl SourceCache {
    pub fn load(&mut self, source: &dyn TableSource) -> Result<Arc<Table>, SourceError> {
        let key = source.key();
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Using cached table for {key}");
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(normalize_table(&source.fetch()?));
        log::info!(
            "Loaded {} rows with columns {:?} from {key}",
            table.len(),
            table.column_names().collect::<Vec<_>>()
        );
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop the entry for `key`. Returns whether one was present.
    pub fn invalidate(&mut self, key: &SourceKey) -> bool {
        self.tables.remove(key).is_some()
    }
}

/// A table together with the source it came from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub key: SourceKey,
    pub table: Arc<Table>,
}

/// Load from the CSV source, falling back to the API source when the CSV
/// load fails. The fallback is logged, not reported.
pub fn load_with_fallback(
    cache: &mut SourceCache,
    csv: Option<&dyn TableSource>,
    api: Option<&dyn TableSource>,
) -> Result<Loaded, SourceError> {
    let load = |cache: &mut SourceCache, source: &dyn TableSource| {
        cache.load(source).map(|table| Loaded {
            key: source.key(),
            table,
        })
    };

    match (csv, api) {
        (None, None) => Err(SourceError::NoSourceConfigured),
        (None, Some(api)) => load(cache, api),
        (Some(csv), api) => match load(cache, csv) {
            Ok(loaded) => Ok(loaded),
            Err(e) => match api {
                Some(api) => {
                    log::warn!("{e}; falling back to the spreadsheet API");
                    load(cache, api)
                }
                None => Err(e),
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Settings → sources
// ---------------------------------------------------------------------------

/// Source configuration after provider resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSettings {
    pub csv_url: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub worksheet: Option<String>,
    pub credentials: Option<String>,
}

impl SourceSettings {
    pub fn resolve(chain: &ProviderChain) -> Self {
        Self {
            csv_url: chain.resolve(config::keys::CSV_URL),
            spreadsheet_id: chain.resolve(config::keys::SPREADSHEET_ID),
            worksheet: chain.resolve(config::keys::WORKSHEET),
            credentials: chain.resolve(config::keys::SERVICE_ACCOUNT),
        }
    }

    pub fn csv_source(&self) -> Option<CsvUrlSource> {
        self.csv_url.as_deref().map(CsvUrlSource::new)
    }

    /// Present only when both a spreadsheet id and credentials are known.
    pub fn api_source(&self) -> Option<SheetsApiSource> {
        let id = self.spreadsheet_id.as_deref()?;
        let credentials = self.credentials.clone()?;
        Some(SheetsApiSource::new(id, self.worksheet.clone(), credentials))
    }

    pub fn is_configured(&self) -> bool {
        self.csv_url.is_some() || (self.spreadsheet_id.is_some() && self.credentials.is_some())
    }

    /// Resolve sources and load through `cache`.
    pub fn load(&self, cache: &mut SourceCache) -> Result<Loaded, SourceError> {
        let csv = self.csv_source();
        let api = self.api_source();
        load_with_fallback(
            cache,
            csv.as_ref().map(|s| s as &dyn TableSource),
            api.as_ref().map(|s| s as &dyn TableSource),
        )
    }
}
