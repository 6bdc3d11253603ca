use std::path::PathBuf;

use crate::data::controls::{ColumnRule, FilterKind};
use crate::source::credentials::{EnvProvider, ProviderChain, SecretFileProvider, UiOverrides};

// ---------------------------------------------------------------------------
// Static configuration
// ---------------------------------------------------------------------------

pub const APP_TITLE: &str = "Sheet Filter";

/// Columns offered as filters, with the kind each is meant to be.
pub const FILTER_COLUMNS: &[ColumnRule] = &[
    ColumnRule {
        column: "Keyword",
        kind: FilterKind::Text,
    },
    ColumnRule {
        column: "Industry",
        kind: FilterKind::Text,
    },
    ColumnRule {
        column: "Headcount",
        kind: FilterKind::Numeric,
    },
    ColumnRule {
        column: "Employee Size",
        kind: FilterKind::Numeric,
    },
    ColumnRule {
        column: "Company Location",
        kind: FilterKind::TextSearch,
    },
    ColumnRule {
        column: "Title",
        kind: FilterKind::TextSearch,
    },
    ColumnRule {
        column: "Person Location",
        kind: FilterKind::TextSearch,
    },
];

/// Prefix of the environment variables settings are read from.
pub const ENV_PREFIX: &str = "SHEET_FILTER_";
/// Overrides the location of the secret file.
pub const SECRETS_PATH_ENV: &str = "SHEET_FILTER_SECRETS";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Setting keys, shared by every provider.
pub mod keys {
    pub const CSV_URL: &str = "csv_url";
    pub const SPREADSHEET_ID: &str = "spreadsheet_id";
    pub const WORKSHEET: &str = "worksheet";
    pub const SERVICE_ACCOUNT: &str = "gcp_service_account";
}

pub fn secrets_path() -> PathBuf {
    std::env::var_os(SECRETS_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE))
}

/// UI entries first, then the environment, then the secret file.
pub fn provider_chain(ui: UiOverrides) -> ProviderChain {
    ProviderChain::new()
        .push(ui)
        .push(EnvProvider::new(ENV_PREFIX))
        .push(SecretFileProvider::new(secrets_path()))
}
