use anyhow::{Context, Result};

use super::error::SourceError;
use super::{SourceKey, TableSource, http_agent};
use crate::data::loader::read_csv;
use crate::data::model::Table;

/// A CSV document published at a public URL (e.g. a sheet's "publish to web"
/// CSV export).
pub struct CsvUrlSource {
    url: String,
    agent: ureq::Agent,
}

impl CsvUrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: http_agent(),
        }
    }

    fn download(&self) -> Result<Table> {
        // Non-2xx statuses come back as `Err` from ureq.
        let response = self
            .agent
            .get(&self.url)
            .call()
            .with_context(|| format!("requesting {}", self.url))?;
        read_csv(response.into_reader()).context("parsing downloaded CSV")
    }
}

impl TableSource for CsvUrlSource {
    fn key(&self) -> SourceKey {
        SourceKey::CsvUrl(self.url.clone())
    }

    fn fetch(&self) -> Result<Table, SourceError> {
        self.download()
            .map_err(|e| SourceError::unavailable("the CSV URL", &e))
    }
}
