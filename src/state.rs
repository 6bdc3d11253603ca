use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{self, FILTER_COLUMNS, keys};
use crate::data::controls::{ColumnControl, FilterInputs, build_mapping, classify_columns};
use crate::data::export::to_csv_bytes;
use crate::data::filter::{FilterMapping, filtered_indices};
use crate::data::model::Table;
use crate::source::credentials::UiOverrides;
use crate::source::error::SourceError;
use crate::source::{Loaded, SourceCache, SourceKey, SourceSettings};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Text typed into the data-source fields.
#[derive(Debug, Clone, Default)]
pub struct SourceInputs {
    pub csv_url: String,
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub credentials: String,
}

impl SourceInputs {
    fn overrides(&self) -> UiOverrides {
        UiOverrides::default()
            .with(keys::CSV_URL, &self.csv_url)
            .with(keys::SPREADSHEET_ID, &self.spreadsheet_id)
            .with(keys::WORKSHEET, &self.worksheet)
            .with(keys::SERVICE_ACCOUNT, &self.credentials)
    }
}

/// Outcome of the latest load, deciding what the panels show.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    /// Nothing to load from yet: prompt for a source.
    AwaitingSource,
    /// The load failed; the message replaces the results.
    Failed(String),
    /// The table loaded but has no rows.
    Empty,
    Ready,
}

/// A loaded table plus what is derived from it once.
pub struct Dataset {
    pub key: SourceKey,
    pub table: Arc<Table>,
    pub controls: Vec<ColumnControl>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub source_inputs: SourceInputs,
    pub phase: LoadPhase,
    pub dataset: Option<Dataset>,

    /// User filter choices; the only mutable filter state.
    pub inputs: FilterInputs,

    /// Mapping the current `visible_indices` were computed from.
    pub mapping: FilterMapping,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message of the last export.
    pub status_message: Option<String>,

    cache: SourceCache,
    autoload_pending: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source_inputs: SourceInputs::default(),
            phase: LoadPhase::AwaitingSource,
            dataset: None,
            inputs: FilterInputs::default(),
            mapping: FilterMapping::new(),
            visible_indices: Vec::new(),
            status_message: None,
            cache: SourceCache::default(),
            autoload_pending: true,
        }
    }
}

impl AppState {
    fn settings(&self) -> SourceSettings {
        SourceSettings::resolve(&config::provider_chain(self.source_inputs.overrides()))
    }

    /// On the first frame, load if the environment or secret file already
    /// configures a source.
    pub fn autoload(&mut self) {
        if !std::mem::take(&mut self.autoload_pending) {
            return;
        }
        if self.settings().is_configured() {
            self.load();
        }
    }

    /// Resolve the source settings and load (memoized per source).
    pub fn load(&mut self) {
        let settings = self.settings();
        let result = settings.load(&mut self.cache);
        self.apply_load(result);
    }

    /// Drop the memo for the current source and load again.
    pub fn reload(&mut self) {
        if let Some(ds) = &self.dataset {
            self.cache.invalidate(&ds.key);
        }
        self.load();
    }

    fn apply_load(&mut self, result: Result<Loaded, SourceError>) {
        match result {
            Ok(loaded) => {
                let same_source = self.dataset.as_ref().is_some_and(|d| d.key == loaded.key);
                if !same_source {
                    self.inputs = FilterInputs::default();
                }
                self.set_dataset(loaded);
            }
            Err(SourceError::NoSourceConfigured) => {
                self.dataset = None;
                self.phase = LoadPhase::AwaitingSource;
            }
            Err(e) => {
                log::error!("{e}");
                self.dataset = None;
                self.phase = LoadPhase::Failed(e.to_string());
            }
        }
    }

    /// Ingest a loaded table and derive its filter controls.
    pub fn set_dataset(&mut self, loaded: Loaded) {
        let controls = classify_columns(&loaded.table, FILTER_COLUMNS);
        self.phase = if loaded.table.is_empty() {
            LoadPhase::Empty
        } else {
            LoadPhase::Ready
        };
        self.dataset = Some(Dataset {
            key: loaded.key,
            table: loaded.table,
            controls,
        });
        self.status_message = None;
        self.recompute();
    }

    /// Rebuild the mapping from the inputs; refilter only if it changed.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let mapping = build_mapping(&ds.controls, &self.inputs);
        if mapping != self.mapping {
            self.mapping = mapping;
            self.visible_indices = filtered_indices(&ds.table, &self.mapping);
        }
    }

    fn recompute(&mut self) {
        if let Some(ds) = &self.dataset {
            self.mapping = build_mapping(&ds.controls, &self.inputs);
            self.visible_indices = filtered_indices(&ds.table, &self.mapping);
        }
    }

    /// Reset every filter widget to its default. The table is untouched.
    pub fn clear_filters(&mut self) {
        self.inputs = FilterInputs::default();
        self.recompute();
    }

    /// The filtered rows as a new table.
    pub fn filtered_table(&self) -> Option<Table> {
        self.dataset
            .as_ref()
            .map(|ds| ds.table.take_rows(&self.visible_indices))
    }

    /// Write the filtered rows as CSV to `path`. Returns the row count.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let table = self.filtered_table().context("no dataset loaded")?;
        let bytes = to_csv_bytes(&table)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} rows to {}", table.len(), path.display());
        Ok(table.len())
    }
}
