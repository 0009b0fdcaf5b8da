//! A loaded dataset with its profile, filters and latest result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{FilterError, LedgerError, Result};
use crate::export::{self, ExportFormat};
use crate::filter::{FilterExecutor, FilterOutcome, FilterSet, FilterStats};
use crate::inference::Profiler;
use crate::input::{Parser, SourceMetadata, file_label, source_hash};
use crate::reconciliation::{Breakdown, ReconciliationAnalyzer, ReconciliationSummary};
use crate::schema::{Dataset, TableProfile};

/// A typed dataset together with the metadata of the bytes it came from.
#[derive(Debug, Clone)]
pub struct CachedSource {
    pub metadata: SourceMetadata,
    pub dataset: Arc<Dataset>,
}

/// Typed datasets keyed by source identity (`sha256:<hex>`).
///
/// Entries never expire on their own; callers drop them with
/// [`DatasetCache::invalidate`] or [`DatasetCache::clear`].
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, CachedSource>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &str) -> Option<&CachedSource> {
        self.entries.get(hash)
    }

    pub fn insert(&mut self, source: CachedSource) {
        self.entries.insert(source.metadata.hash.clone(), source);
    }

    /// Drop one entry; returns whether it was present.
    pub fn invalidate(&mut self, hash: &str) -> bool {
        let removed = self.entries.remove(hash).is_some();
        if removed {
            debug!(hash, "cache entry invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "cache cleared");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of the latest successful filter application.
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub filters: FilterSet,
    pub outcome: FilterOutcome,
    /// Reconciliation over the filtered rows.
    pub reconciliation: ReconciliationSummary,
}

impl FilterReport {
    pub fn stats(&self) -> &FilterStats {
        self.outcome.stats()
    }
}

/// Summary of a refresh from disk.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub source: SourceMetadata,
    /// Whether the file content differs from what was loaded before.
    pub changed: bool,
    /// Whether the previous filters could be re-applied.
    pub filters_kept: bool,
}

/// One user's working state.
///
/// Owns a single dataset and its profile. Each [`Session::apply`] replaces
/// the previous result; a failed apply leaves it untouched.
pub struct Session {
    config: LedgerConfig,
    cache: DatasetCache,
    source: SourceMetadata,
    dataset: Arc<Dataset>,
    profile: TableProfile,
    analyzer: ReconciliationAnalyzer,
    executor: FilterExecutor,
    report: Option<FilterReport>,
}

impl Session {
    /// Load a delimited or workbook file with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, LedgerConfig::default())
    }

    /// Load a delimited or workbook file.
    pub fn open_with_config(path: impl AsRef<Path>, config: LedgerConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = Parser::read_source(path)?;
        let mut cache = DatasetCache::new();
        let loaded = load(&config, &mut cache, &file_label(path), Some(path.to_path_buf()), &bytes)?;
        Ok(Self::from_source(config, cache, loaded))
    }

    /// Load an in-memory byte stream labelled `name`.
    pub fn from_bytes(name: &str, bytes: &[u8], config: LedgerConfig) -> Result<Self> {
        let mut cache = DatasetCache::new();
        let loaded = load(&config, &mut cache, name, None, bytes)?;
        Ok(Self::from_source(config, cache, loaded))
    }

    fn from_source(config: LedgerConfig, cache: DatasetCache, loaded: CachedSource) -> Self {
        let profile = Profiler::with_threshold(config.categorical_threshold).profile(&loaded.dataset);
        let analyzer = ReconciliationAnalyzer::new()
            .with_conventions(config.conventions.clone())
            .with_policy(config.date_policy);

        Self {
            config,
            cache,
            source: loaded.metadata,
            dataset: loaded.dataset,
            profile,
            analyzer,
            executor: FilterExecutor::new(),
            report: None,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn source(&self) -> &SourceMetadata {
        &self.source
    }

    /// The full, unfiltered dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Profile of the full dataset; unaffected by filtering.
    pub fn profile(&self) -> &TableProfile {
        &self.profile
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Latest successful filter application, if any.
    pub fn report(&self) -> Option<&FilterReport> {
        self.report.as_ref()
    }

    /// Filters currently in effect (empty before the first apply).
    pub fn filters(&self) -> FilterSet {
        self.report
            .as_ref()
            .map(|r| r.filters.clone())
            .unwrap_or_default()
    }

    /// Rows of the current view: the filtered rows after an apply, the
    /// full dataset before one, `None` when nothing matched.
    pub fn view(&self) -> Option<&Dataset> {
        match &self.report {
            Some(report) => report.outcome.dataset(),
            None => Some(&self.dataset),
        }
    }

    /// Apply a filter set to the full dataset, replacing the previous result.
    pub fn apply(&mut self, filters: FilterSet) -> std::result::Result<&FilterReport, FilterError> {
        let outcome = self.executor.apply(&self.dataset, &filters)?;
        let reconciliation = match outcome.dataset() {
            Some(ds) => self.analyzer.analyze(ds),
            None => self.analyzer.analyze(&self.empty_view()),
        };

        info!(
            conditions = filters.len(),
            matched = outcome.stats().matched_rows,
            "filters applied"
        );

        Ok(&*self.report.insert(FilterReport {
            filters,
            outcome,
            reconciliation,
        }))
    }

    /// Drop the current filters and return to the full dataset.
    pub fn clear_filters(&mut self) {
        self.report = None;
    }

    /// Reconciliation over the current view.
    pub fn reconciliation(&self) -> ReconciliationSummary {
        match &self.report {
            Some(report) => report.reconciliation.clone(),
            None => self.analyzer.analyze(&self.dataset),
        }
    }

    /// Reconciliation of the current view grouped by `column`.
    pub fn breakdown(&self, column: &str) -> Result<Breakdown> {
        match self.view() {
            Some(ds) => self.analyzer.breakdown(ds, column),
            None => self.analyzer.breakdown(&self.empty_view(), column),
        }
    }

    /// The current view with reconciliation flags appended.
    pub fn annotated_view(&self) -> Result<Dataset> {
        match self.view() {
            Some(ds) => self.analyzer.annotate(ds),
            None => self.analyzer.annotate(&self.empty_view()),
        }
    }

    /// Serialize the annotated current view.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        export::to_bytes(&self.annotated_view()?, format)
    }

    /// Reload the source file from disk.
    ///
    /// Unchanged content is served from the cache. Changed content evicts
    /// the old entry, and the previous filters are re-applied to the new
    /// data; if they no longer fit (a column disappeared) they are dropped.
    pub fn refresh(&mut self) -> Result<RefreshReport> {
        let path = self.source.path.clone().ok_or_else(|| {
            LedgerError::Config(format!(
                "source '{}' was not loaded from a file and cannot be refreshed",
                self.source.file
            ))
        })?;

        let previous_hash = self.source.hash.clone();
        let bytes = Parser::read_source(&path)?;
        let loaded = load(
            &self.config,
            &mut self.cache,
            &file_label(&path),
            Some(path.clone()),
            &bytes,
        )?;
        let changed = loaded.metadata.hash != previous_hash;

        if changed {
            self.cache.invalidate(&previous_hash);
            self.profile = Profiler::with_threshold(self.config.categorical_threshold)
                .profile(&loaded.dataset);
        }
        self.source = loaded.metadata;
        self.dataset = loaded.dataset;

        let filters_kept = match self.report.take() {
            Some(previous) => match self.apply(previous.filters) {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "previous filters dropped after refresh");
                    false
                }
            },
            None => true,
        };

        info!(path = %path.display(), changed, "source refreshed");
        Ok(RefreshReport {
            source: self.source.clone(),
            changed,
            filters_kept,
        })
    }

    fn empty_view(&self) -> Dataset {
        self.dataset.filter_rows(|_| false)
    }
}

/// Type `bytes`, reusing a cached dataset with the same identity.
fn load(
    config: &LedgerConfig,
    cache: &mut DatasetCache,
    name: &str,
    path: Option<PathBuf>,
    bytes: &[u8],
) -> Result<CachedSource> {
    let hash = source_hash(bytes);
    if let Some(hit) = cache.get(&hash) {
        debug!(%hash, "dataset cache hit");
        return Ok(hit.clone());
    }

    let (table, mut metadata) = Parser::with_config(config.parser.clone()).parse_bytes(name, bytes)?;
    metadata.path = path;
    let dataset = Arc::new(Dataset::from_table(&table));

    info!(
        file = %metadata.file,
        rows = metadata.row_count,
        columns = metadata.column_count,
        "loaded source"
    );

    let source = CachedSource { metadata, dataset };
    cache.insert(source.clone());
    Ok(source)
}
