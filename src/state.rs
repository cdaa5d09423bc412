use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::bounds::NOTE_DOMAIN;
use crate::data::filter::FilterCriteria;
use crate::data::model::Catalog;
use crate::data::pipeline::{self, PipelineOutput};
use crate::source::{CachedSource, DatasetSource, Snapshot, SourceError};

type SharedSource = Arc<CachedSource<Box<dyn DatasetSource>>>;

/// How the result list is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingView {
    #[default]
    Cards,
    Table,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where listings are fetched from, behind the refresh cache.
    source: SharedSource,

    /// Snapshot time-to-live, reused when the source is swapped.
    refresh: Duration,

    /// Snapshot `catalog` was built from.
    snapshot: Option<Snapshot>,

    /// Normalized dataset (None until the first load succeeds).
    pub catalog: Option<Catalog>,

    /// Current widget selections. Cloned into each pipeline run.
    pub criteria: FilterCriteria,

    /// Result of the last pipeline run.
    pub output: PipelineOutput,

    /// Criteria `output` was computed with.
    last_run: Option<FilterCriteria>,

    /// Result channel of the in-flight background load.
    pending: Option<Receiver<Result<Snapshot, SourceError>>>,

    /// Next automatic attempt after a failed load.
    retry_at: Option<Instant>,

    pub view: ListingView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: Box<dyn DatasetSource>, refresh: Duration) -> Self {
        Self {
            source: Arc::new(CachedSource::new(source, refresh)),
            refresh,
            snapshot: None,
            catalog: None,
            criteria: FilterCriteria::default(),
            output: PipelineOutput::default(),
            last_run: None,
            pending: None,
            retry_at: None,
            view: ListingView::default(),
            status_message: None,
        }
    }

    /// Whether a load is in progress.
    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn source_name(&self) -> String {
        self.source.describe()
    }

    /// Switch to another source and load it right away.
    pub fn set_source(&mut self, source: Box<dyn DatasetSource>) {
        log::info!("Switching dataset source to {}", source.describe());
        self.source = Arc::new(CachedSource::new(source, self.refresh));
        self.pending = None;
        self.request_load();
    }

    /// Start a background load unless one is already running.
    pub fn request_load(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.retry_at = None;
        let source = Arc::clone(&self.source);
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // The receiver is gone when the source was swapped meanwhile.
            let _ = tx.send(source.get());
        });
        self.pending = Some(rx);
    }

    /// Drop the cached snapshot and fetch again.
    pub fn reload(&mut self) {
        self.source.invalidate();
        self.request_load();
    }

    /// Time until the next automatic load, `None` while loading.
    pub fn time_until_refresh(&self) -> Option<Duration> {
        if self.loading() {
            return None;
        }
        match self.retry_at {
            Some(at) => Some(at.saturating_duration_since(Instant::now())),
            None => Some(self.source.time_until_stale()),
        }
    }

    /// Trigger a load once the snapshot has expired or a retry is due.
    pub fn refresh_if_stale(&mut self) {
        if self.time_until_refresh() == Some(Duration::ZERO) {
            self.request_load();
        }
    }

    /// Collect the result of a finished background load, if any.
    pub fn poll(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(SourceError::Fetch("loader thread exited".to_string()))
            }
        };
        self.pending = None;

        match result {
            Ok(snapshot) => self.set_snapshot(snapshot),
            Err(e) => {
                log::error!("Failed to load listings from {}: {e}", self.source.describe());
                self.status_message = Some(format!("Error: {e}"));
                self.retry_at = Some(Instant::now() + self.refresh);
            }
        }
    }

    /// Ingest a snapshot; a snapshot already shown is ignored.
    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.status_message = None;
        if self
            .snapshot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &snapshot))
        {
            return;
        }

        let catalog = Catalog::from_raw(snapshot.as_ref().clone());
        log::info!(
            "Loaded {} listings ({} fuel types, {} transmissions, {} body types)",
            catalog.len(),
            catalog.bounds.fuel_types.len(),
            catalog.bounds.transmissions.len(),
            catalog.bounds.body_types.len(),
        );

        // Ranges and options follow the new data; search and sort carry over.
        let previous = std::mem::take(&mut self.criteria);
        self.criteria = FilterCriteria {
            bypass: previous.bypass,
            search_query: previous.search_query,
            sort_key: previous.sort_key,
            sort_ascending: previous.sort_ascending,
            ..FilterCriteria::from_bounds(&catalog.bounds)
        };

        self.catalog = Some(catalog);
        self.snapshot = Some(snapshot);
        self.last_run = None;
        self.refresh_results();
    }

    /// Re-run the pipeline if the criteria changed since the last run.
    pub fn refresh_results(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        if self.last_run.as_ref() == Some(&self.criteria) {
            return;
        }
        let criteria = self.criteria.clone();
        self.output = pipeline::run(&catalog.listings, &criteria);
        self.last_run = Some(criteria);
    }

    /// Show only listings rated `note`, as picked from the note chart.
    /// Filters are switched back on so the selection takes effect.
    pub fn focus_note(&mut self, note: i64) {
        self.criteria.bypass = false;
        self.criteria.note_range = (note, note);
    }

    /// The single note the list is narrowed to, if any.
    pub fn note_focus(&self) -> Option<i64> {
        let (lo, hi) = self.criteria.note_range;
        (lo == hi).then_some(lo)
    }

    /// Undo [`focus_note`](Self::focus_note): every note is shown again.
    pub fn clear_note_focus(&mut self) {
        self.criteria.note_range = NOTE_DOMAIN;
    }

    /// Put every filter back to the dataset-wide defaults.
    pub fn reset_filters(&mut self) {
        if let Some(catalog) = &self.catalog {
            self.criteria = FilterCriteria {
                search_query: std::mem::take(&mut self.criteria.search_query),
                sort_key: self.criteria.sort_key,
                sort_ascending: self.criteria.sort_ascending,
                ..FilterCriteria::from_bounds(&catalog.bounds)
            };
        }
    }
}
