use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::assets::AssetStore;
use crate::chart::spec::{ChartData, ChartSpec};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::loader::{self, DataSource};
use crate::data::model::Dataset;
use crate::error::LoadError;
use crate::pages::{self, Page, PageView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a load succeeds). Never mutated once set.
    pub dataset: Option<Arc<Dataset>>,

    /// Where the current (or pending) dataset comes from.
    pub source: DataSource,

    pub assets: AssetStore,

    /// Selected sidebar entry.
    pub page: Page,

    /// Contents of `page`, computed when it was entered.
    pub view: Option<PageView>,

    /// Colours for the series of the current view.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a dataset load is in progress.
    pub loading: bool,

    pending: Option<Receiver<Result<Dataset, LoadError>>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_assets(AssetStore::from_config(&config.assets), config)
    }

    pub fn with_assets(assets: AssetStore, config: DashboardConfig) -> Self {
        let source = DataSource::Url(config.data.url.clone());
        Self {
            config,
            dataset: None,
            source,
            assets,
            page: Page::default(),
            view: None,
            color_map: ColorMap::default(),
            status_message: None,
            loading: false,
            pending: None,
        }
    }

    /// Load `source` on a background thread; [`AppState::poll_loading`]
    /// picks up the result.
    pub fn start_loading(&mut self, source: DataSource, refresh: bool) {
        let (tx, rx) = mpsc::channel();
        let cache_dir = self.config.data.cache_dir.clone();
        let job_source = source.clone();
        thread::spawn(move || {
            let result = loader::load(&job_source, cache_dir.as_deref(), refresh);
            // The receiver is gone only if a newer load replaced this one.
            let _ = tx.send(result);
        });

        log::info!("Loading dataset from {source}");
        self.source = source;
        self.pending = Some(rx);
        self.loading = true;
        self.status_message = None;
    }

    /// Apply a finished background load. Returns true when state changed.
    pub fn poll_loading(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(LoadError::Fetch {
                url: self.source.to_string(),
                message: "loader thread stopped unexpectedly".to_string(),
            }),
        };
        self.pending = None;

        match result {
            Ok(dataset) => {
                log::info!("Loaded {} records from {}", dataset.len(), self.source);
                self.set_dataset(dataset);
            }
            Err(e) => self.set_load_error(e),
        }
        true
    }

    /// Ingest a newly loaded dataset and recompute the current page.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(Arc::new(dataset));
        self.loading = false;
        self.status_message = None;
        self.refresh_after_load();
    }

    /// Keep the previous dataset (if any) and surface the failure.
    pub fn set_load_error(&mut self, error: LoadError) {
        log::error!("Failed to load dataset: {error}");
        self.status_message = Some(format!("Error: {error}"));
        self.loading = false;
        self.refresh_after_load();
    }

    /// Pages that do not show the dataset keep their view; re-entering the
    /// Report page would start another regeneration run.
    fn refresh_after_load(&mut self) {
        if self.page.shows_dataset() {
            self.refresh_view();
        }
    }

    /// Switch page and run its enter-action.
    pub fn navigate(&mut self, page: Page) {
        self.page = page;
        self.refresh_view();
    }

    /// Recompute the current page from the current dataset.
    pub fn refresh_view(&mut self) {
        let view = pages::render(
            self.page,
            self.dataset.as_deref(),
            &self.assets,
            &self.config.ui,
        );
        self.rebuild_color_map(&view);
        self.view = Some(view);
    }

    /// Rebuild the colour map from the series shown by `view`.
    fn rebuild_color_map(&mut self, view: &PageView) {
        let labels: Vec<String> = view.charts().flat_map(series_names).collect();
        self.color_map = ColorMap::new(labels.iter().map(String::as_str));
    }

    /// Current page's charts as pretty JSON.
    pub fn charts_json(&self) -> serde_json::Result<String> {
        let charts: Vec<_> = self.view.iter().flat_map(|v| v.charts()).collect();
        serde_json::to_string_pretty(&charts)
    }
}

fn series_names(spec: &ChartSpec) -> Vec<String> {
    match &spec.data {
        ChartData::Bars { categories, series } => categories
            .iter()
            .cloned()
            .chain(series.iter().map(|s| s.name.clone()))
            .collect(),
        ChartData::Areas { series, .. } | ChartData::Histogram { series, .. } => {
            series.iter().map(|s| s.name.clone()).collect()
        }
        ChartData::Pie { slices } => slices.iter().map(|s| s.label.clone()).collect(),
        ChartData::Boxes { boxes } => boxes.iter().map(|b| b.label.clone()).collect(),
        ChartData::Points { series, .. } => series.iter().map(|s| s.name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use super::*;
    use crate::assets::tests::{asset_config, FakeRegenerator};
    use crate::data::model::tests::sample_dataset;

    fn state(dir: &std::path::Path) -> AppState {
        state_counting(dir, Default::default())
    }

    fn state_counting(dir: &std::path::Path, calls: Arc<AtomicUsize>) -> AppState {
        let mut config = DashboardConfig::default();
        config.assets = asset_config(dir);
        config.data.cache_dir = None;
        let assets = AssetStore::new(
            &config.assets,
            Box::new(FakeRegenerator {
                calls,
                output: None,
                delay: Duration::ZERO,
            }),
        );
        AppState::with_assets(assets, config)
    }

    fn wait_for_load(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !state.poll_loading() {
            assert!(Instant::now() < deadline, "load did not finish");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn navigation_recomputes_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(dir.path());
        state.set_dataset(sample_dataset());
        state.navigate(Page::Demographics);
        assert_eq!(state.view.as_ref().unwrap().page, Page::Demographics);
        assert_eq!(state.view.as_ref().unwrap().charts().count(), 2);

        state.navigate(Page::Home);
        assert_eq!(state.view.as_ref().unwrap().charts().count(), 0);
    }

    #[test]
    fn finished_loads_do_not_rerun_report_regeneration() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut state = state_counting(dir.path(), calls.clone());

        state.navigate(Page::ReportAndPresentation);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        state.set_dataset(sample_dataset());
        state.set_load_error(LoadError::UnsupportedFormat("xlsx".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.view.as_ref().unwrap().page, Page::ReportAndPresentation);

        // Pages showing the dataset pick up a new load.
        state.navigate(Page::Home);
        state.set_dataset(sample_dataset());
        assert!(state
            .view
            .as_ref()
            .unwrap()
            .sections
            .iter()
            .any(|s| matches!(s, pages::Section::Summary(_))));
    }

    #[test]
    fn background_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.csv");
        std::fs::write(
            &path,
            "country,year,pop,continent,lifeExp,gdpPercap\nChad,2007,10,Africa,50.6,1704.1\n",
        )
        .unwrap();

        let mut state = state(dir.path());
        state.start_loading(DataSource::File(path), false);
        assert!(state.loading);
        wait_for_load(&mut state);
        assert!(!state.loading);
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(dir.path());
        state.set_dataset(sample_dataset());
        state.start_loading(DataSource::File(dir.path().join("missing.csv")), false);
        wait_for_load(&mut state);
        assert_eq!(state.dataset.as_ref().unwrap().len(), 8);
        assert!(state.status_message.as_ref().unwrap().starts_with("Error"));
    }

    #[test]
    fn exports_current_charts_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(dir.path());
        state.set_dataset(sample_dataset());
        state.navigate(Page::AdvancedInsights);
        let json: serde_json::Value = serde_json::from_str(&state.charts_json().unwrap()).unwrap();
        let charts = json.as_array().unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0]["kind"], "scatter3d");
        assert_eq!(charts[1]["data"]["type"], "points");
        assert_eq!(charts[1]["bindings"]["size"], "pop");
    }
}
