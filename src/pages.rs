//! Navigation pages and what each one shows.
//!
//! Navigation is a flat menu: any page can follow any other. Entering a page
//! runs its fixed sequence of aggregations and chart builders (or asset
//! fetches) once; the resulting [`PageView`] is kept until the next
//! navigation.

use std::fmt;

use crate::assets::{Asset, AssetKind, AssetStore};
use crate::chart::builders::{
    area_over_time, box_by_category, bubble, grouped_bar, histogram, pie, scatter_3d,
};
use crate::chart::spec::ChartSpec;
use crate::config::UiConfig;
use crate::data::aggregate::{mean_by, mean_by_many, sum_by};
use crate::data::filter::{filter_by_continent, filter_by_year};
use crate::data::model::{Continent, Dataset, Field, Record};
use crate::error::{AssetError, RenderError};

/// Rows shown in the Home page preview table.
const PREVIEW_ROWS: usize = 12;

const NO_DATASET: &str = "No dataset loaded. Use File → Reload from source, or open a local file.";

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    EconomicIndicators,
    Demographics,
    HealthIndicators,
    AdvancedInsights,
    ReportAndPresentation,
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::EconomicIndicators,
        Page::Demographics,
        Page::HealthIndicators,
        Page::AdvancedInsights,
        Page::ReportAndPresentation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::EconomicIndicators => "Economic Indicators",
            Page::Demographics => "Demographics",
            Page::HealthIndicators => "Health Indicators",
            Page::AdvancedInsights => "Advanced Insights",
            Page::ReportAndPresentation => "Report & Presentation",
        }
    }

    pub fn needs_dataset(self) -> bool {
        !matches!(self, Page::Home | Page::ReportAndPresentation)
    }

    /// Whether the page content depends on the loaded dataset at all.
    pub fn shows_dataset(self) -> bool {
        self != Page::ReportAndPresentation
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Page contents
// ---------------------------------------------------------------------------

/// Headline numbers of the loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub countries: usize,
    pub continents: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Countries observed per continent, continents without rows left out.
    pub countries_per_continent: Vec<(Continent, usize)>,
}

impl DatasetSummary {
    pub fn of(dataset: &Dataset) -> Self {
        let years = dataset.years();
        DatasetSummary {
            rows: dataset.len(),
            countries: dataset.distinct(Field::Country).len(),
            continents: dataset.distinct(Field::Continent).len(),
            first_year: years.first().copied(),
            last_year: years.last().copied(),
            countries_per_continent: Continent::ALL
                .into_iter()
                .map(|c| (c, filter_by_continent(dataset, c).distinct(Field::Country).len()))
                .filter(|(_, n)| *n > 0)
                .collect(),
        }
    }
}

#[derive(Debug)]
pub enum Section {
    Heading(String),
    /// Paragraph; lines starting with `- ` are drawn as bullets.
    Text(String),
    /// Fallback shown instead of content that cannot be produced.
    Notice(String),
    Summary(DatasetSummary),
    Preview(Vec<Record>),
    Chart(Result<ChartSpec, RenderError>),
    Download {
        kind: AssetKind,
        asset: Result<Asset, AssetError>,
    },
    Code {
        title: String,
        source: String,
    },
}

#[derive(Debug)]
pub struct PageView {
    pub page: Page,
    pub sections: Vec<Section>,
}

impl PageView {
    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.sections.iter().filter_map(|s| match s {
            Section::Chart(Ok(spec)) => Some(spec),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &RenderError> {
        self.sections.iter().filter_map(|s| match s {
            Section::Chart(Err(e)) => Some(e),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the enter-action of `page`.
pub fn render(
    page: Page,
    dataset: Option<&Dataset>,
    assets: &AssetStore,
    ui: &UiConfig,
) -> PageView {
    log::info!("Rendering page '{page}'");
    let mut sections = vec![Section::Heading(page.title().to_string())];

    match (page, dataset) {
        (Page::Home, _) => sections.extend(home(dataset)),
        (Page::ReportAndPresentation, _) => sections.extend(report(assets)),
        (_, None) => sections.push(Section::Notice(NO_DATASET.to_string())),
        (Page::EconomicIndicators, Some(ds)) => sections.extend(economic(ds)),
        (Page::Demographics, Some(ds)) => sections.extend(demographics(ds)),
        (Page::HealthIndicators, Some(ds)) => sections.extend(health(ds, ui)),
        (Page::AdvancedInsights, Some(ds)) => sections.extend(advanced(ds, ui)),
    }

    let view = PageView { page, sections };
    for e in view.errors() {
        log::error!("Chart on '{page}' failed: {e}");
    }
    view
}

fn chart(build: impl FnOnce() -> Result<ChartSpec, RenderError>) -> Section {
    Section::Chart(build())
}

fn latest(dataset: &Dataset) -> (i32, Dataset) {
    let year = dataset.latest_year().unwrap_or_default();
    (year, filter_by_year(dataset, year))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn home(dataset: Option<&Dataset>) -> Vec<Section> {
    let mut sections = vec![Section::Text(
        "Gapminder country statistics from 1952 to 2007, covering:\n\
         - Economic indicators: GDP per capita trends\n\
         - Demographics: population growth by continent\n\
         - Health: life expectancy analysis\n\
         - Interactive visualizations for deeper insights"
            .to_string(),
    )];
    match dataset {
        Some(ds) => {
            sections.push(Section::Summary(DatasetSummary::of(ds)));
            sections.push(Section::Preview(
                ds.records().iter().take(PREVIEW_ROWS).cloned().collect(),
            ));
        }
        None => sections.push(Section::Notice(NO_DATASET.to_string())),
    }
    sections
}

fn economic(ds: &Dataset) -> Vec<Section> {
    let (year, latest) = latest(ds);
    vec![
        chart(|| {
            let view = mean_by(ds, Field::Continent, Field::GdpPercap)?.sorted();
            Ok(grouped_bar(
                &view,
                "continent",
                "gdpPercap",
                None,
                "Average GDP per capita by continent",
            )?)
        }),
        chart(|| {
            let view = mean_by_many(ds, &[Field::Year, Field::Continent], Field::GdpPercap)?.sorted();
            Ok(area_over_time(
                &view,
                "year",
                "gdpPercap",
                Some("continent"),
                false,
                "GDP per capita over time",
            )?)
        }),
        chart(|| {
            Ok(box_by_category(
                &latest,
                "continent",
                "gdpPercap",
                &format!("GDP per capita distribution ({year})"),
            )?)
        }),
    ]
}

fn demographics(ds: &Dataset) -> Vec<Section> {
    let (year, latest) = latest(ds);
    vec![
        chart(|| {
            let view = sum_by(ds, &[Field::Year, Field::Continent], Field::Pop)?.sorted();
            Ok(area_over_time(
                &view,
                "year",
                "pop",
                Some("continent"),
                true,
                "Population growth by continent",
            )?)
        }),
        chart(|| {
            let view = sum_by(&latest, &[Field::Continent], Field::Pop)?.sorted();
            Ok(pie(
                &view,
                "continent",
                "pop",
                &format!("Share of world population ({year})"),
            )?)
        }),
    ]
}

fn health(ds: &Dataset, ui: &UiConfig) -> Vec<Section> {
    let (year, latest) = latest(ds);
    vec![
        chart(|| {
            let view = mean_by(ds, Field::Continent, Field::LifeExp)?.sorted();
            Ok(grouped_bar(
                &view,
                "continent",
                "lifeExp",
                None,
                "Average life expectancy by continent",
            )?)
        }),
        chart(|| {
            Ok(box_by_category(
                &latest,
                "continent",
                "lifeExp",
                &format!("Life expectancy by continent ({year})"),
            )?)
        }),
        chart(|| {
            Ok(histogram(
                &latest,
                "lifeExp",
                Some("continent"),
                ui.histogram_bins,
                &format!("Life expectancy distribution ({year})"),
            )?)
        }),
    ]
}

fn advanced(ds: &Dataset, ui: &UiConfig) -> Vec<Section> {
    let (year, latest) = latest(ds);
    vec![
        chart(|| {
            Ok(scatter_3d(
                &latest,
                "gdpPercap",
                "lifeExp",
                "pop",
                Some("continent"),
                &format!("GDP, life expectancy and population ({year})"),
            )?)
        }),
        chart(|| {
            Ok(bubble(
                &latest,
                "gdpPercap",
                "lifeExp",
                "pop",
                Some("continent"),
                ui.bubble_size_max,
                true,
                &format!("Wealth and health of nations ({year})"),
            )?)
        }),
    ]
}

fn report(assets: &AssetStore) -> Vec<Section> {
    let mut sections = vec![Section::Text(
        "Download the full report, the presentation and the analysis script below."
            .to_string(),
    )];

    let mut script_text = None;
    for kind in AssetKind::ALL {
        let asset = assets.fetch_asset(kind);
        match &asset {
            Ok(a) if kind == AssetKind::Script => {
                script_text = Some(a.text());
            }
            Ok(_) => {}
            Err(e) => log::error!("{e}"),
        }
        sections.push(Section::Download { kind, asset });
    }

    if let Some(source) = script_text {
        sections.push(Section::Code {
            title: "Analysis script".to_string(),
            source,
        });
    }

    sections.push(Section::Heading("Key insights".to_string()));
    sections.push(Section::Text(
        "- Europe and Oceania have the highest GDP per capita, Africa the lowest.\n\
         - GDP per capita grew worldwide between 1952 and 2007.\n\
         - Asia has the largest population, followed by Africa.\n\
         - Population grows fastest in Africa and Asia.\n\
         - Life expectancy improved everywhere, but Africa still lags behind.\n\
         - Countries with higher GDP generally have higher life expectancy."
            .to_string(),
    ));
    sections
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::assets::tests::{asset_config, FakeRegenerator};
    use crate::chart::spec::ChartData;
    use crate::data::model::tests::sample_dataset;

    fn store(dir: &Path, calls: Arc<AtomicUsize>) -> AssetStore {
        AssetStore::new(
            &asset_config(dir),
            Box::new(FakeRegenerator {
                calls,
                output: None,
                delay: Duration::ZERO,
            }),
        )
    }

    #[test]
    fn every_chart_page_builds_its_charts() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        let ds = sample_dataset();
        let expected = [
            (Page::EconomicIndicators, 3),
            (Page::Demographics, 2),
            (Page::HealthIndicators, 3),
            (Page::AdvancedInsights, 2),
        ];
        for (page, charts) in expected {
            let view = render(page, Some(&ds), &assets, &UiConfig::default());
            assert_eq!(view.errors().count(), 0, "{page}");
            assert_eq!(view.charts().count(), charts, "{page}");
            assert!(view.charts().all(|c| !c.is_empty()), "{page}");
        }
    }

    #[test]
    fn charts_use_the_latest_year() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        let view = render(
            Page::Demographics,
            Some(&sample_dataset()),
            &assets,
            &UiConfig::default(),
        );
        let pie = view.charts().nth(1).unwrap();
        assert_eq!(pie.title, "Share of world population (2007)");
        let ChartData::Pie { slices } = &pie.data else {
            panic!("expected pie");
        };
        assert_eq!(slices.iter().map(|s| s.value).sum::<f64>(), 234.0);
    }

    #[test]
    fn empty_dataset_renders_empty_charts() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        let empty = Dataset::default();
        for page in Page::ALL.into_iter().filter(|p| p.needs_dataset()) {
            let view = render(page, Some(&empty), &assets, &UiConfig::default());
            assert_eq!(view.errors().count(), 0, "{page}");
            assert!(view.charts().all(ChartSpec::is_empty), "{page}");
        }
    }

    #[test]
    fn health_bar_averages_life_expectancy_per_continent() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        let view = render(
            Page::HealthIndicators,
            Some(&sample_dataset()),
            &assets,
            &UiConfig::default(),
        );
        let bar = view
            .charts()
            .find(|c| matches!(c.data, ChartData::Bars { .. }))
            .unwrap();
        assert_eq!(bar.bindings.x.as_deref(), Some("continent"));
        assert_eq!(bar.bindings.color, None);
        let ChartData::Bars { categories, series } = &bar.data else {
            panic!("expected bars");
        };
        assert_eq!(categories, &vec!["Africa", "Asia", "Europe"]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn chart_pages_without_dataset_show_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        for page in Page::ALL {
            let view = render(page, None, &assets, &UiConfig::default());
            assert_eq!(view.charts().count(), 0);
            let has_notice = view
                .sections
                .iter()
                .any(|s| matches!(s, Section::Notice(_)));
            assert_eq!(has_notice, page != Page::ReportAndPresentation, "{page}");
        }
    }

    #[test]
    fn report_page_survives_failed_regeneration() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let assets = store(dir.path(), calls.clone());

        let view = render(Page::ReportAndPresentation, None, &assets, &UiConfig::default());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let downloads: Vec<(AssetKind, bool)> = view
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Download { kind, asset } => Some((*kind, asset.is_ok())),
                _ => None,
            })
            .collect();
        assert_eq!(
            downloads,
            vec![
                (AssetKind::Report, true),
                (AssetKind::Presentation, false),
                (AssetKind::Script, true),
            ]
        );
        assert!(view.sections.iter().any(|s| matches!(
            s,
            Section::Download {
                asset: Err(AssetError::Generation { .. }),
                ..
            }
        )));
        assert!(view
            .sections
            .iter()
            .any(|s| matches!(s, Section::Code { source, .. } if source.contains("ggplot2"))));
    }

    #[test]
    fn home_summarises_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let assets = store(dir.path(), Arc::default());
        let view = render(Page::Home, Some(&sample_dataset()), &assets, &UiConfig::default());
        let summary = view
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Summary(summary) => Some(summary.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            summary,
            DatasetSummary {
                rows: 8,
                countries: 4,
                continents: 3,
                first_year: Some(2002),
                last_year: Some(2007),
                countries_per_continent: vec![
                    (Continent::Africa, 2),
                    (Continent::Asia, 1),
                    (Continent::Europe, 1),
                ],
            }
        );
    }

    #[test]
    fn pages_are_distinct() {
        let titles: std::collections::HashSet<&str> = Page::ALL.iter().map(|p| p.title()).collect();
        assert_eq!(titles.len(), 6);
        assert_eq!(Page::default(), Page::Home);
    }
}
