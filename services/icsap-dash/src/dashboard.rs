use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use svckit::errors::DashError;
use svckit::metrics;
use svckit::types::AdmissionRecord;

use crate::aggregation::Summaries;
use crate::charts::{self, ChartKind, Figure};
use crate::config::DashboardSettings;
use crate::filters::{FilterOptions, FilterSelection};
use crate::repository::AdmissionRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub figure: Figure,
}

/// Everything one dashboard refresh shows for a filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub rows_total: usize,
    pub rows_selected: usize,
    pub summaries: Summaries,
    pub charts: Vec<RenderedChart>,
}

impl DashboardView {
    /// Filters, aggregates and renders synchronously over an in-memory dataset.
    pub fn build(
        dataset: &[AdmissionRecord],
        selection: &FilterSelection,
        settings: &DashboardSettings,
    ) -> Result<Self, DashError> {
        let selection = selection.clone().normalized(&settings.labels)?;
        let selected = selection.apply(dataset);
        let summaries = Summaries::compute(&selected, settings);
        let charts = ChartKind::ALL
            .iter()
            .map(|&kind| {
                Ok(RenderedChart {
                    kind,
                    figure: charts::render(&summaries, kind, &settings.style)?,
                })
            })
            .collect::<Result<_, DashError>>()?;

        Ok(Self {
            rows_total: dataset.len(),
            rows_selected: selected.len(),
            summaries,
            charts,
        })
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&Figure> {
        self.charts.iter().find(|c| c.kind == kind).map(|c| &c.figure)
    }
}

pub struct Dashboard {
    repository: Arc<AdmissionRepository>,
    settings: DashboardSettings,
}

impl Dashboard {
    pub fn new(repository: Arc<AdmissionRepository>, settings: DashboardSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn repository(&self) -> &AdmissionRepository {
        &self.repository
    }

    /// Filter choices derived from the full (unfiltered) dataset.
    pub async fn options(&self) -> Result<FilterOptions, DashError> {
        let dataset = self.repository.fetch_admissions().await?;
        Ok(FilterOptions::extract(&dataset, &self.settings.labels))
    }

    pub async fn summaries(&self, selection: &FilterSelection) -> Result<Summaries, DashError> {
        let dataset = self.repository.fetch_admissions().await?;
        let selection = selection.clone().normalized(&self.settings.labels)?;
        let selected = selection.apply(&dataset);
        Ok(Summaries::compute(&selected, &self.settings))
    }

    pub async fn render(&self, selection: &FilterSelection) -> Result<DashboardView, DashError> {
        let start = Instant::now();
        let view = self
            .repository
            .fetch_admissions()
            .await
            .and_then(|dataset| DashboardView::build(&dataset, selection, &self.settings));
        metrics::record_render(view.is_ok());
        let view = view?;
        info!(
            "Rendered dashboard: {}/{} grains selected in {:?}",
            view.rows_selected,
            view.rows_total,
            start.elapsed()
        );
        Ok(view)
    }

    pub async fn chart(
        &self,
        selection: &FilterSelection,
        kind: ChartKind,
    ) -> Result<Figure, DashError> {
        let summaries = self.summaries(selection).await?;
        debug!("Rendering {} chart", kind);
        charts::render(&summaries, kind, &self.settings.style)
    }

    /// Invalidates the cached dataset and reloads it; returns the new row count.
    pub async fn refresh(&self) -> Result<usize, DashError> {
        let dataset = self.repository.refresh().await?;
        info!("Dashboard data refreshed: {} grains", dataset.len());
        Ok(dataset.len())
    }

    pub async fn health_check(&self) -> Result<(), DashError> {
        self.repository.health_check().await
    }
}
