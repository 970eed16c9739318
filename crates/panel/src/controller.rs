use std::sync::Arc;

use compute::{
    HistogramResult, NormalizationMode, StatsError, StatsRequestParams, StatsSource,
    SummaryStatisticsResult,
};
use foundation::{Color, NumberLocale};
use futures_util::future::join;
use runtime::{Generation, GenerationCounter, Metrics};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::format::{LabelFormat, format_label_in, format_max_label};
use crate::params::build_params;
use crate::widget::{BAR_OPACITY, BarStyle, HistogramWidget};

pub const REFRESH_ISSUED: &str = "refresh.issued";
pub const REFRESH_APPLIED: &str = "refresh.applied";
pub const REFRESH_FAILED: &str = "refresh.failed";
pub const REFRESH_STALE: &str = "refresh.stale";
pub const WIDGET_CREATED: &str = "widget.created";
pub const REFRESH_IN_FLIGHT: &str = "refresh.in_flight";

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Mode selected before the user touches the control.
    pub initial_mode: NormalizationMode,
    pub bar_color: Color,
    pub bar_opacity: f32,
    pub locale: NumberLocale,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            initial_mode: NormalizationMode::Log,
            bar_color: Color::rgba(221, 68, 65, 0.8),
            bar_opacity: BAR_OPACITY,
            locale: NumberLocale::en_us(),
        }
    }
}

/// What the panel shows: the two bound labels and the histogram widget.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDisplay {
    pub min_label: Option<String>,
    pub max_label: Option<String>,
    pub widget: Option<HistogramWidget>,
    /// Mode and generation of the applied result.
    pub mode: Option<NormalizationMode>,
    pub generation: Option<Generation>,
}

/// An issued refresh: its generation, mode and request parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTicket {
    pub generation: Generation,
    pub mode: NormalizationMode,
    pub params: StatsRequestParams,
}

/// Both settled halves of a statistics fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsOutcome {
    pub histogram: Result<HistogramResult, StatsError>,
    pub summary: Result<SummaryStatisticsResult, StatsError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsFetchError {
    pub histogram: Option<StatsError>,
    pub summary: Option<StatsError>,
}

impl std::fmt::Display for StatsFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.histogram, &self.summary) {
            (Some(h), Some(s)) => write!(f, "histogram: {h}; summary statistics: {s}"),
            (Some(h), None) => write!(f, "histogram: {h}"),
            (None, Some(s)) => write!(f, "summary statistics: {s}"),
            (None, None) => write!(f, "statistics fetch failed"),
        }
    }
}

impl std::error::Error for StatsFetchError {}

impl StatsOutcome {
    pub fn into_results(
        self,
    ) -> Result<(HistogramResult, SummaryStatisticsResult), StatsFetchError> {
        match (self.histogram, self.summary) {
            (Ok(h), Ok(s)) => Ok((h, s)),
            (h, s) => Err(StatsFetchError {
                histogram: h.err(),
                summary: s.err(),
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    Applied,
    /// A newer refresh was issued; the result was dropped.
    Stale,
    /// A request failed; the display was left untouched.
    Failed,
}

/// Runs both queries with the same parameters and waits for both to settle.
/// A failure on one side never cancels the other.
pub async fn fetch_stats<S: StatsSource + ?Sized>(
    source: &S,
    params: &StatsRequestParams,
) -> StatsOutcome {
    let (histogram, summary) = join(
        source.histogram(params),
        source.summary_statistics(params),
    )
    .await;
    StatsOutcome { histogram, summary }
}

/// Owns the panel display and decides which results reach it.
pub struct RefreshController<S: StatsSource + ?Sized> {
    source: Arc<S>,
    config: PanelConfig,
    mode: NormalizationMode,
    generations: GenerationCounter,
    display: PanelDisplay,
    metrics: Metrics,
}

impl<S: StatsSource + ?Sized> RefreshController<S> {
    pub fn new(source: Arc<S>, config: PanelConfig) -> Self {
        Self {
            source,
            mode: config.initial_mode,
            config,
            generations: GenerationCounter::new(),
            display: PanelDisplay::default(),
            metrics: Metrics::new(),
        }
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    /// Currently selected mode.
    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    pub fn select_mode(&mut self, mode: NormalizationMode) {
        self.mode = mode;
    }

    pub fn display(&self) -> &PanelDisplay {
        &self.display
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Issues a refresh for the selected mode. Any earlier ticket becomes stale.
    pub fn begin(&mut self) -> RefreshTicket {
        let generation = self.generations.issue();
        self.metrics.inc_counter(REFRESH_ISSUED, 1);
        debug!(generation = generation.0, mode = %self.mode, "refresh issued");
        RefreshTicket {
            generation,
            mode: self.mode,
            params: build_params(self.mode),
        }
    }

    /// Settles a ticket. Stale tickets are dropped whatever their outcome;
    /// failures are logged once and leave the display as it was.
    pub fn complete(&mut self, ticket: RefreshTicket, outcome: StatsOutcome) -> RefreshStatus {
        if !self.generations.is_current(ticket.generation) {
            self.metrics.inc_counter(REFRESH_STALE, 1);
            debug!(
                generation = ticket.generation.0,
                latest = self.generations.latest().map_or(0, |g| g.0),
                mode = %ticket.mode,
                "discarding stale statistics"
            );
            return RefreshStatus::Stale;
        }

        match outcome.into_results() {
            Ok((histogram, stats)) => {
                self.apply_result(&histogram, &stats, ticket.mode);
                self.display.generation = Some(ticket.generation);
                self.metrics.inc_counter(REFRESH_APPLIED, 1);
                RefreshStatus::Applied
            }
            Err(err) => {
                self.metrics.inc_counter(REFRESH_FAILED, 1);
                error!(
                    generation = ticket.generation.0,
                    mode = %ticket.mode,
                    error = %err,
                    "statistics refresh failed"
                );
                RefreshStatus::Failed
            }
        }
    }

    /// Writes a histogram/statistics pair into the labels and the widget.
    pub fn apply_result(
        &mut self,
        histogram: &HistogramResult,
        stats: &SummaryStatisticsResult,
        mode: NormalizationMode,
    ) {
        let locale = &self.config.locale;
        self.display.min_label = Some(format_label_in(locale, mode, histogram.min_value));
        self.display.max_label = Some(format_max_label(locale, mode, histogram.max_value));

        match self.display.widget.as_mut() {
            Some(widget) => widget.update_from(histogram),
            None => {
                let mut widget = HistogramWidget::from_histogram_result(histogram);
                widget.bar_style = Some(BarStyle::new(
                    self.config.bar_color,
                    self.config.bar_opacity,
                ));
                self.metrics.inc_counter(WIDGET_CREATED, 1);
                info!(bins = histogram.bins.len(), "histogram widget created");
                self.display.widget = Some(widget);
            }
        }
        if let Some(widget) = self.display.widget.as_mut() {
            widget.average = stats.avg;
            widget.label_format = Some(LabelFormat::new(mode, locale.clone()));
        }
        self.display.mode = Some(mode);
    }

    /// Counts a refresh whose fetch never produced an outcome.
    pub fn record_aborted(&mut self) {
        self.metrics.inc_counter(REFRESH_FAILED, 1);
    }

    pub fn set_in_flight(&mut self, in_flight: usize) {
        self.metrics
            .set_gauge(REFRESH_IN_FLIGHT, i64::try_from(in_flight).unwrap_or(i64::MAX));
    }

    /// Issues, fetches and settles one refresh for the selected mode.
    pub async fn refresh(&mut self) -> RefreshStatus {
        let ticket = self.begin();
        let source = self.source();
        let outcome = fetch_stats(&*source, &ticket.params).await;
        self.complete(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        PanelConfig, REFRESH_APPLIED, REFRESH_FAILED, REFRESH_STALE, RefreshController,
        RefreshStatus, StatsOutcome, WIDGET_CREATED, fetch_stats,
    };
    use compute::{
        Bin, BoxFuture, HistogramResult, NormalizationMode, StatsError, StatsRequestParams,
        StatsSource, SummaryStatisticsResult, TableStatsSource,
    };
    use formats::FeatureTable;
    use pretty_assertions::assert_eq;
    use runtime::Generation;

    const SAMPLE: &str = include_str!("../../formats/assets/municipios_sample.geojson");

    fn histogram(min: f64, max: f64, counts: &[u64]) -> HistogramResult {
        let width = (max - min) / counts.len() as f64;
        HistogramResult {
            min_value: min,
            max_value: max,
            bins: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| Bin {
                    min_value: min + width * i as f64,
                    max_value: min + width * (i + 1) as f64,
                    count,
                })
                .collect(),
        }
    }

    fn stats(avg: f64) -> SummaryStatisticsResult {
        SummaryStatisticsResult {
            avg: Some(avg),
            min: None,
            max: None,
            count: 1,
            sum: avg,
            stddev: None,
            variance: None,
        }
    }

    fn ok(min: f64, max: f64, avg: f64) -> StatsOutcome {
        StatsOutcome {
            histogram: Ok(histogram(min, max, &[1, 2, 3])),
            summary: Ok(stats(avg)),
        }
    }

    /// Answers every query with an error on one chosen side.
    struct Flaky {
        fail_histogram: bool,
    }

    impl StatsSource for Flaky {
        fn histogram<'a>(
            &'a self,
            _params: &'a StatsRequestParams,
        ) -> BoxFuture<'a, Result<HistogramResult, StatsError>> {
            let fail = self.fail_histogram;
            Box::pin(async move {
                if fail {
                    Err(StatsError::Unavailable("histogram down".to_string()))
                } else {
                    Ok(histogram(0.0, 3.0, &[1, 1, 1]))
                }
            })
        }

        fn summary_statistics<'a>(
            &'a self,
            _params: &'a StatsRequestParams,
        ) -> BoxFuture<'a, Result<SummaryStatisticsResult, StatsError>> {
            let fail = self.fail_histogram;
            Box::pin(async move {
                if fail {
                    Ok(stats(1.0))
                } else {
                    Err(StatsError::Unavailable("statistics down".to_string()))
                }
            })
        }
    }

    fn table_controller() -> RefreshController<TableStatsSource> {
        let table = FeatureTable::from_geojson_str(SAMPLE).unwrap();
        RefreshController::new(
            Arc::new(TableStatsSource::new(Arc::new(table))),
            PanelConfig::default(),
        )
    }

    #[tokio::test]
    async fn refresh_fills_labels_and_widget() {
        let mut c = table_controller();
        c.select_mode(NormalizationMode::None);
        assert_eq!(c.refresh().await, RefreshStatus::Applied);

        let d = c.display();
        assert_eq!(d.min_label.as_deref(), Some("0"));
        assert_eq!(d.max_label.as_deref(), Some("75,000+"));
        assert_eq!(d.mode, Some(NormalizationMode::None));
        assert_eq!(d.generation, Some(Generation(1)));

        let w = d.widget.as_ref().unwrap();
        assert_eq!(w.bins.len(), 30);
        assert_eq!(w.average, Some(10_191.5));
        assert_eq!(w.average_label().as_deref(), Some("10,192"));
        assert_eq!(w.bar_style.as_ref().unwrap().fill, "#dd4441");
        assert_eq!(w.bar_style.as_ref().unwrap().opacity, 0.8);
    }

    #[tokio::test]
    async fn mode_switch_mutates_the_same_widget() {
        let mut c = table_controller();
        assert_eq!(c.refresh().await, RefreshStatus::Applied);
        assert_eq!(c.display().max_label.as_deref(), Some("6.284"));

        c.select_mode(NormalizationMode::PercentOfTotal);
        assert_eq!(c.refresh().await, RefreshStatus::Applied);
        let d = c.display();
        assert_eq!(d.min_label.as_deref(), Some("0%"));
        assert_eq!(d.max_label.as_deref(), Some("10%+"));
        assert_eq!(
            d.widget.as_ref().unwrap().label_format.as_ref().unwrap().mode,
            NormalizationMode::PercentOfTotal
        );
        assert_eq!(c.metrics().counter(WIDGET_CREATED), 1);
        assert_eq!(c.metrics().counter(REFRESH_APPLIED), 2);
    }

    #[test]
    fn apply_result_is_idempotent() {
        let mut c = table_controller();
        let h = histogram(0.0, 75_000.0, &[5, 0, 2]);
        let s = stats(1234.0);
        c.apply_result(&h, &s, NormalizationMode::None);
        let first = c.display().clone();
        c.apply_result(&h, &s, NormalizationMode::None);
        assert_eq!(c.display(), &first);
        assert_eq!(c.metrics().counter(WIDGET_CREATED), 1);
    }

    #[test]
    fn late_result_of_an_older_refresh_is_discarded() {
        let mut c = table_controller();
        c.select_mode(NormalizationMode::None);
        let a = c.begin();
        c.select_mode(NormalizationMode::SquareRoot);
        let b = c.begin();

        assert_eq!(c.complete(b, ok(0.0, 1386.5, 700.0)), RefreshStatus::Applied);
        assert_eq!(c.complete(a, ok(0.0, 75_000.0, 10.0)), RefreshStatus::Stale);

        let d = c.display();
        assert_eq!(d.generation, Some(Generation(2)));
        assert_eq!(d.mode, Some(NormalizationMode::SquareRoot));
        assert_eq!(d.max_label.as_deref(), Some("1,386.5"));
        assert_eq!(d.widget.as_ref().unwrap().average, Some(700.0));
        assert_eq!(c.metrics().counter(REFRESH_STALE), 1);
    }

    #[test]
    fn older_result_arriving_first_is_also_discarded() {
        let mut c = table_controller();
        let a = c.begin();
        let b = c.begin();
        assert_eq!(c.complete(a, ok(0.0, 1.0, 0.5)), RefreshStatus::Stale);
        assert_eq!(c.display().widget, None);
        assert_eq!(c.complete(b, ok(0.0, 2.0, 1.0)), RefreshStatus::Applied);
    }

    #[tokio::test]
    async fn one_failed_request_leaves_the_display_untouched() {
        for fail_histogram in [true, false] {
            let mut c = RefreshController::new(
                Arc::new(Flaky { fail_histogram }),
                PanelConfig::default(),
            );
            let t = c.begin();
            c.complete(t, ok(0.0, 9.0, 4.5));
            let before = c.display().clone();

            let outcome = fetch_stats(&*c.source(), &c.begin().params).await;
            assert_eq!(outcome.histogram.is_err(), fail_histogram);
            assert_eq!(outcome.summary.is_err(), !fail_histogram);

            assert_eq!(c.refresh().await, RefreshStatus::Failed);
            assert_eq!(c.display(), &before);
            assert_eq!(c.metrics().counter(REFRESH_FAILED), 1);
        }
    }

    #[test]
    fn fetch_error_names_the_failed_side() {
        let outcome = StatsOutcome {
            histogram: Ok(histogram(0.0, 1.0, &[1])),
            summary: Err(StatsError::UnknownField("pobtot".to_string())),
        };
        let err = outcome.into_results().unwrap_err();
        assert!(err.histogram.is_none());
        assert_eq!(err.to_string(), "summary statistics: unknown field: pobtot");
    }

    #[test]
    fn display_serializes_for_clients() {
        let mut c = table_controller();
        let t = c.begin();
        c.complete(t, ok(0.0, 6.3, 4.1));
        let v = serde_json::to_value(c.display()).unwrap();
        assert_eq!(v["minLabel"], "0");
        assert_eq!(v["maxLabel"], "6.3");
        assert_eq!(v["mode"], "log");
        assert_eq!(v["generation"], 1);
        assert_eq!(v["widget"]["barStyle"]["fill"], "#dd4441");
        assert_eq!(v["widget"]["bins"][2]["count"], 3);
    }
}
