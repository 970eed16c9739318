use std::sync::Arc;

use formats::FeatureTable;

use crate::analysis::histogram::histogram;
use crate::analysis::statistics::Statistics;
use crate::source::{
    BoxFuture, HistogramResult, StatsError, StatsRequestParams, StatsSource,
    SummaryStatisticsResult,
};

/// In-process statistics backend over a loaded feature table.
#[derive(Debug, Clone)]
pub struct TableStatsSource {
    table: Arc<FeatureTable>,
}

impl TableStatsSource {
    pub fn new(table: Arc<FeatureTable>) -> Self {
        Self { table }
    }

    /// Normalized values of the requested field that fall within the bounds.
    pub fn qualifying_values(&self, params: &StatsRequestParams) -> Result<Vec<f64>, StatsError> {
        params.validate()?;
        if !self.table.has_field(&params.field) {
            return Err(StatsError::UnknownField(params.field.clone()));
        }
        Ok(self
            .table
            .values(&params.field)
            .filter_map(|v| {
                params
                    .normalization_type
                    .apply(v, params.normalization_total)
            })
            .filter(|v| params.in_bounds(*v))
            .collect())
    }

    pub fn histogram_now(&self, params: &StatsRequestParams) -> Result<HistogramResult, StatsError> {
        let values = self.qualifying_values(params)?;
        Ok(histogram(
            &values,
            params.min_value,
            params.max_value,
            params.num_bins,
        ))
    }

    pub fn summary_now(
        &self,
        params: &StatsRequestParams,
    ) -> Result<SummaryStatisticsResult, StatsError> {
        let values = self.qualifying_values(params)?;
        Ok(Statistics::summarize(&values))
    }
}

impl StatsSource for TableStatsSource {
    fn histogram<'a>(
        &'a self,
        params: &'a StatsRequestParams,
    ) -> BoxFuture<'a, Result<HistogramResult, StatsError>> {
        Box::pin(async move { self.histogram_now(params) })
    }

    fn summary_statistics<'a>(
        &'a self,
        params: &'a StatsRequestParams,
    ) -> BoxFuture<'a, Result<SummaryStatisticsResult, StatsError>> {
        Box::pin(async move { self.summary_now(params) })
    }
}
