//! Data-service boundary for histogram and summary-statistics queries.
//!
//! Both queries are read-only, idempotent and independently failable. The
//! refresh logic only depends on the [`StatsSource`] trait, so any backend
//! (in-process table, remote feature service) can answer them.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::normalization::NormalizationMode;

/// Parameters shared by the histogram and the summary-statistics query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequestParams {
    pub field: String,
    pub num_bins: u32,
    pub normalization_type: NormalizationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl StatsRequestParams {
    /// Checks invariants a backend relies on before touching data.
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.num_bins == 0 {
            return Err(StatsError::InvalidParams("num_bins must be positive".to_string()));
        }
        if let (Some(lo), Some(hi)) = (self.min_value, self.max_value)
            && lo > hi
        {
            return Err(StatsError::InvalidParams(format!(
                "min_value {lo} exceeds max_value {hi}"
            )));
        }
        if self.normalization_type == NormalizationMode::PercentOfTotal
            && !self.normalization_total.is_some_and(|t| t > 0.0)
        {
            return Err(StatsError::InvalidParams(
                "percent-of-total requires a positive normalization_total".to_string(),
            ));
        }
        Ok(())
    }

    /// True when a transformed value lies within the requested bounds.
    pub fn in_bounds(&self, value: f64) -> bool {
        self.min_value.is_none_or(|lo| value >= lo) && self.max_value.is_none_or(|hi| value <= hi)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub min_value: f64,
    pub max_value: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramResult {
    pub min_value: f64,
    pub max_value: f64,
    pub bins: Vec<Bin>,
}

impl HistogramResult {
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatisticsResult {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: u64,
    pub sum: f64,
    pub stddev: Option<f64>,
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    UnknownField(String),
    InvalidParams(String),
    Unavailable(String),
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::UnknownField(field) => write!(f, "unknown field: {field}"),
            StatsError::InvalidParams(msg) => write!(f, "invalid statistics parameters: {msg}"),
            StatsError::Unavailable(msg) => write!(f, "statistics service unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StatsError {}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend answering statistics queries over one feature dataset.
///
/// Implementations must be `Send + Sync` so queries can run on spawned tasks.
pub trait StatsSource: Send + Sync {
    fn histogram<'a>(
        &'a self,
        params: &'a StatsRequestParams,
    ) -> BoxFuture<'a, Result<HistogramResult, StatsError>>;

    fn summary_statistics<'a>(
        &'a self,
        params: &'a StatsRequestParams,
    ) -> BoxFuture<'a, Result<SummaryStatisticsResult, StatsError>>;
}

#[cfg(test)]
mod tests {
    use super::{StatsError, StatsRequestParams};
    use crate::normalization::NormalizationMode;

    fn params(mode: NormalizationMode) -> StatsRequestParams {
        StatsRequestParams {
            field: "pobtot".to_string(),
            num_bins: 30,
            normalization_type: mode,
            normalization_total: None,
            min_value: Some(0.0),
            max_value: Some(75_000.0),
        }
    }

    #[test]
    fn validate_rejects_bad_params() {
        assert!(params(NormalizationMode::None).validate().is_ok());

        let mut p = params(NormalizationMode::None);
        p.num_bins = 0;
        assert!(matches!(p.validate(), Err(StatsError::InvalidParams(_))));

        let mut p = params(NormalizationMode::None);
        p.min_value = Some(10.0);
        p.max_value = Some(1.0);
        assert!(p.validate().is_err());

        let p = params(NormalizationMode::PercentOfTotal);
        assert!(p.validate().is_err());
    }

    #[test]
    fn bounds_are_inclusive_and_optional() {
        let mut p = params(NormalizationMode::Log);
        assert!(p.in_bounds(0.0));
        assert!(p.in_bounds(75_000.0));
        assert!(!p.in_bounds(75_000.5));
        assert!(!p.in_bounds(-0.1));
        p.max_value = None;
        assert!(p.in_bounds(1e12));
    }

    #[test]
    fn params_serialize_like_the_query_api() {
        let v = serde_json::to_value(params(NormalizationMode::NaturalLog)).unwrap();
        assert_eq!(v["numBins"], 30);
        assert_eq!(v["normalizationType"], "natural-log");
        assert!(v.get("normalizationTotal").is_none());
    }
}
