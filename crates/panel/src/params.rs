use compute::{NormalizationMode, StatsRequestParams};

/// Attribute summarized by the panel.
pub const STATS_FIELD: &str = "pobtot";
pub const NUM_BINS: u32 = 30;
/// National population used as the percent-of-total denominator.
pub const NORMALIZATION_TOTAL: f64 = 126_014_024.0;

/// Request parameters for one refresh, from the fixed per-mode policy.
pub fn build_params(mode: NormalizationMode) -> StatsRequestParams {
    let (normalization_total, max_value) = match mode {
        NormalizationMode::None => (None, Some(75_000.0)),
        NormalizationMode::Log | NormalizationMode::NaturalLog | NormalizationMode::SquareRoot => {
            (None, None)
        }
        NormalizationMode::PercentOfTotal => (Some(NORMALIZATION_TOTAL), Some(0.1)),
    };
    StatsRequestParams {
        field: STATS_FIELD.to_string(),
        num_bins: NUM_BINS,
        normalization_type: mode,
        normalization_total,
        min_value: Some(0.0),
        max_value,
    }
}

/// Modes whose upper bound cuts the distribution off; the max label of
/// these gets a trailing `+`.
pub fn has_open_upper_bound(mode: NormalizationMode) -> bool {
    matches!(
        mode,
        NormalizationMode::None | NormalizationMode::PercentOfTotal
    )
}
