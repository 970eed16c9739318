use compute::NormalizationMode;
use foundation::NumberLocale;
use serde::Serialize;

use crate::params::has_open_upper_bound;

/// Formats a bound or axis value for display in the given mode (en-US).
pub fn format_label(mode: NormalizationMode, value: f64) -> String {
    format_label_in(&NumberLocale::en_us(), mode, value)
}

pub fn format_label_in(locale: &NumberLocale, mode: NormalizationMode, value: f64) -> String {
    match mode {
        NormalizationMode::None => locale.format(value.round()),
        NormalizationMode::PercentOfTotal => format!("{}%", locale.format(value * 100.0)),
        _ => locale.format(value),
    }
}

/// Max label: the formatted value, with `+` for modes whose range is cut off.
pub fn format_max_label(locale: &NumberLocale, mode: NormalizationMode, value: f64) -> String {
    let mut label = format_label_in(locale, mode, value);
    if has_open_upper_bound(mode) {
        label.push('+');
    }
    label
}

/// Label formatter installed on the histogram widget, bound to one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelFormat {
    pub mode: NormalizationMode,
    #[serde(skip)]
    pub locale: NumberLocale,
}

impl LabelFormat {
    pub fn new(mode: NormalizationMode, locale: NumberLocale) -> Self {
        Self { mode, locale }
    }

    pub fn format(&self, value: f64) -> String {
        format_label_in(&self.locale, self.mode, value)
    }
}
