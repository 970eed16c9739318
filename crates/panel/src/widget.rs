use compute::{Bin, HistogramResult};
use foundation::Color;
use serde::Serialize;

use crate::format::LabelFormat;

/// Opacity applied to every histogram bar.
pub const BAR_OPACITY: f32 = 0.8;

/// Fill applied to each bar when it is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarStyle {
    pub fill: String,
    pub opacity: f32,
}

impl BarStyle {
    pub fn new(color: Color, opacity: f32) -> Self {
        Self {
            fill: color.to_hex(),
            opacity,
        }
    }
}

/// One drawable bar: bin range, count and style. `height` is the count
/// relative to the tallest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub index: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub count: u64,
    pub height: f64,
    pub fill: String,
    pub opacity: f32,
}

/// State of the histogram widget hosted in the panel.
///
/// Created once from the first histogram result and updated in place after
/// that, so the hosting client keeps a single widget instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramWidget {
    pub min: f64,
    pub max: f64,
    pub bins: Vec<Bin>,
    pub average: Option<f64>,
    pub bar_style: Option<BarStyle>,
    pub label_format: Option<LabelFormat>,
}

impl HistogramWidget {
    pub fn from_histogram_result(result: &HistogramResult) -> Self {
        Self {
            min: result.min_value,
            max: result.max_value,
            bins: result.bins.clone(),
            average: None,
            bar_style: None,
            label_format: None,
        }
    }

    /// Replaces range and bins; style, label format and average stay.
    pub fn update_from(&mut self, result: &HistogramResult) {
        self.min = result.min_value;
        self.max = result.max_value;
        self.bins.clone_from(&result.bins);
    }

    pub fn label(&self, value: f64) -> String {
        match &self.label_format {
            Some(f) => f.format(value),
            None => value.to_string(),
        }
    }

    pub fn average_label(&self) -> Option<String> {
        self.average.map(|avg| self.label(avg))
    }

    pub fn bars(&self) -> Vec<Bar> {
        let tallest = self.bins.iter().map(|b| b.count).max().unwrap_or(0);
        let (fill, opacity) = match &self.bar_style {
            Some(s) => (s.fill.clone(), s.opacity),
            None => (String::new(), 1.0),
        };
        self.bins
            .iter()
            .enumerate()
            .map(|(index, b)| Bar {
                index,
                min_value: b.min_value,
                max_value: b.max_value,
                count: b.count,
                height: if tallest == 0 {
                    0.0
                } else {
                    b.count as f64 / tallest as f64
                },
                fill: fill.clone(),
                opacity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{BAR_OPACITY, BarStyle, HistogramWidget};
    use crate::format::LabelFormat;
    use compute::{Bin, HistogramResult, NormalizationMode};
    use foundation::{Color, NumberLocale};

    fn result(counts: &[u64]) -> HistogramResult {
        let bins = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| Bin {
                min_value: i as f64,
                max_value: (i + 1) as f64,
                count,
            })
            .collect();
        HistogramResult {
            min_value: 0.0,
            max_value: counts.len() as f64,
            bins,
        }
    }

    #[test]
    fn bars_carry_style_and_relative_height() {
        let mut w = HistogramWidget::from_histogram_result(&result(&[1, 4, 2]));
        w.bar_style = Some(BarStyle::new(Color::rgba(221, 68, 65, 0.8), BAR_OPACITY));
        let bars = w.bars();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].height, 1.0);
        assert_eq!(bars[0].height, 0.25);
        assert_eq!(bars[2].fill, "#dd4441");
        assert_eq!(bars[2].opacity, 0.8);
    }

    #[test]
    fn update_keeps_style_and_format() {
        let mut w = HistogramWidget::from_histogram_result(&result(&[1, 1]));
        w.bar_style = Some(BarStyle::new(Color::WHITE, BAR_OPACITY));
        w.label_format = Some(LabelFormat::new(NormalizationMode::None, NumberLocale::en_us()));
        w.update_from(&result(&[0, 0, 0]));
        assert_eq!(w.bins.len(), 3);
        assert_eq!(w.max, 3.0);
        assert!(w.bar_style.is_some());
        assert_eq!(w.label(12345.4), "12,345");
        assert!(w.bars().iter().all(|b| b.height == 0.0));
    }
}
