//! Text rendering shared by the `popmap` commands.

use compute::NormalizationMode;
use panel::{HistogramWidget, PanelDisplay};

/// Width of the longest bar, in characters.
pub const BAR_WIDTH: usize = 40;

/// Parses `--mode MODE` out of `args`, returning the mode and the remaining
/// positional arguments.
pub fn split_mode_flag(
    args: &[String],
    default: NormalizationMode,
) -> Result<(NormalizationMode, Vec<String>), String> {
    let mut mode = default;
    let mut rest = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                let value = args.get(i).ok_or("--mode requires a value")?;
                mode = value.parse().map_err(|e| format!("{e}"))?;
            }
            s if s.starts_with('-') => return Err(format!("unknown arg: {s}")),
            s => rest.push(s.to_string()),
        }
        i += 1;
    }
    Ok((mode, rest))
}

/// One line per bin: range labels, a bar scaled to the tallest bin, and the count.
pub fn render_histogram(widget: &HistogramWidget) -> String {
    let rows: Vec<(String, String, usize, u64)> = widget
        .bars()
        .into_iter()
        .map(|bar| {
            let len = (bar.height * BAR_WIDTH as f64).round() as usize;
            let len = if bar.count > 0 { len.max(1) } else { len };
            (
                widget.label(bar.min_value),
                widget.label(bar.max_value),
                len,
                bar.count,
            )
        })
        .collect();
    let lo_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let hi_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (lo, hi, len, count) in rows {
        out.push_str(&format!(
            "{lo:>lo_width$} - {hi:<hi_width$} |{bar} {count}\n",
            bar = "#".repeat(len)
        ));
    }
    out
}

/// Labels, average and histogram of an applied display.
pub fn render_display(display: &PanelDisplay) -> String {
    let mut out = String::new();
    if let Some(mode) = display.mode {
        out.push_str(&format!("mode:    {} ({})\n", mode, mode.label()));
    }
    let min = display.min_label.as_deref().unwrap_or("-");
    let max = display.max_label.as_deref().unwrap_or("-");
    out.push_str(&format!("range:   {min} .. {max}\n"));
    if let Some(widget) = &display.widget {
        let avg = widget.average_label().unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("average: {avg}\n\n"));
        out.push_str(&render_histogram(widget));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render_histogram, split_mode_flag};
    use compute::{Bin, HistogramResult, NormalizationMode};
    use foundation::NumberLocale;
    use panel::{HistogramWidget, LabelFormat};
    use pretty_assertions::assert_eq;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mode_flag_anywhere_in_args() {
        let (mode, rest) =
            split_mode_flag(&args(&["a.geojson", "--mode", "square-root"]), NormalizationMode::Log)
                .unwrap();
        assert_eq!(mode, NormalizationMode::SquareRoot);
        assert_eq!(rest, args(&["a.geojson"]));

        let (mode, _) = split_mode_flag(&args(&["a.geojson"]), NormalizationMode::Log).unwrap();
        assert_eq!(mode, NormalizationMode::Log);

        assert!(split_mode_flag(&args(&["--mode"]), NormalizationMode::Log).is_err());
        assert!(split_mode_flag(&args(&["--mode", "cube"]), NormalizationMode::Log).is_err());
        assert!(split_mode_flag(&args(&["--pretty"]), NormalizationMode::Log).is_err());
    }

    #[test]
    fn histogram_rows_scale_to_the_tallest_bin() {
        let mut widget = HistogramWidget::from_histogram_result(&HistogramResult {
            min_value: 0.0,
            max_value: 3000.0,
            bins: vec![
                Bin { min_value: 0.0, max_value: 1000.0, count: 4 },
                Bin { min_value: 1000.0, max_value: 2000.0, count: 0 },
                Bin { min_value: 2000.0, max_value: 3000.0, count: 1 },
            ],
        });
        widget.label_format = Some(LabelFormat::new(NormalizationMode::None, NumberLocale::en_us()));

        let text = render_histogram(&widget);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("    0 - 1,000 |{} 4", "#".repeat(40)));
        assert_eq!(lines[1], "1,000 - 2,000 | 0");
        assert_eq!(lines[2], format!("2,000 - 3,000 |{} 1", "#".repeat(10)));
    }
}
