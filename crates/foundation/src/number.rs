use serde::{Deserialize, Serialize};

/// Separators used when rendering numbers for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    pub group_separator: String,
    pub decimal_separator: String,
}

impl NumberLocale {
    pub fn en_us() -> Self {
        Self {
            group_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }

    pub fn new(group_separator: impl Into<String>, decimal_separator: impl Into<String>) -> Self {
        Self {
            group_separator: group_separator.into(),
            decimal_separator: decimal_separator.into(),
        }
    }

    /// Renders with the default display style: grouping on, up to three
    /// fraction digits.
    pub fn format(&self, value: f64) -> String {
        self.format_with(value, NumberFormat::default())
    }

    pub fn format_with(&self, value: f64, fmt: NumberFormat) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-∞" } else { "∞" }.to_string();
        }

        let max = fmt.max_fraction_digits.max(fmt.min_fraction_digits);
        let rounded = round_half_away(value, max);
        let mut text = format!("{:.*}", max as usize, rounded.abs());

        // Drop trailing zeros down to the minimum fraction width.
        if max > 0 {
            let keep_min = fmt.min_fraction_digits as usize;
            let dot = text.find('.').unwrap_or(text.len());
            let mut end = text.len();
            while end > dot + 1 + keep_min && text.as_bytes()[end - 1] == b'0' {
                end -= 1;
            }
            if end == dot + 1 {
                end = dot;
            }
            text.truncate(end);
        }

        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text, None),
        };

        let mut out = String::new();
        if rounded < 0.0 && (int_part.bytes().any(|b| b != b'0') || frac_part.is_some()) {
            out.push('-');
        }
        if fmt.grouping {
            out.push_str(&group_digits(&int_part, &self.group_separator));
        } else {
            out.push_str(&int_part);
        }
        if let Some(frac) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(&frac);
        }
        out
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

/// Fraction-digit and grouping options for [`NumberLocale::format_with`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub min_fraction_digits: u32,
    pub max_fraction_digits: u32,
    pub grouping: bool,
}

impl NumberFormat {
    /// Exactly `places` fraction digits.
    pub const fn fixed(places: u32, grouping: bool) -> Self {
        Self {
            min_fraction_digits: places,
            max_fraction_digits: places,
            grouping,
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            min_fraction_digits: 0,
            max_fraction_digits: 3,
            grouping: true,
        }
    }
}

fn round_half_away(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{NumberFormat, NumberLocale};

    #[test]
    fn groups_thousands() {
        let l = NumberLocale::en_us();
        assert_eq!(l.format(1234567.0), "1,234,567");
        assert_eq!(l.format(999.0), "999");
        assert_eq!(l.format(1000.0), "1,000");
        assert_eq!(l.format(-75000.0), "-75,000");
        assert_eq!(l.format(0.0), "0");
    }

    #[test]
    fn limits_fraction_digits() {
        let l = NumberLocale::en_us();
        assert_eq!(l.format(5.5), "5.5");
        assert_eq!(l.format(4.87654), "4.877");
        assert_eq!(l.format(0.0004), "0");
        assert_eq!(l.format(-0.0004), "0");
        assert_eq!(l.format(12345.6789), "12,345.679");
    }

    #[test]
    fn fixed_places_pad_with_zeros() {
        let l = NumberLocale::en_us();
        assert_eq!(l.format_with(2.5, NumberFormat::fixed(2, true)), "2.50");
        assert_eq!(l.format_with(1234.4, NumberFormat::fixed(0, false)), "1234");
        assert_eq!(l.format_with(1234.5, NumberFormat::fixed(0, true)), "1,235");
    }

    #[test]
    fn honours_custom_separators() {
        let l = NumberLocale::new(".", ",");
        assert_eq!(l.format(1234567.25), "1.234.567,25");
    }

    #[test]
    fn non_finite_values() {
        let l = NumberLocale::en_us();
        assert_eq!(l.format(f64::NAN), "NaN");
        assert_eq!(l.format(f64::INFINITY), "∞");
    }
}
