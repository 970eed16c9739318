use serde::{Deserialize, Serialize};

/// Transform applied to raw values before binning and statistics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationMode {
    None,
    Log,
    NaturalLog,
    SquareRoot,
    PercentOfTotal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl std::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown normalization type: {:?}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl NormalizationMode {
    pub const ALL: [NormalizationMode; 5] = [
        NormalizationMode::None,
        NormalizationMode::Log,
        NormalizationMode::NaturalLog,
        NormalizationMode::SquareRoot,
        NormalizationMode::PercentOfTotal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationMode::None => "none",
            NormalizationMode::Log => "log",
            NormalizationMode::NaturalLog => "natural-log",
            NormalizationMode::SquareRoot => "square-root",
            NormalizationMode::PercentOfTotal => "percent-of-total",
        }
    }

    /// Human-readable option label.
    pub fn label(&self) -> &'static str {
        match self {
            NormalizationMode::None => "None",
            NormalizationMode::Log => "Log",
            NormalizationMode::NaturalLog => "Natural log",
            NormalizationMode::SquareRoot => "Square root",
            NormalizationMode::PercentOfTotal => "Percent of total",
        }
    }

    /// Applies the transform. `None` means the value does not qualify:
    /// logarithms need a positive input, square roots a non-negative one, and
    /// percent-of-total a positive total. Percent-of-total yields a fraction.
    pub fn apply(&self, value: f64, total: Option<f64>) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let out = match self {
            NormalizationMode::None => value,
            NormalizationMode::Log if value > 0.0 => value.log10(),
            NormalizationMode::NaturalLog if value > 0.0 => value.ln(),
            NormalizationMode::SquareRoot if value >= 0.0 => value.sqrt(),
            NormalizationMode::PercentOfTotal => match total {
                Some(t) if t > 0.0 && t.is_finite() => value / t,
                _ => return None,
            },
            _ => return None,
        };
        out.is_finite().then_some(out)
    }
}

impl std::fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NormalizationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        NormalizationMode::ALL
            .into_iter()
            .find(|m| m.as_str() == t)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}
