use foundation::Color;
use formats::Feature;
use serde::{Deserialize, Serialize};

/// Line used to outline fills and markers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub width: f32,
    pub color: Color,
}

impl Outline {
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Symbol {
    SimpleFill {
        color: Color,
        outline: Outline,
    },
    SimpleMarker {
        color: Color,
        /// Marker diameter in points.
        size: f32,
        outline: Outline,
    },
}

impl Symbol {
    pub fn color(&self) -> Color {
        match self {
            Symbol::SimpleFill { color, .. } | Symbol::SimpleMarker { color, .. } => *color,
        }
    }

    /// Marker size, if the symbol has one.
    pub fn size(&self) -> Option<f32> {
        match self {
            Symbol::SimpleMarker { size, .. } => Some(*size),
            Symbol::SimpleFill { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakInfo {
    pub min_value: f64,
    pub max_value: f64,
    pub symbol: Symbol,
}

/// Maps a data value onto a symbol size, linearly between the data bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariable {
    pub field: String,
    pub min_data_value: f64,
    pub max_data_value: f64,
    pub min_size: f32,
    pub max_size: f32,
}

impl SizeVariable {
    /// Values at or below `min_data_value` get `min_size`, at or above
    /// `max_data_value` get `max_size`.
    pub fn size_for(&self, value: f64) -> f32 {
        let span = self.max_data_value - self.min_data_value;
        if span <= 0.0 || value <= self.min_data_value {
            return self.min_size;
        }
        if value >= self.max_data_value {
            return self.max_size;
        }
        let t = ((value - self.min_data_value) / span) as f32;
        self.min_size + t * (self.max_size - self.min_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VisualVariable {
    Size(SizeVariable),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreaksRenderer {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_fill_symbol: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_symbol: Option<Symbol>,
    pub class_break_infos: Vec<ClassBreakInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visual_variables: Vec<VisualVariable>,
}

impl ClassBreaksRenderer {
    /// The first break includes its lower bound; later breaks cover
    /// `(min_value, max_value]`.
    pub fn symbol_for(&self, value: f64) -> Option<&Symbol> {
        for (i, info) in self.class_break_infos.iter().enumerate() {
            let above_min = if i == 0 {
                value >= info.min_value
            } else {
                value > info.min_value
            };
            if above_min && value <= info.max_value {
                return Some(&info.symbol);
            }
        }
        self.default_symbol.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Renderer {
    Simple { symbol: Symbol },
    ClassBreaks(ClassBreaksRenderer),
}

/// Symbol chosen for one feature, with visual variables applied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolvedSymbol {
    pub symbol: Symbol,
    pub size: Option<f32>,
}

impl Renderer {
    /// Color of the renderer's main symbol: the simple symbol, or the first
    /// class break.
    pub fn primary_color(&self) -> Option<Color> {
        match self {
            Renderer::Simple { symbol } => Some(symbol.color()),
            Renderer::ClassBreaks(r) => r
                .class_break_infos
                .first()
                .map(|info| info.symbol.color())
                .or_else(|| r.default_symbol.map(|s| s.color())),
        }
    }

    /// Features without a usable value for the renderer's field fall back to
    /// the default symbol, or draw nothing.
    pub fn symbolize(&self, feature: &Feature) -> Option<ResolvedSymbol> {
        match self {
            Renderer::Simple { symbol } => Some(ResolvedSymbol {
                symbol: *symbol,
                size: symbol.size(),
            }),
            Renderer::ClassBreaks(r) => {
                let Some(value) = feature.numeric(&r.field) else {
                    return r.default_symbol.map(|symbol| ResolvedSymbol {
                        symbol,
                        size: symbol.size(),
                    });
                };
                let symbol = *r.symbol_for(value)?;
                let mut size = symbol.size();
                for vv in &r.visual_variables {
                    let VisualVariable::Size(sv) = vv;
                    if let Some(v) = feature.numeric(&sv.field) {
                        size = Some(sv.size_for(v));
                    }
                }
                Some(ResolvedSymbol { symbol, size })
            }
        }
    }
}
