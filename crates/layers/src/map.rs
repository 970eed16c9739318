use std::path::Path;

use foundation::{Color, Extent, MapPoint, SpatialReference};
use serde::{Deserialize, Serialize};

use crate::layer::{FeatureLayerConfig, Layer, LayerId};
use crate::popup::{FieldFormat, FieldInfo, PopupTemplate};
use crate::symbology::{
    ClassBreakInfo, ClassBreaksRenderer, Outline, Renderer, SizeVariable, Symbol, VisualVariable,
};

/// Camera placement of the initial view.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewpoint {
    pub rotation: f64,
    pub scale: f64,
    pub target_geometry: MapPoint,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightOptions {
    pub fill_opacity: f32,
    pub halo_color: Color,
    pub color: Color,
}

/// Navigation limits of the view.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConstraints {
    /// Largest (most zoomed-out) scale the view may reach.
    pub min_scale: f64,
    pub geometry: Extent,
}

impl ViewConstraints {
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if self.min_scale > 0.0 {
            scale.min(self.min_scale)
        } else {
            scale
        }
    }

    pub fn contains(&self, point: &MapPoint) -> bool {
        self.geometry.contains(point)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub spatial_reference: SpatialReference,
    pub viewpoint: Viewpoint,
    pub highlight_options: HighlightOptions,
    pub constraints: ViewConstraints,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPlacement {
    pub element: String,
    pub position: UiPosition,
}

/// Static text and placement of the page's overlay panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    pub panel_title: String,
    pub placements: Vec<UiPlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basemap {
    pub base_layers: Vec<FeatureLayerConfig>,
}

/// Everything a map client needs to draw the page, minus the data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub basemap: Basemap,
    pub layers: Vec<FeatureLayerConfig>,
    pub view: ViewConfig,
    pub ui: UiConfig,
}

#[derive(Debug)]
pub enum MapConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for MapConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapConfigError::Io(msg) => write!(f, "map config read failed: {msg}"),
            MapConfigError::Parse(msg) => write!(f, "map config invalid: {msg}"),
        }
    }
}

impl std::error::Error for MapConfigError {}

pub const POPULATION_FIELD: &str = "pobtot";

const POPULATION_LAYER_ID: u64 = 1;
const BASEMAP_LAYER_ID: u64 = 100;

impl MapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, MapConfigError> {
        serde_json::from_str(payload).map_err(|e| MapConfigError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path)
            .map_err(|e| MapConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&payload)
    }

    pub fn layer(&self, id: LayerId) -> Option<&FeatureLayerConfig> {
        self.layers
            .iter()
            .chain(self.basemap.base_layers.iter())
            .find(|l| l.id() == id)
    }

    /// The thematic layer: the first operational layer.
    pub fn primary_layer(&self) -> Option<&FeatureLayerConfig> {
        self.layers.first()
    }

    /// Color shared by the thematic symbols, the highlight and the histogram bars.
    pub fn layer_color(&self) -> Color {
        self.primary_layer()
            .and_then(|l| l.renderer.primary_color())
            .unwrap_or(self.view.highlight_options.color)
    }

    /// Municipal population, Mexico 2020 census.
    pub fn population_2020() -> Self {
        let sr = SpatialReference::MEXICO_ITRF2008_LCC;
        let layer_color = Color::rgba(221, 68, 65, 0.8);

        let mut population = FeatureLayerConfig::new(
            POPULATION_LAYER_ID,
            "5f4d25bbc83e440c98585f3feb179a0c",
            Renderer::ClassBreaks(ClassBreaksRenderer {
                field: POPULATION_FIELD.to_string(),
                background_fill_symbol: Some(Symbol::SimpleFill {
                    color: Color::rgb(240, 240, 240),
                    outline: Outline::new(0.3, Color::rgba(200, 200, 200, 0.5)),
                }),
                default_symbol: None,
                class_break_infos: vec![ClassBreakInfo {
                    min_value: -99_999_999_999.0,
                    max_value: 99_999_999_999.0,
                    symbol: Symbol::SimpleMarker {
                        color: layer_color,
                        size: 3.0,
                        outline: Outline::new(0.5, Color::rgba(255, 255, 255, 0.5)),
                    },
                }],
                visual_variables: vec![VisualVariable::Size(SizeVariable {
                    field: POPULATION_FIELD.to_string(),
                    min_data_value: 10_000.0,
                    max_data_value: 2_000_000.0,
                    min_size: 3.0,
                    max_size: 40.0,
                })],
            }),
        );
        population.effect = Some("drop-shadow(2px 2px 2px gray)".to_string());
        population.popup_template = Some(PopupTemplate {
            title: "{nom_mun}, {nom_ent}".to_string(),
            content: "Population: {pobtot}".to_string(),
            field_infos: vec![FieldInfo {
                field_name: POPULATION_FIELD.to_string(),
                format: Some(FieldFormat {
                    places: 0,
                    digit_separator: true,
                }),
            }],
        });

        let mut states = FeatureLayerConfig::new(
            BASEMAP_LAYER_ID,
            "2b93b06dc0dc4e809d3c8db5cb96ba69",
            Renderer::Simple {
                symbol: Symbol::SimpleFill {
                    color: Color::rgb(225, 225, 225),
                    outline: Outline::new(0.5, Color::WHITE),
                },
            },
        );
        states.effect = Some("drop-shadow(0px 0px 15px #cae7f1)".to_string());
        states.legend_enabled = false;
        states.popup_enabled = false;

        Self {
            basemap: Basemap {
                base_layers: vec![states],
            },
            layers: vec![population],
            view: ViewConfig {
                spatial_reference: sr,
                viewpoint: Viewpoint {
                    rotation: 0.0,
                    scale: 11_443_105.0,
                    target_geometry: MapPoint::new(770_969.148_919_984_2, 2_692_494.794_299_978_3, sr),
                },
                highlight_options: HighlightOptions {
                    fill_opacity: 0.1,
                    halo_color: layer_color,
                    color: layer_color,
                },
                constraints: ViewConstraints {
                    min_scale: 11_443_105.0,
                    geometry: Extent::new(-1_464_958.0, 1_654_007.0, 3_006_896.0, 3_730_982.0, sr),
                },
            },
            ui: UiConfig {
                title: "Total Population".to_string(),
                subtitle: "Censo Mexico 2020".to_string(),
                panel_title: "Population".to_string(),
                placements: vec![
                    UiPlacement {
                        element: "containerDiv".to_string(),
                        position: UiPosition::BottomLeft,
                    },
                    UiPlacement {
                        element: "titleDiv".to_string(),
                        position: UiPosition::TopRight,
                    },
                ],
            },
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::population_2020()
    }
}
