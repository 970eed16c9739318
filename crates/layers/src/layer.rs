use serde::{Deserialize, Serialize};

use crate::popup::PopupTemplate;
use crate::symbology::Renderer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// Hosted item the layer's features come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalItem {
    pub id: String,
}

/// Styling and interaction settings of one feature layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLayerConfig {
    pub id: LayerId,
    pub portal_item: PortalItem,
    /// CSS-style filter effect applied when drawing the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default = "enabled")]
    pub legend_enabled: bool,
    #[serde(default = "enabled")]
    pub popup_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_template: Option<PopupTemplate>,
    pub renderer: Renderer,
}

fn enabled() -> bool {
    true
}

impl FeatureLayerConfig {
    pub fn new(id: u64, portal_item_id: impl Into<String>, renderer: Renderer) -> Self {
        Self {
            id: LayerId(id),
            portal_item: PortalItem {
                id: portal_item_id.into(),
            },
            effect: None,
            legend_enabled: true,
            popup_enabled: true,
            popup_template: None,
            renderer,
        }
    }

    /// Popup template, if popups are enabled for this layer.
    pub fn active_popup(&self) -> Option<&PopupTemplate> {
        if !self.popup_enabled {
            return None;
        }
        self.popup_template.as_ref()
    }
}

impl Layer for FeatureLayerConfig {
    fn id(&self) -> LayerId {
        self.id
    }
}
