use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use compute::NormalizationMode;
use foundation::NumberLocale;
use formats::FeatureTable;
use layers::popup::RenderedPopup;
use layers::MapConfig;
use panel::{Bar, PanelEvent, PanelHandle, PanelSnapshot};
use runtime::{Generation, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

#[derive(Clone)]
pub struct AppState {
    pub map: Arc<MapConfig>,
    pub table: Arc<FeatureTable>,
    pub panel: PanelHandle,
    pub locale: NumberLocale,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeAccepted {
    pub mode: NormalizationMode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarView {
    #[serde(flatten)]
    pub bar: Bar,
    pub min_label: String,
    pub max_label: String,
}

/// Panel state as a client renders it: formatted labels and styled bars.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub title: String,
    pub selected_mode: NormalizationMode,
    pub applied_mode: Option<NormalizationMode>,
    pub generation: Option<Generation>,
    pub min_label: Option<String>,
    pub max_label: Option<String>,
    pub average_label: Option<String>,
    pub bars: Vec<BarView>,
}

impl PanelView {
    fn from_snapshot(title: &str, snapshot: PanelSnapshot) -> Self {
        let display = snapshot.display;
        let (average_label, bars) = match &display.widget {
            Some(widget) => (
                widget.average_label(),
                widget
                    .bars()
                    .into_iter()
                    .map(|bar| BarView {
                        min_label: widget.label(bar.min_value),
                        max_label: widget.label(bar.max_value),
                        bar,
                    })
                    .collect(),
            ),
            None => (None, Vec::new()),
        };
        Self {
            title: title.to_string(),
            selected_mode: snapshot.selected_mode,
            applied_mode: display.mode,
            generation: display.generation,
            min_label: display.min_label,
            max_label: display.max_label,
            average_label,
            bars,
        }
    }
}

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub async fn get_map_config(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=300"),
    );
    (StatusCode::OK, headers, Json(state.map.as_ref().clone())).into_response()
}

pub async fn get_panel(State(state): State<AppState>) -> Json<PanelView> {
    Json(PanelView::from_snapshot(
        &state.map.ui.panel_title,
        state.panel.snapshot(),
    ))
}

pub async fn get_panel_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.panel.snapshot().metrics)
}

pub async fn post_normalization(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ModeAccepted>), ApiError> {
    // Malformed bodies map to 400 with the JSON error shape.
    let Json(body) = payload.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let req: ModeRequest = serde_json::from_value(body).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("invalid request body: {e}"),
        )
    })?;
    let mode: NormalizationMode = req
        .mode
        .parse()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{e}")))?;
    state
        .panel
        .send(PanelEvent::ModeChanged(mode))
        .await
        .map_err(|e| {
            error!("mode change dropped: {e}");
            api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        })?;
    debug!(%mode, "normalization mode changed");
    Ok((StatusCode::ACCEPTED, Json(ModeAccepted { mode })))
}

pub async fn get_feature_popup(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
) -> Result<Json<RenderedPopup>, ApiError> {
    let feature = state.table.get(index).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("feature {index} out of range (0..{})", state.table.len()),
        )
    })?;
    let template = state
        .map
        .primary_layer()
        .and_then(|layer| layer.active_popup())
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "layer has no popup"))?;
    Ok(Json(template.render(feature, &state.locale)))
}
