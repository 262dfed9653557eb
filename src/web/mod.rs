use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::error::PredictError;
use crate::model::{display_pair, predict_winner, ModelStore};
use crate::stats::{derive_four_factors, BoxScore, FourFactors};

mod pages;

use pages::{render_about, render_predict, Outcome, SubmittedForm};

pub struct AppState {
    pub model: ModelStore,
}

/// Build the Axum router for the prediction form and JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).post(box_score_handler))
        .route("/predict", get(predict_form_handler).post(box_score_handler))
        .route("/fourfactors_predict", post(four_factors_handler))
        .route("/about", get(about_handler))
        .route("/health", get(health_handler))
        .route("/api/predict", post(api_predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn status_for(err: &PredictError) -> StatusCode {
    match err {
        e if e.is_malformed_input() => StatusCode::BAD_REQUEST,
        PredictError::UndefinedRatio { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(err: &PredictError) {
    if status_for(err).is_server_error() {
        let mut chain = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        error!("Prediction failed: {}", chain);
    } else {
        warn!("Rejected prediction request: {}", err);
    }
}

/// GET / → the form lives at /predict
async fn index_handler() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/predict")])
}

/// GET /predict
async fn predict_form_handler() -> Html<String> {
    Html(render_predict(None, None))
}

/// GET /about
async fn about_handler() -> Html<String> {
    Html(render_about())
}

fn form_response(
    form: SubmittedForm,
    fields: &HashMap<String, String>,
    result: Result<(String, f64), PredictError>,
) -> Response {
    match result {
        Ok((label, probability)) => {
            let page = render_predict(
                Some((form, fields)),
                Some(Outcome::Predicted { label, probability }),
            );
            Html(page).into_response()
        }
        Err(e) => {
            log_failure(&e);
            let page = render_predict(Some((form, fields)), Some(Outcome::Failed(e.to_string())));
            (status_for(&e), Html(page)).into_response()
        }
    }
}

/// POST /predict (and POST /) with the sixteen box score counters
async fn box_score_handler(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let result = BoxScore::from_fields(&fields)
        .and_then(|score| derive_four_factors(&score))
        .and_then(|factors| display_pair(predict_winner(&state.model, &factors)));
    form_response(SubmittedForm::BoxScore, &fields, result)
}

/// POST /fourfactors_predict with the eight factors already computed
async fn four_factors_handler(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let result = FourFactors::from_fields(&fields)
        .and_then(|factors| display_pair(predict_winner(&state.model, &factors)));
    form_response(SubmittedForm::FourFactors, &fields, result)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    model_path: String,
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.model.is_loaded(),
        model_path: state.model.path().display().to_string(),
    })
}

#[derive(Debug, Serialize)]
struct ApiPrediction {
    /// "Home team", "Away team", or the missing-model message
    winner: String,
    /// -1 when no model is available
    probability: f64,
    model_available: bool,
    four_factors: FourFactors,
    predicted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        log_failure(&err);
        Self {
            status: status_for(&err),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// POST /api/predict with a flat JSON box score
async fn api_predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BoxScore>, JsonRejection>,
) -> Result<Json<ApiPrediction>, ApiError> {
    let Json(score) = payload.map_err(|rejection| {
        warn!("Rejected JSON box score: {}", rejection.body_text());
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    })?;
    score.validate()?;
    let four_factors = derive_four_factors(&score)?;
    let prediction = predict_winner(&state.model, &four_factors);
    let model_available = !matches!(prediction, Err(PredictError::ModelUnavailable { .. }));
    let (winner, probability) = display_pair(prediction)?;
    Ok(Json(ApiPrediction {
        winner,
        probability,
        model_available,
        four_factors,
        predicted_at: Utc::now(),
    }))
}
