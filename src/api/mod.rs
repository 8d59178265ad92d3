use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    error::WeatherError,
    form::CityForm,
    history,
    models::{ForecastRow, HistoryEntry},
    session::{SessionId, SessionStore},
    weather::WeatherService,
};

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(weather: WeatherService, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            weather: Arc::new(weather),
            sessions,
        }
    }
}

/// Body of the weather view
#[derive(Debug, Serialize, Deserialize)]
pub struct WeatherPage {
    pub weather_data: Option<Vec<ForecastRow>>,
    pub error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(weather_query).post(weather_form))
        .route("/clear-history/", get(clear_history).post(clear_history))
        .route("/health", get(health))
        .with_state(state)
}

async fn weather_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(form): Query<CityForm>,
) -> Response {
    weather_view(&state, &headers, form).await
}

async fn weather_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CityForm>,
) -> Response {
    weather_view(&state, &headers, form).await
}

async fn weather_view(state: &AppState, headers: &HeaderMap, form: CityForm) -> Response {
    let (session, is_new_session) = match SessionId::from_headers(headers) {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };

    let mut history = history::load(state.sessions.as_ref(), &session).await;
    let mut status = StatusCode::OK;
    let mut page = WeatherPage {
        weather_data: None,
        error: None,
        history: Vec::new(),
    };

    if form.is_submitted() {
        match form.clean() {
            Err(e) => page.error = Some(e.to_string()),
            Ok(city) => match state.weather.get_weather_by_city(&city).await {
                Ok(rows) => {
                    history = history::record_lookup(history, &city, Local::now().naive_local());
                    history::save(state.sessions.as_ref(), &session, &history).await;
                    page.weather_data = Some(rows);
                }
                Err(e) => {
                    status = lookup_failure_status(&city, &e);
                    page.error = Some(e.user_message());
                }
            },
        }
    }

    page.history = history;

    let mut response = (status, Json(page)).into_response();
    if is_new_session {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, session.to_cookie(state.sessions.max_age()));
    }
    response
}

fn lookup_failure_status(city: &str, err: &WeatherError) -> StatusCode {
    match err {
        WeatherError::CityNotFound { .. } => {
            info!("Lookup for '{}' found no city", city);
            StatusCode::OK
        }
        WeatherError::Provider { .. } | WeatherError::Cache { .. } => {
            warn!("Lookup for '{}' failed: {}", city, err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        WeatherError::MalformedResponse { .. } => {
            error!("Lookup for '{}' failed: {}", city, err);
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn clear_history(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(session) = SessionId::from_headers(&headers) {
        history::remove(state.sessions.as_ref(), &session).await;
        info!("Cleared search history for session {}", session);
    }
    Redirect::to("/")
}

async fn health() -> &'static str {
    "ok"
}
