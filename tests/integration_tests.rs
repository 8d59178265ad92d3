//! Integration tests for the QuickWeather HTTP surface

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use quickweather::api::WeatherPage;
use quickweather::config::WeatherConfig;
use quickweather::{AppState, MemorySessionStore, WeatherService, web};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_city(server: &MockServer, name: &str, latitude: f64, longitude: f64) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"name": name, "latitude": latitude, "longitude": longitude, "country": "Russia"}]
        })))
        .mount(server)
        .await;
}

async fn mock_forecast(server: &MockServer) {
    let time: Vec<String> = (0..24).map(|h| format!("2024-01-01T{h:02}:00")).collect();
    let temps: Vec<f64> = (0..24).map(|h| -5.0 + f64::from(h)).collect();
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hourly": {"time": time, "temperature_2m": temps}
        })))
        .mount(server)
        .await;
}

fn app_for(server: &MockServer) -> axum::Router {
    let settings = WeatherConfig {
        geocoding_url: format!("{}/v1/search", server.uri()),
        forecast_url: format!("{}/v1/forecast", server.uri()),
        max_retries: 0,
        ..WeatherConfig::default()
    };
    let weather = WeatherService::new(settings).unwrap();
    web::app(AppState::new(weather, Arc::new(MemorySessionStore::new())))
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("new session sets a cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn read_page(response: Response) -> WeatherPage {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn lookup(city: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = format!("city={}", city.replace(' ', "+"));
    builder.body(Body::from(body)).unwrap()
}

/// A plain page view performs no lookup and starts a session
#[tokio::test]
async fn test_page_view_without_city() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cookie.to_str().unwrap().contains("Max-Age=1209600"));
    let page = read_page(response).await;
    assert!(page.weather_data.is_none());
    assert!(page.error.is_none());
    assert!(page.history.is_empty());
}

/// A successful lookup returns rows and records the city
#[tokio::test]
async fn test_lookup_records_history() {
    let server = MockServer::start().await;
    mock_city(&server, "Moscow", 55.75, 37.62).await;
    mock_forecast(&server).await;
    let app = app_for(&server);

    let response = app.oneshot(lookup("Moscow", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = read_page(response).await;
    let rows = page.weather_data.unwrap();
    assert_eq!(rows.len(), 24);
    assert_eq!(rows[0].time, "00:00");
    assert_eq!(rows[0].temperature, -5.0);
    assert_eq!(page.history.len(), 1);
    assert_eq!(page.history[0].city, "Moscow");
}

/// The query-string form works like the POSTed one and trims input
#[tokio::test]
async fn test_lookup_via_query_string() {
    let server = MockServer::start().await;
    mock_city(&server, "Moscow", 55.75, 37.62).await;
    mock_forecast(&server).await;
    let app = app_for(&server);

    let response = app
        .oneshot(
            Request::get("/?city=%20%20Moscow%20")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let page = read_page(response).await;
    assert!(page.weather_data.is_some());
    assert_eq!(page.history[0].city, "Moscow");
}

/// History survives across requests in the same session and deduplicates
#[tokio::test]
async fn test_history_persists_within_session() {
    let server = MockServer::start().await;
    mock_city(&server, "Moscow", 55.75, 37.62).await;
    mock_city(&server, "moscow", 55.75, 37.62).await;
    mock_city(&server, "Kazan", 55.79, 49.12).await;
    mock_forecast(&server).await;
    let app = app_for(&server);

    let first = app.clone().oneshot(lookup("Moscow", None)).await.unwrap();
    let cookie = session_cookie(&first);

    app.clone()
        .oneshot(lookup("Kazan", Some(&cookie)))
        .await
        .unwrap();
    let third = app
        .clone()
        .oneshot(lookup("moscow", Some(&cookie)))
        .await
        .unwrap();

    assert!(!third.headers().contains_key(header::SET_COOKIE));
    let page = read_page(third).await;
    let cities: Vec<&str> = page.history.iter().map(|e| e.city.as_str()).collect();
    assert_eq!(cities, vec!["Kazan", "Moscow"]);

    // Another session sees nothing
    let other = app.oneshot(lookup("Kazan", None)).await.unwrap();
    let page = read_page(other).await;
    assert_eq!(page.history.len(), 1);
}

/// An unknown city is reported and does not touch history
#[tokio::test]
async fn test_unknown_city_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let response = app.oneshot(lookup("Атлантида", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = read_page(response).await;
    assert!(page.weather_data.is_none());
    assert_eq!(page.error.as_deref(), Some("City 'Атлантида' not found"));
    assert!(page.history.is_empty());
}

/// A failing provider is distinguished from a missing city
#[tokio::test]
async fn test_provider_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let response = app.oneshot(lookup("Moscow", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let page = read_page(response).await;
    let error = page.error.unwrap();
    assert!(!error.contains("not found"));
    assert!(page.history.is_empty());
}

/// A forecast with an unexpected shape fails the request
#[tokio::test]
async fn test_malformed_forecast_is_bad_gateway() {
    let server = MockServer::start().await;
    mock_city(&server, "Moscow", 55.75, 37.62).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"daily": {}})))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let response = app.oneshot(lookup("Moscow", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let page = read_page(response).await;
    assert!(page.weather_data.is_none());
    assert!(page.history.is_empty());
}

/// Blank input is rejected before any provider call
#[tokio::test]
async fn test_blank_city_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app_for(&server);

    let response = app.oneshot(lookup("   ", None)).await.unwrap();

    let page = read_page(response).await;
    assert_eq!(page.error.as_deref(), Some("Please enter a city name"));
}

/// Clearing history redirects home and empties the session's list
#[tokio::test]
async fn test_clear_history() {
    let server = MockServer::start().await;
    mock_city(&server, "Moscow", 55.75, 37.62).await;
    mock_forecast(&server).await;
    let app = app_for(&server);

    let first = app.clone().oneshot(lookup("Moscow", None)).await.unwrap();
    let cookie = session_cookie(&first);

    let cleared = app
        .clone()
        .oneshot(
            Request::post("/clear-history/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cleared.status(), StatusCode::SEE_OTHER);
    assert_eq!(cleared.headers().get(header::LOCATION).unwrap(), "/");

    let page_view = app
        .oneshot(
            Request::get("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let page = read_page(page_view).await;
    assert!(page.history.is_empty());
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
