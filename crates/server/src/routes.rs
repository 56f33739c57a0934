//! Routes under `/api/v1/jobs`.

use crate::response::{ApiError, Envelope};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::Method;
use axum::routing::get;
use nearjobs::JobStore;
use nearjobs::compute::validation::{validate_latitude, validate_longitude, validate_radius_km};
use nearjobs_types::{GeoPoint, Job};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

type Params = Query<HashMap<String, String>>;

/// The full application router.
pub fn router(store: Arc<JobStore>) -> Router {
    let jobs = Router::new()
        .route("/available", get(available).fallback(method_not_allowed))
        .route("/nearby", get(nearby).fallback(method_not_allowed))
        .route(
            "/top-jobs/around-me",
            get(top_jobs_around_me).fallback(method_not_allowed),
        );

    Router::new()
        .nest("/api/v1/jobs", jobs)
        .fallback(not_found)
        .with_state(store)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn run_server(
    listener: tokio::net::TcpListener,
    store: Arc<JobStore>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("NearJobs HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn available(
    State(store): State<Arc<JobStore>>,
) -> Result<Envelope<impl serde::Serialize>, ApiError> {
    let jobs = blocking(move || store.title_jobs()).await?;
    Ok(Envelope::ok("Available jobs", jobs))
}

async fn nearby(
    State(store): State<Arc<JobStore>>,
    Query(params): Params,
) -> Result<Envelope<Vec<Job>>, ApiError> {
    let mut errors = BTreeMap::new();
    let center = parse_center(&params, &mut errors);
    let radius = parse_field(&params, "radius", &mut errors, validate_radius_km);

    let (Some(center), Some(radius)) = (center, radius) else {
        return Err(ApiError::FailedValidation(errors));
    };
    let jobs = blocking(move || store.find_jobs_nearby(center, radius)).await?;
    Ok(Envelope::ok("Jobs around you", jobs))
}

async fn top_jobs_around_me(
    State(store): State<Arc<JobStore>>,
    Query(params): Params,
) -> Result<Envelope<Vec<Job>>, ApiError> {
    let mut errors = BTreeMap::new();
    let center = parse_center(&params, &mut errors);
    let title = params
        .get("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if title.is_none() {
        errors.insert("title".to_string(), "title is not a valid text".to_string());
    }

    let (Some(center), Some(title)) = (center, title) else {
        return Err(ApiError::FailedValidation(errors));
    };
    let message = format!("Top {} Jobs around you", title);
    let jobs = blocking(move || store.top_jobs_around(&title, center)).await?;
    Ok(Envelope::ok(message, jobs))
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Index reads take a blocking lock, so they run off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {}", e)))
}

fn parse_center(
    params: &HashMap<String, String>,
    errors: &mut BTreeMap<String, String>,
) -> Option<GeoPoint> {
    let latitude = parse_field(params, "latitude", errors, validate_latitude);
    let longitude = parse_field(params, "longitude", errors, validate_longitude);
    Some(GeoPoint::new(longitude?, latitude?))
}

/// Parse `name` as a float and run `validate` on it, recording any problem
/// under `name` in `errors`.
fn parse_field(
    params: &HashMap<String, String>,
    name: &str,
    errors: &mut BTreeMap<String, String>,
    validate: fn(f64) -> nearjobs::Result<()>,
) -> Option<f64> {
    let parsed = params.get(name).and_then(|raw| raw.trim().parse::<f64>().ok());
    let Some(value) = parsed else {
        errors.insert(
            name.to_string(),
            format!("{} not a valid decimal/float", name),
        );
        return None;
    };

    match validate(value) {
        Ok(()) => Some(value),
        Err(e) => {
            errors.insert(name.to_string(), e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_center_collects_every_bad_field() {
        let mut errors = BTreeMap::new();
        let center = parse_center(&params(&[("latitude", "abc")]), &mut errors);
        assert!(center.is_none());
        assert_eq!(errors["latitude"], "latitude not a valid decimal/float");
        assert_eq!(errors["longitude"], "longitude not a valid decimal/float");
    }

    #[test]
    fn test_parse_center_range_checks() {
        let mut errors = BTreeMap::new();
        let center = parse_center(
            &params(&[("latitude", "91"), ("longitude", "3.4")]),
            &mut errors,
        );
        assert!(center.is_none());
        assert!(errors["latitude"].contains("out of range"));
        assert!(!errors.contains_key("longitude"));
    }

    #[test]
    fn test_parse_center_ok() {
        let mut errors = BTreeMap::new();
        let center = parse_center(
            &params(&[("latitude", " 6.52 "), ("longitude", "3.38")]),
            &mut errors,
        );
        assert_eq!(center, Some(GeoPoint::new(3.38, 6.52)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut errors = BTreeMap::new();
        let radius = parse_field(
            &params(&[("radius", "-1")]),
            "radius",
            &mut errors,
            validate_radius_km,
        );
        assert!(radius.is_none());
        assert!(errors.contains_key("radius"));
    }
}
