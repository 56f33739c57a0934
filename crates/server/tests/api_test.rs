use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use nearjobs::{Config, GeoPoint, Job, JobStore};
use nearjobs_server::router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn store() -> Arc<JobStore> {
    let jobs = vec![
        Job::new("Chef", GeoPoint::new(3.3792, 6.5244)),
        Job::new("chef", GeoPoint::new(3.3800, 6.5250)),
        Job::new("Driver", GeoPoint::new(3.3795, 6.5246)),
        Job::new("Chef", GeoPoint::new(3.9000, 7.3800)),
    ];
    Arc::new(JobStore::from_jobs(jobs, Config::default()).unwrap())
}

async fn call(method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router(store()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_available_jobs() {
    let (status, body) = call("GET", "/api/v1/jobs/available").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["message"], "Available jobs");
    assert_eq!(body["data"]["chef"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["data"]["driver"][0],
        json!({"title": "Driver", "location": {"longitude": 3.3795, "latitude": 6.5246}})
    );
}

#[tokio::test]
async fn test_nearby_jobs() {
    let (status, body) = call(
        "GET",
        "/api/v1/jobs/nearby?latitude=6.5244&longitude=3.3792&radius=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Jobs around you");
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_nearby_zero_radius_uses_default() {
    let (status, body) = call(
        "GET",
        "/api/v1/jobs/nearby?latitude=6.5244&longitude=3.3792&radius=0",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_nearby_empty_result_is_an_empty_list() {
    let (status, body) = call("GET", "/api/v1/jobs/nearby?latitude=-40&longitude=170&radius=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_nearby_validation() {
    let (status, body) = call("GET", "/api/v1/jobs/nearby?latitude=abc&longitude=3.4").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], false);
    assert_eq!(body["message"], "failed validation");
    assert_eq!(body["errors"]["latitude"], "latitude not a valid decimal/float");
    assert_eq!(body["errors"]["radius"], "radius not a valid decimal/float");
    assert!(body["errors"].get("longitude").is_none());
}

#[tokio::test]
async fn test_nearby_out_of_range() {
    let (status, body) = call(
        "GET",
        "/api/v1/jobs/nearby?latitude=6.5&longitude=181&radius=5",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["longitude"].is_string());
}

#[tokio::test]
async fn test_top_jobs_around_me() {
    let (status, body) = call(
        "GET",
        "/api/v1/jobs/top-jobs/around-me?latitude=6.5244&longitude=3.3792&title=CHEF",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Top CHEF Jobs around you");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["location"]["longitude"], 3.3792);
    assert_eq!(data[1]["location"]["longitude"], 3.38);
}

#[tokio::test]
async fn test_top_jobs_requires_title() {
    let (status, body) = call(
        "GET",
        "/api/v1/jobs/top-jobs/around-me?latitude=6.5244&longitude=3.3792&title=",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["title"], "title is not a valid text");
}

#[tokio::test]
async fn test_unknown_path() {
    let (status, body) = call("GET", "/api/v1/jobs/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "the requested resource could not be found");
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_wrong_method() {
    let (status, body) = call("POST", "/api/v1/jobs/available").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body["message"],
        "the POST method is not supported for this resource"
    );
}

#[tokio::test]
async fn test_server_serves_over_tcp() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(nearjobs_server::run_server(listener, store(), async {
        let _ = rx.await;
    }));

    tx.send(()).ok();
    server.await??;
    Ok(())
}
