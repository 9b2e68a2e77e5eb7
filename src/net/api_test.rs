use super::*;
use crate::poll::{Interval, PollConfig, Poller};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

// =========================================================================
// Mock backend
// =========================================================================

const ROUTE: &str = "/api/v1/projects/{project}/flights/{flight}/data_products/{product}";

#[derive(Clone)]
struct Backend {
    /// Status served for each successive request; the last one repeats.
    statuses: Arc<Vec<&'static str>>,
    hits: Arc<AtomicU32>,
    require_token: Option<&'static str>,
    product_id: Uuid,
}

async fn serve_product(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, String) {
    let hit = backend.hits.fetch_add(1, Ordering::SeqCst) as usize;
    if let Some(token) = backend.require_token {
        let expected = format!("Bearer {token}");
        let got = headers.get("authorization").and_then(|v| v.to_str().ok());
        if got != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, r#"{"detail":"Not authenticated"}"#.to_string());
        }
    }
    let status = backend.statuses[hit.min(backend.statuses.len() - 1)];
    let url = (status == "SUCCESS").then_some("https://tiles.example.test/ortho.tif");
    let body = serde_json::json!({
        "id": backend.product_id,
        "data_type": "ortho",
        "status": status,
        "url": url,
    });
    (StatusCode::OK, body.to_string())
}

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn backend_with(statuses: Vec<&'static str>, require_token: Option<&'static str>) -> (String, Backend) {
    let backend = Backend {
        statuses: Arc::new(statuses),
        hits: Arc::new(AtomicU32::new(0)),
        require_token,
        product_id: Uuid::new_v4(),
    };
    let router = Router::new().route(ROUTE, get(serve_product)).with_state(backend.clone());
    (spawn_backend(router).await, backend)
}

fn product_ref(backend: &Backend) -> DataProductRef {
    DataProductRef { project_id: Uuid::new_v4(), flight_id: Uuid::new_v4(), data_product_id: backend.product_id }
}

fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(&ApiConfig::new(base_url)).unwrap()
}

// =========================================================================
// Pure helpers
// =========================================================================

#[test]
fn endpoint_formats_all_ids() {
    let project = Uuid::nil();
    let flight = Uuid::from_u128(1);
    let product = Uuid::from_u128(2);
    assert_eq!(
        data_product_endpoint(project, flight, product),
        format!("/api/v1/projects/{project}/flights/{flight}/data_products/{product}")
    );
}

#[test]
fn parse_data_product_reads_known_status() {
    let json = r#"{"id":"00000000-0000-0000-0000-000000000002","data_type":"dsm","status":"INPROGRESS"}"#;
    let product = parse_data_product(json).unwrap();
    assert_eq!(product.id, Uuid::from_u128(2));
    assert_eq!(product.data_type, "dsm");
    assert_eq!(product.status, JobStatus::InProgress);
    assert!(product.url.is_none());
    assert!(product.flight_id.is_none());
}

#[test]
fn parse_data_product_keeps_unknown_status() {
    let json = r#"{"id":"00000000-0000-0000-0000-000000000002","data_type":"dsm","status":"QUEUED_REMOTE"}"#;
    let product = parse_data_product(json).unwrap();
    assert_eq!(product.status, JobStatus::Other("QUEUED_REMOTE".into()));
    assert_eq!(product.status.to_string(), "QUEUED_REMOTE");
}

#[test]
fn parse_data_product_rejects_garbage() {
    assert!(matches!(parse_data_product("not json"), Err(ApiError::Parse(_))));
}

#[test]
fn job_status_serializes_as_wire_string() {
    assert_eq!(serde_json::to_string(&JobStatus::Success).unwrap(), r#""SUCCESS""#);
    assert_eq!(serde_json::to_string(&JobStatus::InProgress).unwrap(), r#""INPROGRESS""#);
}

#[test]
fn permanent_error_classification() {
    assert!(ApiError::Response { status: 404, body: String::new() }.is_permanent());
    assert!(ApiError::Response { status: 403, body: String::new() }.is_permanent());
    assert!(!ApiError::Response { status: 429, body: String::new() }.is_permanent());
    assert!(!ApiError::Response { status: 503, body: String::new() }.is_permanent());
    assert!(!ApiError::Request("connection refused".into()).is_permanent());
    assert!(ApiError::Parse("eof".into()).is_permanent());
}

// =========================================================================
// ApiClient against a live mock
// =========================================================================

#[tokio::test]
async fn data_product_fetches_and_decodes() {
    let (base_url, backend) = backend_with(vec!["SUCCESS"], None).await;
    let client = client_for(&base_url);

    let product = client.data_product(product_ref(&backend)).await.unwrap();

    assert_eq!(product.id, backend.product_id);
    assert_eq!(product.status, JobStatus::Success);
    assert_eq!(product.url.as_deref(), Some("https://tiles.example.test/ortho.tif"));
}

#[tokio::test]
async fn data_product_unknown_route_is_response_error() {
    let router = Router::new();
    let base_url = spawn_backend(router).await;
    let client = client_for(&base_url);
    let product = DataProductRef { project_id: Uuid::nil(), flight_id: Uuid::nil(), data_product_id: Uuid::nil() };

    let err = client.data_product(product).await.unwrap_err();

    assert!(matches!(err, ApiError::Response { status: 404, .. }), "got {err:?}");
}

#[tokio::test]
async fn data_product_sends_bearer_token() {
    let (base_url, backend) = backend_with(vec!["SUCCESS"], Some("s3cret")).await;

    let anonymous = client_for(&base_url);
    let err = anonymous.data_product(product_ref(&backend)).await.unwrap_err();
    assert!(matches!(err, ApiError::Response { status: 401, .. }));

    let authed = client_for(&base_url).with_token(Some("s3cret".into()));
    assert!(authed.data_product(product_ref(&backend)).await.is_ok());
}

#[tokio::test]
async fn data_product_unreachable_is_request_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(&format!("http://{addr}"));
    let product = DataProductRef { project_id: Uuid::nil(), flight_id: Uuid::nil(), data_product_id: Uuid::nil() };

    let err = client.data_product(product).await.unwrap_err();

    assert!(matches!(err, ApiError::Request(_)), "got {err:?}");
}

// =========================================================================
// DataProductProbe
// =========================================================================

#[tokio::test]
async fn probe_maps_job_states() {
    let (base_url, backend) = backend_with(vec!["INPROGRESS", "FAILED", "SUCCESS"], None).await;
    let probe = DataProductProbe::new(Arc::new(client_for(&base_url)), product_ref(&backend));

    assert!(matches!(probe.probe().await, Err(ProbeError::NotReady(_))));
    assert!(matches!(
        probe.probe().await,
        Err(ProbeError::JobFailed { status: JobStatus::Failed, .. })
    ));
    let product = probe.probe().await.unwrap();
    assert_eq!(product.status, JobStatus::Success);
}

#[tokio::test]
async fn probe_wraps_http_errors() {
    let (base_url, backend) = backend_with(vec!["SUCCESS"], Some("token")).await;
    let probe = DataProductProbe::new(Arc::new(client_for(&base_url)), product_ref(&backend));

    let err = probe.probe().await.unwrap_err();

    assert!(matches!(err, ProbeError::Api(ApiError::Response { status: 401, .. })));
}

#[tokio::test]
async fn poller_waits_for_data_product() {
    let (base_url, backend) = backend_with(vec!["WAITING", "INPROGRESS", "SUCCESS"], None).await;
    let probe = DataProductProbe::new(Arc::new(client_for(&base_url)), product_ref(&backend));

    let result: Arc<Mutex<Option<DataProduct>>> = Arc::default();
    let done = Arc::new(tokio::sync::Notify::new());
    let poller = {
        let result = Arc::clone(&result);
        let done_ok = Arc::clone(&done);
        let done_err = Arc::clone(&done);
        Poller::builder(
            probe,
            move |product: DataProduct| {
                *result.lock().unwrap() = Some(product);
                done_ok.notify_one();
            },
            move |_: &str| done_err.notify_one(),
        )
        .config(
            PollConfig::default()
                .with_max_attempts(5)
                .with_initial_delay(Duration::ZERO)
                .with_interval(Interval::Fixed(Duration::from_millis(5))),
        )
        .build()
    };

    poller.start_polling();
    tokio::time::timeout(Duration::from_secs(10), done.notified()).await.unwrap();

    let product = result.lock().unwrap().clone().expect("success callback fired");
    assert_eq!(product.id, backend.product_id);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 3);
    assert_eq!(poller.attempts(), 2);
}
