//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, Request, header::CONTENT_TYPE},
    routing::{get, post},
};
use inflow_bench::BenchWriterHandle;
use inflow_config::AppConfig;
use inflow_telemetry::{Metrics, ResourceProbe, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::health::{health, metrics};
use crate::http::telemetry::HttpMetricsLayer;
use crate::http::upload::upload;
use crate::state::ApiState;

const HEADER_REQUEST_ID: &str = "x-request-id";

/// Axum router wrapper that hosts the inflow API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API server with shared dependencies wired through
    /// application state.
    #[must_use]
    pub fn new(
        config: AppConfig,
        telemetry: Metrics,
        probe: Arc<dyn ResourceProbe>,
        bench: BenchWriterHandle,
    ) -> Self {
        let state = Arc::new(ApiState::new(config, telemetry.clone(), probe, bench));

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(inflow_telemetry::propagate_request_id_layer())
            .layer(inflow_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route(
                "/upload",
                post(upload).layer(DefaultBodyLimit::disable()),
            )
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Serve the API using the configured router on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        tracing::info!(addr = %addr, "starting api listener");
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use axum::body::Body;
    use axum::http::StatusCode;
    use inflow_bench::BenchWriter;
    use inflow_telemetry::SystemProbe;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "inflow-test-boundary";

    fn multipart_body(field_name: &str, contents: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"{field_name}\"; filename=\"payload.bin\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(dest: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let uri = dest.map_or_else(
            || "/upload".to_string(),
            |dest| format!("/upload?dest={dest}"),
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request builds")
    }

    fn test_server(temp: &TempDir) -> (Router, PathBuf) {
        let bench_path = temp.path().join("benchmark.txt");
        let config = AppConfig {
            bench_log_path: bench_path.clone(),
            sample_interval: Duration::from_millis(10),
            ..AppConfig::default()
        };
        let telemetry = Metrics::new().expect("metrics registry");
        let probe: Arc<dyn ResourceProbe> = Arc::new(SystemProbe::new());
        let (bench, _writer) = BenchWriter::spawn(bench_path.clone(), 64, telemetry.clone());
        let server = ApiServer::new(config, telemetry, probe, bench);
        (server.router().clone(), bench_path)
    }

    async fn response_json(response: axum::response::Response) -> Result<serde_json::Value> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn bench_lines(path: &Path, expected: usize) -> Vec<String> {
        for _ in 0..200 {
            if let Ok(contents) = tokio::fs::read_to_string(path).await {
                let lines: Vec<String> = contents.lines().map(ToOwned::to_owned).collect();
                if lines.len() >= expected {
                    return lines;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::fs::read_to_string(path)
            .await
            .map(|contents| contents.lines().map(ToOwned::to_owned).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn upload_streams_bytes_and_reports_size() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);
        let dest = temp.path().join("nested").join("dirs").join("payload.bin");
        let contents = vec![0xA5_u8; 64 * 1024];

        let response = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", &contents),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await?;
        assert_eq!(json["status"], "success");
        assert_eq!(json["size"], 64 * 1024);
        assert_eq!(json["destination"], dest.display().to_string());
        assert!(json["transfer_rate"].as_str().is_some_and(|rate| rate.ends_with(" MB/s")));
        assert!(json["memory_used_mb"].as_str().is_some_and(|mem| mem.ends_with(" MB")));
        assert!(json["cpu_usage"].as_str().is_some_and(|cpu| cpu.ends_with('%')));

        assert_eq!(tokio::fs::read(&dest).await?, contents);

        let lines = bench_lines(&bench_path, 1).await;
        assert_eq!(lines.len(), 1, "exactly one benchmark line per upload");
        assert!(lines[0].contains("Size: 65536 bytes"));
        assert!(lines[0].contains(", Tasks: "));
        Ok(())
    }

    #[tokio::test]
    async fn missing_dest_is_rejected_without_side_effects() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);

        let response = router
            .oneshot(upload_request(None, multipart_body("file", b"data")))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await?;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|message| message.contains("destination path is required"))
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(
            !bench_path.exists(),
            "failed uploads must not append benchmark lines"
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);
        let dest = temp.path().join("never-written.bin");

        let response = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("document", b"data"),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await?;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|message| message.contains("failed to get file"))
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!bench_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn parent_path_through_a_file_is_a_server_error() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);
        let obstruction = temp.path().join("occupied");
        tokio::fs::write(&obstruction, b"file").await?;
        let dest = obstruction.join("inner.bin");

        let response = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", b"data"),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = response_json(response).await?;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|message| message.contains("failed to create directory"))
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!bench_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn zero_byte_upload_reports_finite_rate() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);
        let dest = temp.path().join("empty.dat");

        let response = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", b""),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await?;
        assert_eq!(json["size"], 0);
        let rate = json["transfer_rate"].as_str().expect("rate string");
        assert!(!rate.contains("NaN"));
        assert!(!rate.contains("inf"));

        assert_eq!(tokio::fs::metadata(&dest).await?.len(), 0);
        assert_eq!(bench_lines(&bench_path, 1).await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn second_upload_silently_overwrites() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, bench_path) = test_server(&temp);
        let dest = temp.path().join("payload.bin");

        let first = router
            .clone()
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", b"first version, the longer one"),
            ))
            .await?;
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", b"second"),
            ))
            .await?;
        assert_eq!(second.status(), StatusCode::OK);

        assert_eq!(tokio::fs::read(&dest).await?, b"second");
        assert_eq!(bench_lines(&bench_path, 2).await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn five_mebibyte_upload_reports_exact_size() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, _bench_path) = test_server(&temp);
        let dest = temp.path().join("large.bin");
        let contents = vec![0x42_u8; 5 * 1024 * 1024];

        let response = router
            .oneshot(upload_request(
                Some(&dest.display().to_string()),
                multipart_body("file", &contents),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await?;
        assert_eq!(json["size"], 5_242_880);
        assert!(json["duration_ms"].as_u64().is_some());
        assert_eq!(tokio::fs::metadata(&dest).await?.len(), 5_242_880);
        Ok(())
    }

    #[tokio::test]
    async fn health_and_metrics_endpoints_respond() -> Result<()> {
        let temp = TempDir::new()?;
        let (router, _bench_path) = test_server(&temp);

        let health = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(health.status(), StatusCode::OK);
        let json = response_json(health).await?;
        assert_eq!(json["status"], "ok");

        let metrics = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
            .await?;
        assert_eq!(metrics.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(metrics.into_body(), usize::MAX).await?;
        let rendered = String::from_utf8(bytes.to_vec())?;
        assert!(rendered.contains("http_requests_total"));
        Ok(())
    }
}
