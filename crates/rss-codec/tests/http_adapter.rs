//! HTTP adapter tests against an in-process mock of the codec service.
//!
//! Each test binds an axum router to an ephemeral port and points an
//! `HttpCodecService` at it.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use rss_codec::{
    ApiRevision, ChannelType, CodecService, DecodeRequest, DecodeStatus, EncodingRequest,
    ErrorType, HttpCodecService, SimulationRequest, SimulationStatus, StudioConfig, StudioError,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: String, revision: ApiRevision) -> HttpCodecService {
    let mut config = StudioConfig {
        base_url,
        api_revision: revision,
        ..Default::default()
    };
    config.timeouts.request = Duration::from_millis(300);
    HttpCodecService::new(config).unwrap()
}

fn encode_request() -> EncodingRequest {
    EncodingRequest {
        data: "HELLO".into(),
        ecc_symbols: 4,
    }
}

fn simulate_request() -> SimulationRequest {
    SimulationRequest {
        encoded_payload: "SEVMTE8AAAAA".into(),
        source_text: "HELLO".into(),
        ecc_symbols: 4,
        error_rate: 0.4,
        error_type: ErrorType::Random,
        channel_type: ChannelType::Optical,
    }
}

/// Route that records the request body and answers with `response`.
fn recording(seen: Arc<Mutex<Option<Value>>>, response: Value) -> axum::routing::MethodRouter {
    post(move |Json(body): Json<Value>| {
        let seen = seen.clone();
        let response = response.clone();
        async move {
            *seen.lock() = Some(body);
            Json(response)
        }
    })
}

#[tokio::test]
async fn test_nested_encode_response() {
    let seen = Arc::new(Mutex::new(None));
    let router = Router::new().route(
        "/encode",
        recording(
            seen.clone(),
            json!({
                "status": "success",
                "data": {
                    "original": {"text": "HELLO", "length_bytes": 5, "length_bits": 40},
                    "encoded": {"base64": "SEVMTE8AAAAA", "length_bytes": 9, "length_bits": 72},
                    "correction": {"nsym": 4, "parity_bytes": 4},
                    "efficiency": {"overhead_percentage": 80.0, "coding_rate": 0.5556}
                }
            }),
        ),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let result = codec.encode(&encode_request()).await.unwrap();
    assert_eq!(result.encoded_payload, "SEVMTE8AAAAA");
    assert_eq!(result.overhead_percentage, 80.0);
    assert_eq!(
        seen.lock().clone(),
        Some(json!({"data": "HELLO", "ecc_symbols": 4}))
    );
}

#[tokio::test]
async fn test_flat_encode_response() {
    let router = Router::new().route(
        "/encode",
        post(|| async {
            Json(json!({"encoded_data": "flat", "original_length": 5, "encoded_length": 9}))
        }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let result = codec.encode(&encode_request()).await.unwrap();
    assert_eq!(result.encoded_payload, "flat");
    assert_eq!(result.parity_bytes, 4);
}

#[tokio::test]
async fn test_nested_wins_when_both_shapes_present() {
    let router = Router::new().route(
        "/encode",
        post(|| async {
            Json(json!({
                "status": "success",
                "data": {
                    "original": {"length_bytes": 5},
                    "encoded": {"base64": "nested", "length_bytes": 9}
                },
                "encoded_data": "flat",
                "original_length": 1,
                "encoded_length": 1
            }))
        }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let result = codec.encode(&encode_request()).await.unwrap();
    assert_eq!(result.encoded_payload, "nested");
    assert_eq!(result.original_length_bytes, 5);
}

#[tokio::test]
async fn test_http_error_status_is_remote_error() {
    let router = Router::new().route(
        "/encode",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": {"status": "error", "message": "nsym must be even"}})),
            )
        }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    match codec.encode(&encode_request()).await {
        Err(StudioError::RemoteError { status, message }) => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "nsym must be even");
        }
        other => panic!("expected RemoteError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unrecognized_shape_is_decode_error() {
    let router = Router::new().route(
        "/encode",
        post(|| async { Json(json!({"status": "success", "result": [1, 2, 3]})) }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let err = codec.encode(&encode_request()).await.unwrap_err();
    assert!(matches!(err, StudioError::Decode(_)), "got {err:?}");
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn test_partial_simulation_is_not_an_error() {
    let seen = Arc::new(Mutex::new(None));
    let router = Router::new().route(
        "/simulate",
        recording(
            seen.clone(),
            json!({
                "status": "partial",
                "simulation": {
                    "summary": {
                        "was_successful": false,
                        "data_recovered": false,
                        "success_rate": "50.00",
                        "errors_introduced": 4,
                        "errors_corrected": 2,
                        "errors_remaining": 2,
                        "max_correctable": 2
                    }
                },
                "analysis": {"channel": {"error_distribution": {"positions": [1, 5, 8, 11]}}}
            }),
        ),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let result = codec.simulate(&simulate_request()).await.unwrap();
    assert_eq!(result.status, SimulationStatus::Partial);
    assert_eq!(result.success_rate_percent, 50.0);
    assert_eq!(result.error_positions, vec![1, 5, 8, 11]);

    let body = seen.lock().clone().unwrap();
    assert_eq!(body["encoded_data"], "SEVMTE8AAAAA");
    assert_eq!(body["channel_type"], "optical");
}

#[tokio::test]
async fn test_legacy_revision_paths_and_fields() {
    let encode_seen = Arc::new(Mutex::new(None));
    let simulate_seen = Arc::new(Mutex::new(None));
    let router = Router::new()
        .route(
            "/api/encode",
            recording(
                encode_seen.clone(),
                json!({"encoded_data": "x", "original_length": 5, "encoded_length": 9}),
            ),
        )
        .route(
            "/api/simulate",
            recording(
                simulate_seen.clone(),
                json!({"errors_introduced": 2, "errors_corrected": 2, "success_rate": 100}),
            ),
        )
        .route(
            "/api/health",
            get(|| async { Json(json!({"status": "healthy", "service": "rs", "version": "1"})) }),
        );
    let codec = client(serve(router).await, ApiRevision::Legacy);

    codec.encode(&encode_request()).await.unwrap();
    codec.simulate(&simulate_request()).await.unwrap();
    assert!(codec.health().await.unwrap().is_healthy());

    assert_eq!(
        encode_seen.lock().clone(),
        Some(json!({"data": "HELLO", "nsym": 4}))
    );
    let body = simulate_seen.lock().clone().unwrap();
    assert_eq!(body["data"], "HELLO");
    assert_eq!(body["nsym"], 4);
}

#[tokio::test]
async fn test_uncorrectable_decode_is_an_outcome() {
    let router = Router::new().route(
        "/decode",
        post(|| async {
            Json(json!({
                "status": "uncorrectable",
                "error": {
                    "code": "RS_UNCORRECTABLE",
                    "message": "too many errors",
                    "max_correctable": 2
                }
            }))
        }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let request = DecodeRequest {
        encoded_payload: "SEVMTE8AAAAA".into(),
        ecc_symbols: 4,
        erasures: None,
    };
    let result = codec.decode(&request).await.unwrap();
    assert_eq!(result.status, DecodeStatus::Uncorrectable);
    assert_eq!(result.max_correctable, 2);
}

#[tokio::test]
async fn test_slow_service_is_unavailable() {
    let router = Router::new().route(
        "/encode",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let codec = client(serve(router).await, ApiRevision::Current);

    let err = codec.encode(&encode_request()).await.unwrap_err();
    assert!(err.is_unavailable(), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let codec = client(format!("http://{addr}"), ApiRevision::Current);

    let err = codec.encode(&encode_request()).await.unwrap_err();
    assert!(err.is_unavailable(), "got {err:?}");
}
