//! End-to-end dispatch scenarios through the full router stack.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use trailhead::config::{DefaultResponse, ProfileConfig};
use trailhead::{RouteDefinition, RouteError, ServiceConfig};

mod common;
use common::{get, router, send, Hits};

fn items_config() -> ServiceConfig {
    ServiceConfig {
        routes: vec![RouteDefinition::new("/items/[0-9]+", &["GET"], "GetItem")],
        ..ServiceConfig::default()
    }
}

#[tokio::test]
async fn test_items_route() {
    let hits = Hits::default();
    let app = router(&items_config(), &hits);

    let (status, _, body) = send(&app, get("/items/42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"item");

    let (status, _, _) = send(&app, get("/items/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Anchored: a prefix match is not a match.
    let (status, _, _) = send(&app, get("/items/42/extra")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let post = Request::builder()
        .method("POST")
        .uri("/items/42")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, post).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(hits.get(), 1);
}

#[tokio::test]
async fn test_percent_encoded_paths() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![
            RouteDefinition::new("/items/[0-9]+", &["GET"], "GetItem"),
            RouteDefinition::new("/files/my file", &["GET"], "GetItem"),
        ],
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    let (status, _, body) = send(&app, get("/items/%34%32")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"item");

    let (status, _, _) = send(&app, get("/files/my%20file")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.get(), 2);
}

#[tokio::test]
async fn test_device_header_check() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/secure", &["GET"], "Secure").check("header", &["true"])],
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    let (status, _, body) = send(&app, get("/secure")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
    assert_eq!(hits.get(), 0);

    let request = Request::builder()
        .uri("/secure")
        .header("device", "ios")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"granted");
    assert_eq!(hits.get(), 1);
}

#[tokio::test]
async fn test_checks_run_in_declared_order() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/secure", &["GET"], "Secure")
            .check("header", &["true"])
            .check("json", &[])],
        dispatch: trailhead::config::DispatchConfig {
            prefer_check_responses: true,
            ..Default::default()
        },
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    // The header check rejects before the json check can fault.
    let (status, _, _) = send(&app, get("/secure")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // With the header present, the json check faults on the missing body.
    let request = Request::builder()
        .uri("/secure")
        .header("device", "ios")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(hits.get(), 0);
}

#[tokio::test]
async fn test_configured_failure_response() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/search", &["GET"], "GetItem").check("query", &["q"])],
        dispatch: trailhead::config::DispatchConfig {
            default_response: Some(DefaultResponse {
                status: 422,
                body: "missing parameters".to_string(),
            }),
            ..Default::default()
        },
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    let (status, _, body) = send(&app, get("/search?page=1")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(&body[..], b"missing parameters");

    let (status, _, _) = send(&app, get("/search?q=boots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_duplicate_route_rejected() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![
            RouteDefinition::new("/x", &["GET"], "GetItem"),
            RouteDefinition::new("/x", &["GET", "POST"], "Echo"),
        ],
        ..ServiceConfig::default()
    };
    let err = trailhead::SharedDispatcher::from_config(
        &config,
        std::sync::Arc::new(common::handlers(&hits)),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { .. }));
}

#[tokio::test]
async fn test_disjoint_methods_share_a_pattern() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![
            RouteDefinition::new("/x", &["GET"], "GetItem"),
            RouteDefinition::new("/x", &["POST"], "Echo"),
        ],
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    let (_, _, body) = send(&app, get("/x")).await;
    assert_eq!(&body[..], b"item");

    let post = Request::builder()
        .method("POST")
        .uri("/x")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("posted"))
        .unwrap();
    let (_, _, body) = send(&app, post).await;
    assert_eq!(&body[..], b"posted");
}

#[tokio::test]
async fn test_validated_post_body_reaches_handler() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/echo", &["POST"], "Echo").check("json", &["name"])],
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);
    let payload = r#"{"name":"widget","qty":3}"#;

    let post = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(payload))
        .unwrap();
    let (status, _, body) = send(&app, post).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], payload.as_bytes());

    let post = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"qty":3}"#))
        .unwrap();
    let (status, _, _) = send(&app, post).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No content type on a checked POST: normalization fails.
    let post = Request::builder()
        .method("POST")
        .uri("/echo")
        .body(Body::from(payload))
        .unwrap();
    let (status, _, _) = send(&app, post).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(hits.get(), 1);
}

#[tokio::test]
async fn test_multipart_fields_satisfy_query_check() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/upload", &["POST"], "Echo").check("query", &["user"])],
        ..ServiceConfig::default()
    };
    let app = router(&config, &hits);

    let boundary = "trailhead-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"user\"\r\n\r\nalice\r\n--{b}--\r\n",
        b = boundary
    );
    let post = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body.clone()))
        .unwrap();
    let (status, _, echoed) = send(&app, post).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&echoed[..], body.as_bytes());
}

#[tokio::test]
async fn test_cors_headers_on_every_outcome() {
    let hits = Hits::default();
    let mut config = items_config();
    config.dispatch.cors = true;
    let app = router(&config, &hits);

    for uri in ["/items/1", "/nowhere"] {
        let (_, headers, _) = send(&app, get(uri)).await;
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(headers.get("access-control-allow-methods").unwrap(), "*");
        assert_eq!(headers.get("access-control-allow-headers").unwrap(), "*");
    }
}

#[tokio::test]
async fn test_request_id_echoed() {
    let hits = Hits::default();
    let app = router(&items_config(), &hits);

    let (_, headers, _) = send(&app, get("/items/1")).await;
    let generated = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let request = Request::builder()
        .uri("/items/1")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;
    assert_eq!(headers.get("x-request-id").unwrap(), "trace-123");
}

#[tokio::test]
async fn test_info_route() {
    let hits = Hits::default();
    let mut config = common::config_with_profile();
    config.routes = vec![RouteDefinition::new("/items/[0-9]+", &["GET"], "GetItem")];
    let app = router(&config, &hits);

    let (status, headers, body) = send(&app, get("/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let profile: trailhead::Profile = serde_json::from_slice(&body).unwrap();
    assert_eq!(profile.version, "9.9.9");
    assert_eq!(profile.mode, "test");
    assert_eq!(profile.url, "/info");

    let post = Request::builder()
        .method("POST")
        .uri("/info")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, post).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_info_route_collides_with_user_route() {
    let hits = Hits::default();
    let config = ServiceConfig {
        routes: vec![RouteDefinition::new("/info", &["GET"], "GetItem")],
        profile: Some(ProfileConfig {
            url: "/info".to_string(),
            ..ProfileConfig::default()
        }),
        ..ServiceConfig::default()
    };
    let result = trailhead::SharedDispatcher::from_config(
        &config,
        std::sync::Arc::new(common::handlers(&hits)),
        None,
    );
    assert!(matches!(result, Err(RouteError::DuplicateRoute { .. })));
}
