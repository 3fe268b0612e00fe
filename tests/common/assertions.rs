//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );

    // Check Content-Type header
    let content_type = response
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(
        content_type,
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert JSON error body has expected status field
pub fn assert_json_status(response: &TestResponse, expected_status: u16) {
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected_status as u64),
        "Expected JSON status {}, got {:?}. Full response: {}",
        expected_status,
        json["status"],
        serde_json::to_string_pretty(&json).unwrap()
    );
}

/// Assert an error response with matching HTTP and JSON status
pub fn assert_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    assert_json_status(response, expected.as_u16());
    let json: serde_json::Value = response.json();
    assert!(json["error"].is_string(), "Expected error message string");
}

/// Assert image upload succeeded and return the parsed body
pub fn assert_image_loaded(response: &TestResponse) -> serde_json::Value {
    assert_ok(response);
    let json: serde_json::Value = response.json();
    assert!(json["palette_size"].as_u64().unwrap_or(0) >= 1);
    assert!(json["sequence_len"].as_u64().unwrap_or(0) >= 1);
    json
}
