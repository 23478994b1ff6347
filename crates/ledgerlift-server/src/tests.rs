//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ledgerlift_core::db::Database;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_test_app() -> (Router, TempDir) {
    let db = Database::in_memory().unwrap();
    let dir = TempDir::new().unwrap();
    let app = create_router(db, dir.path().to_path_buf());
    (app, dir)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_body(boundary: &str, filename: &str, ext: &str, content: &str) -> Body {
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {c}\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"ext\"\r\n\r\n\
         {e}\r\n\
         --{b}--\r\n",
        b = boundary,
        f = filename,
        c = content,
        e = ext
    );
    Body::from(body)
}

const STATEMENT: &str = "Date,Particulars,Withdrawal,Deposit,Bal.\n\
    2024-04-01,UPI/1/PAY/Amazon Store/HDFC,500,0,9500\n\
    2024-04-02,NEFT SALARY,0,25000,34500\n";

async fn process_statement_request(app: &Router) -> serde_json::Value {
    let boundary = "test-boundary";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(multipart_body(boundary, "statement.csv", ".csv", STATEMENT))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "OK");
}

#[tokio::test]
async fn test_process_upload() {
    let (app, _dir) = setup_test_app();

    let json = process_statement_request(&app).await;
    assert_eq!(json["rows"], 2);
    assert!(json["session_id"].as_str().unwrap().len() > 10);
}

#[tokio::test]
async fn test_process_unsupported_extension() {
    let (app, _dir) = setup_test_app();
    let boundary = "test-boundary";

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(multipart_body(boundary, "statement.docx", ".docx", "x"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Unsupported"));
}

#[tokio::test]
async fn test_process_then_load_then_sessions() {
    let (app, _dir) = setup_test_app();

    let processed = process_statement_request(&app).await;
    let session_id = processed["session_id"].as_str().unwrap().to_string();

    // Load
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/load")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "session_id": session_id }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["loaded"], 2);

    // Session shows up in the listing
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = get_body_json(response).await;
    let sessions = json["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["session_id"], session_id.as_str());
    assert_eq!(sessions[0]["record_count"], 2);
}

#[tokio::test]
async fn test_load_unknown_session() {
    let (app, _dir) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/load")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "session_id": "no-such-session" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_endpoint() {
    let (app, _dir) = setup_test_app();

    let processed = process_statement_request(&app).await;
    let session_id = processed["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/load")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "session_id": session_id }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["deleted"], 2);

    // Listing is empty again
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json["sessions"].as_array().unwrap().is_empty());
}
