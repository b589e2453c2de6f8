//! HTTPエンジンクライアントのテスト
//!
//! ローカルのTcpListenerで固定レスポンスを返して検証

use invoice_ai_common::ProcessingRequest;
use invoice_ai_desk::engine::{EngineApi, HttpEngine};
use invoice_ai_desk::error::DeskError;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

fn route(method: &'static str, path: &'static str, status: u16, body: &str) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// 受け取ったリクエスト（"METHOD PATH" と ボディ）
type Seen = Arc<Mutex<Vec<(String, String)>>>;

async fn serve(routes: Vec<Route>) -> (String, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let seen_task = seen.clone();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let (head, body) = read_request(&mut socket).await;
            let request_line = head.lines().next().unwrap_or_default().to_string();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();
            seen_task
                .lock()
                .unwrap()
                .push((format!("{} {}", method, path), body));

            let (status, payload) = routes
                .iter()
                .find(|r| r.method == method && r.path == path)
                .map(|r| (r.status, r.body.clone()))
                .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                payload.len(),
                payload
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), seen)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, String) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let head = text[..end].to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buffer.len() >= end + 4 + content_length {
                let body = String::from_utf8_lossy(&buffer[end + 4..end + 4 + content_length]).to_string();
                return (head, body);
            }
        }
    }
    (String::from_utf8_lossy(&buffer).to_string(), String::new())
}

fn sample_request() -> ProcessingRequest {
    ProcessingRequest {
        image_folder: "/in".into(),
        excel_template_path: "/t/invoice_template.xlsx".into(),
        output_excel_path: "/out/invoice_template_1.xlsx".into(),
    }
}

#[tokio::test]
async fn test_health_ok() {
    let (url, seen) = serve(vec![route(
        "GET",
        "/health",
        200,
        r#"{"status":"healthy","message":"Invoice AI Processor is running"}"#,
    )])
    .await;

    HttpEngine::new(&url).health().await.expect("health ok");
    assert_eq!(seen.lock().unwrap()[0].0, "GET /health");
}

#[tokio::test]
async fn test_health_non_json_body_still_alive() {
    let (url, _) = serve(vec![route("GET", "/health", 200, "ok")]).await;
    assert!(HttpEngine::new(&url).health().await.is_ok());
}

#[tokio::test]
async fn test_health_error_status() {
    let (url, _) = serve(vec![route("GET", "/health", 503, "{}")]).await;
    let err = HttpEngine::new(&url).health().await.unwrap_err();
    assert!(matches!(err, DeskError::UnreachableEngine(_)));
}

#[tokio::test]
async fn test_health_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpEngine::new(format!("http://{}", addr)).health().await.unwrap_err();
    assert!(matches!(err, DeskError::UnreachableEngine(_)));
}

#[tokio::test]
async fn test_process_success() {
    let (url, seen) = serve(vec![route(
        "POST",
        "/process-invoices",
        200,
        r#"{
            "success": true,
            "message": "Processing completed successfully",
            "total_processed": 4,
            "successful_extractions": 4,
            "failed_extractions": 0,
            "excel_file_path": "/out/invoice_template_1.xlsx",
            "new_customers_added": [],
            "fuzzy_matches_found": []
        }"#,
    )])
    .await;

    let result = HttpEngine::new(&url)
        .process_invoices(&sample_request())
        .await
        .expect("process ok");
    assert!(result.success);
    assert_eq!(result.total_processed, 4);
    assert_eq!(result.excel_file_path, "/out/invoice_template_1.xlsx");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "POST /process-invoices");
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body["image_folder"], "/in");
    assert_eq!(body["excel_template_path"], "/t/invoice_template.xlsx");
    assert_eq!(body["output_excel_path"], "/out/invoice_template_1.xlsx");
}

#[tokio::test]
async fn test_process_error_detail() {
    let (url, _) = serve(vec![route(
        "POST",
        "/process-invoices",
        404,
        r#"{"detail":"Image folder not found"}"#,
    )])
    .await;

    let err = HttpEngine::new(&url)
        .process_invoices(&sample_request())
        .await
        .unwrap_err();
    match err {
        DeskError::EngineRejected(message) => assert_eq!(message, "Image folder not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_process_error_without_detail() {
    let (url, _) = serve(vec![route("POST", "/process-invoices", 500, "Internal Server Error")]).await;

    let err = HttpEngine::new(&url)
        .process_invoices(&sample_request())
        .await
        .unwrap_err();
    match err {
        DeskError::EngineRejected(message) => assert!(message.contains("500")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_process_logical_failure_body_is_returned() {
    let (url, _) = serve(vec![route(
        "POST",
        "/process-invoices",
        200,
        r#"{"success": false, "message": "partial"}"#,
    )])
    .await;

    let result = HttpEngine::new(&url)
        .process_invoices(&sample_request())
        .await
        .expect("body parsed");
    assert!(!result.success);
    assert_eq!(result.message, "partial");
}

#[tokio::test]
async fn test_process_success_status_with_html_body_is_rejected() {
    let (url, _) = serve(vec![route(
        "POST",
        "/process-invoices",
        200,
        "<html>proxy error</html>",
    )])
    .await;

    let err = HttpEngine::new(&url)
        .process_invoices(&sample_request())
        .await
        .unwrap_err();
    match err {
        DeskError::EngineRejected(message) => assert!(message.contains("応答を解釈できません")),
        other => panic!("unexpected error: {other:?}"),
    }
}
