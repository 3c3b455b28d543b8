use component_attributor::{
    AliasDictionary, AttributionError, AttributionService, ComponentDetector, ModelClient,
    ModelConfig, OllamaClient, ReservedPrefix, Strategy, TaskRef,
};
use std::sync::Arc;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Serve exactly one HTTP response, returning the base URL and a handle that
/// yields the raw request
fn serve_once(status_line: &str, body: &str, delay: Duration) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request = read_request(&mut stream);
        thread::sleep(delay);
        let _ = stream.write_all(response.as_bytes());
        request
    });

    (format!("http://{}", addr), handle)
}

/// Serve one `200 OK` JSON response per body, in order, on a single address
fn serve_each(bodies: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for body in bodies {
            let (mut stream, _) = listener.accept().expect("accept");
            requests.push(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn config_for(base_url: String) -> ModelConfig {
    ModelConfig {
        base_url,
        probe_timeout_secs: 2,
        request_timeout_secs: 2,
        ..Default::default()
    }
}

#[test]
fn probe_ok_means_available() {
    let (url, handle) = serve_once("200 OK", r#"{"models": []}"#, Duration::ZERO);
    let client = OllamaClient::new().unwrap();
    assert!(client.is_available(&config_for(url)));

    let request = handle.join().unwrap();
    assert!(request.starts_with("GET /api/tags "));
}

#[test]
fn probe_error_status_means_unavailable() {
    let (url, handle) = serve_once("503 Service Unavailable", "{}", Duration::ZERO);
    let client = OllamaClient::new().unwrap();
    assert!(!client.is_available(&config_for(url)));
    handle.join().unwrap();
}

#[test]
fn generate_parses_fenced_array() {
    let body = serde_json::json!({ "response": "```json\n[\"modal\", 7, \"CfaDatePicker\"]\n```" })
        .to_string();
    let (url, handle) = serve_once("200 OK", &body, Duration::ZERO);
    let client = OllamaClient::new().unwrap();

    let names = client
        .extract_components("Modal içindeki tarih alanı", &config_for(url))
        .unwrap();
    assert_eq!(names, vec!["modal", "CfaDatePicker"]);

    let request = handle.join().unwrap();
    assert!(request.starts_with("POST /api/generate "));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent["model"], "llama3.2");
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["options"]["temperature"], 0.0);
    assert_eq!(sent["options"]["num_predict"], 100);
    assert!(sent["prompt"].as_str().unwrap().contains("Modal içindeki tarih alanı"));
}

#[test]
fn generate_rejects_prose() {
    let body = serde_json::json!({ "response": "I found a modal." }).to_string();
    let (url, handle) = serve_once("200 OK", &body, Duration::ZERO);
    let client = OllamaClient::new().unwrap();

    let result = client.extract_components("modal", &config_for(url));
    assert!(matches!(result, Err(AttributionError::ModelResponse(_))));
    handle.join().unwrap();
}

#[test]
fn generate_reports_http_status() {
    let (url, handle) = serve_once("500 Internal Server Error", "{}", Duration::ZERO);
    let client = OllamaClient::new().unwrap();

    let result = client.extract_components("modal", &config_for(url));
    assert!(matches!(result, Err(AttributionError::ModelStatus(500))));
    handle.join().unwrap();
}

#[test]
fn generate_times_out() {
    let (url, handle) = serve_once("200 OK", r#"{"response": "[]"}"#, Duration::from_secs(3));
    let client = OllamaClient::new().unwrap();
    let config = ModelConfig {
        request_timeout_secs: 1,
        ..config_for(url)
    };

    let result = client.extract_components("modal", &config);
    assert!(matches!(result, Err(AttributionError::ModelTransport(_))));
    handle.join().unwrap();
}

#[test]
fn service_ranks_fenced_model_reply() {
    let reply = serde_json::json!({
        "response": "```json\n[\"Card\", \"badge\", \"UserProfileCard\", \"cfa-user-card\"]\n```"
    })
    .to_string();
    let (url, handle) = serve_each(vec![r#"{"models": []}"#.to_string(), reply]);

    let detector = ComponentDetector::new(
        Arc::new(AliasDictionary::empty()),
        ReservedPrefix::new("cfa").unwrap(),
    );
    let service = AttributionService::new(detector, OllamaClient::new().unwrap())
        .with_model_config(config_for(url));

    let detection =
        service.attribute_detailed(&TaskRef::new("Profil sayfası kayıyor"), true, None);
    assert_eq!(detection.strategy, Strategy::Model);
    // prefixed kebab, then PascalCase, then by length; "Card" is inside "cfa-user-card"
    assert_eq!(detection.names, vec!["cfa-user-card", "UserProfileCard", "badge"]);

    let requests = handle.join().unwrap();
    assert!(requests[0].starts_with("GET /api/tags "));
    assert!(requests[1].starts_with("POST /api/generate "));
}
