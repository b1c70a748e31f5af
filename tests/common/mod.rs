use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Responder = dyn Fn(usize, &HashMap<String, String>) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server standing in for the archive endpoint.
///
/// Every request's query is recorded; the responder sees the zero-based
/// request number and the decoded query and returns a status and body.
pub struct StubArchive {
    pub base_url: String,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl StubArchive {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(usize, &HashMap<String, String>) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }

                    let text = String::from_utf8_lossy(&head);
                    let target = text.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let query: HashMap<String, String> =
                        reqwest::Url::parse(&format!("http://stub{}", target))
                            .map(|url| url.query_pairs().into_owned().collect())
                            .unwrap_or_default();

                    let index = {
                        let mut log = log.lock().unwrap();
                        log.push(query.clone());
                        log.len() - 1
                    };
                    let (status, body) = respond(index, &query);

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}/v1/archive", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn dates(query: &HashMap<String, String>) -> Vec<NaiveDate> {
    let start = NaiveDate::parse_from_str(&query["start_date"], "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str(&query["end_date"], "%Y-%m-%d").unwrap();
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Archive-shaped body for the requested range. Every requested variable
/// gets a value derived from the date (day of month, or hour for hourly).
pub fn archive_body(query: &HashMap<String, String>) -> String {
    use chrono::Datelike;

    let days = dates(query);
    let mut body = json!({
        "latitude": query.get("latitude").cloned().unwrap_or_default(),
        "timezone": "GMT",
    });

    if let Some(codes) = query.get("daily") {
        let mut block = serde_json::Map::new();
        block.insert(
            "time".into(),
            Value::from(days.iter().map(|d| d.to_string()).collect::<Vec<_>>()),
        );
        for code in codes.split(',') {
            block.insert(
                code.into(),
                Value::from(days.iter().map(|d| d.day() as f64).collect::<Vec<_>>()),
            );
        }
        body["daily"] = Value::Object(block);
    }

    if let Some(codes) = query.get("hourly") {
        let mut times = Vec::new();
        let mut hours = Vec::new();
        for day in &days {
            for hour in 0..2 {
                times.push(format!("{}T{:02}:00", day, hour));
                hours.push(hour as f64);
            }
        }
        let mut block = serde_json::Map::new();
        block.insert("time".into(), Value::from(times));
        for code in codes.split(',') {
            block.insert(code.into(), Value::from(hours.clone()));
        }
        body["hourly"] = Value::Object(block);
    }

    body.to_string()
}
