#![allow(dead_code)]


use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calamine::{Reader, Xlsx, XlsxError, open_workbook};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;

use contact_relay::config::Config;
use contact_relay::notify::{Notifier, NotifyError};
use contact_relay::state::{AppState, SharedState};
use contact_relay::submission::Submission;

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><h1>Contact us</h1></body></html>";

/// What the stub notifier does when asked to send.
#[derive(Clone)]
pub enum Outcome {
    Deliver,
    Fail(NotifyError),
    Panic,
}

/// Records every submission it is handed instead of talking to a relay.
pub struct StubNotifier {
    outcome: Mutex<Outcome>,
    calls: AtomicUsize,
    sent: Mutex<Vec<Submission>>,
}

impl StubNotifier {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Submission> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, submission: &Submission) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(submission.clone());

        let outcome = self.outcome.lock().unwrap().clone();
        match outcome {
            Outcome::Deliver => Ok(()),
            Outcome::Fail(err) => Err(err),
            Outcome::Panic => panic!("stub notifier exploded"),
        }
    }
}

/// A running test server rooted in its own scratch directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub notifier: Arc<StubNotifier>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state.config.submissions_file.clone()
    }

    /// POST a JSON contact form, return (body, status).
    pub async fn submit(&self, data: &Value) -> (Value, StatusCode) {
        self.submit_to("/send-email", data).await
    }

    pub async fn submit_to(&self, path: &str, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(data)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST multipart/form-data, return (body, status).
    pub async fn submit_multipart(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let form = data.iter().fold(reqwest::multipart::Form::new(), |form, (k, v)| {
            form.text(k.to_string(), v.to_string())
        });
        let resp = self
            .client
            .post(self.url("/send-email"))
            .multipart(form)
            .send()
            .await
            .expect("submit multipart failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/send-email"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_json(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn the app with a stub notifier and default settings.
pub async fn spawn_app(outcome: Outcome) -> TestApp {
    spawn_app_with(outcome, &[]).await
}

/// Spawn the app with extra environment-style overrides.
pub async fn spawn_app_with(outcome: Outcome, overrides: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let site_root = dir.path().join("site");
    std::fs::create_dir_all(&site_root).unwrap();
    std::fs::write(site_root.join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(site_root.join("styles.css"), "body { margin: 0; }").unwrap();
    std::fs::write(site_root.join(".env"), "SMTP_PASSWORD=hunter2").unwrap();

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("HOST".into(), "127.0.0.1".into());
    vars.insert("PORT".into(), "0".into());
    vars.insert("SITE_ROOT".into(), site_root.display().to_string());
    vars.insert("CORS_ORIGINS".into(), ALLOWED_ORIGIN.into());
    vars.insert("LOG_LEVEL".into(), "warn".into());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("invalid test config");

    let notifier = Arc::new(StubNotifier::new(outcome));
    let state: SharedState = Arc::new(AppState::new(config, notifier.clone()));
    let app = contact_relay::build_router(state.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        state,
        notifier,
        dir,
    }
}

/// Read every row of the `Submissions` sheet as strings.
pub fn read_log(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e: XlsxError| e)
        .expect("log is not a valid workbook");
    let range = workbook
        .worksheet_range("Submissions")
        .expect("log has no Submissions sheet");
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn header() -> Vec<String> {
    ["Timestamp", "Name", "Email", "Company", "Message"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
