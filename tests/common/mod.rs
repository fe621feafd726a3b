#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::Router;
use greenlight_api::config::AppConfig;
use greenlight_api::jsonlog::{Level, Logger};
use greenlight_api::{app, AppState};

/// Log sink the tests can read back.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Logged entries at `level`, parsed.
    pub fn entries_at(&self, level: &str) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
            .filter(|e| e["level"] == level)
            .collect()
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub logs: LogBuffer,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve a fresh app (empty catalog) on an unused port for the duration of the test.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::default()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    spawn_router(config, app).await
}

/// Serve whatever router `build` makes from a fresh state, so tests can mount
/// extra routes behind the real middleware stack.
pub async fn spawn_router<F>(config: AppConfig, build: F) -> Result<TestServer>
where
    F: FnOnce(AppState) -> Router,
{
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let logs = LogBuffer::default();
    let state = AppState::new(config, Logger::new(logs.clone(), Level::Info));
    let router = build(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer { port, base_url, logs })
}

pub async fn create_movie(
    server: &TestServer,
    title: &str,
    year: i32,
    runtime: &str,
    genres: &[&str],
) -> Result<serde_json::Value> {
    let res = reqwest::Client::new()
        .post(server.url("/v1/movies"))
        .json(&serde_json::json!({
            "title": title,
            "year": year,
            "runtime": runtime,
            "genres": genres,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create failed: {}", res.status());
    Ok(res.json::<serde_json::Value>().await?)
}
