//! API server lifecycle — starts/stops the axum HTTP server.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. A reminder poll loop runs alongside the server and is stopped
//! with it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::reminders::{self, ReminderTracker};

/// Handle to a running API server.
pub struct ApiServer {
    /// The actually bound address (useful with an ephemeral port).
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Start the API server on the given address.
///
/// Binds the listener, mounts `api_router`, and spawns the axum server plus
/// the reminder poll loop in background tokio tasks. Returns an `ApiServer`
/// handle with the bound address and a shutdown channel.
pub async fn start_server(db_path: PathBuf, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    tracing::info!(%addr, "API server binding");

    let ctx = ApiContext::new(db_path);
    let app = api_router(ctx.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let poller = tokio::spawn(reminder_poll_loop(ctx));

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        poller.abort();
        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Recompute due reminders once a minute and announce each one exactly once
/// per `(medication, slot, day)` as a structured tracing event.
async fn reminder_poll_loop(ctx: ApiContext) {
    let mut tracker = ReminderTracker::new();
    let mut interval = tokio::time::interval(Duration::from_secs(reminders::POLL_INTERVAL_SECS));

    loop {
        interval.tick().await;

        let meds = match ctx.open_db() {
            Ok(conn) => match repository::fetch_all_medications(&conn) {
                Ok(meds) => meds,
                Err(e) => {
                    tracing::warn!("Reminder poll: failed to load medications: {e}");
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!("Reminder poll: cannot open database: {e}");
                continue;
            }
        };

        for due in tracker.poll(&meds, Utc::now()) {
            tracing::info!(
                medication = %due.name,
                slot = %due.time,
                "Dose due now"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (PathBuf, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        (tmp.path().join("meditrack.db"), tmp)
    }

    fn localhost() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (db_path, _tmp) = test_db();
        let mut server = start_server(db_path, localhost())
            .await
            .expect("server should start");

        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
        // Give server time to stop
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn server_serves_api_routes() {
        let (db_path, _tmp) = test_db();
        let mut server = start_server(db_path, localhost())
            .await
            .expect("server should start");

        // Unknown route returns 404
        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        // Create through the real HTTP stack
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{}/api/medications", server.addr))
            .header("Content-Type", "application/json")
            .body(r#"{"name":"Metformin","schedule":["09:00"],"totalStock":10}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (db_path, _tmp) = test_db();
        let mut server = start_server(db_path, localhost())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown(); // Second call should be safe
    }
}
