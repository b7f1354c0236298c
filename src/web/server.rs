//! Web server implementation using axum

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{api, page, WebState};

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/dashboard", get(page::dashboard))
        .route("/api/usage", get(api::get_usage))
        .route("/healthz", get(api::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub struct WebServer {
    addr: SocketAddr,
    state: Arc<WebState>,
}

impl WebServer {
    pub fn new(bind: &str, port: u16, state: Arc<WebState>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", bind, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
        Ok(Self { addr, state })
    }

    /// Serve until `shutdown` resolves. A bind failure is returned as an error.
    pub async fn run<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        let local = listener.local_addr()?;

        tracing::info!(
            "Dashboard at http://{} (data source: {})",
            local,
            self.state.source.describe()
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .context("Web server error")?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::SnapshotStore;
    use crate::web::source::SnapshotSource;

    #[test]
    fn rejects_bad_bind_address() {
        let state = WebState::new(SnapshotSource::File(SnapshotStore::new("/tmp/x.json")), 30);
        assert!(WebServer::new("not an ip", 3000, state.clone()).is_err());
        assert!(WebServer::new("127.0.0.1", 3000, state).is_ok());
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let state = WebState::new(
            SnapshotSource::File(SnapshotStore::new(dir.path().join("data.json"))),
            30,
        );
        let server = WebServer::new("127.0.0.1", 0, state).unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
