//! HTTP server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use super::routes::{ApiState, routes};
use crate::catalog::LotCatalog;
use crate::version::VersionInfo;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub catalog_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            catalog_path: PathBuf::from("data/lots.json"),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Serve `catalog` until SIGINT or SIGTERM.
pub async fn serve(config: ServerConfig, catalog: LotCatalog) -> anyhow::Result<()> {
    let mut version = VersionInfo::new();
    if let Some(name) = config.catalog_path.file_name() {
        version = version.with_catalog(name.to_string_lossy().into_owned());
    }
    let state = ApiState::new(catalog).with_version(version);

    let listener = TcpListener::bind(config.addr()?).await?;
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    state: ApiState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let actual_addr = listener.local_addr()?;
    let lots = state.catalog().len();
    let app = routes(Arc::new(state));

    info!(%actual_addr, lots, "Starting parkview lot server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or (on unix) SIGTERM.
///
/// If a handler cannot be installed that signal is never observed; the
/// other one still is.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::lot::{Day, LotRecord, LotType, Permit, Position};
    use crate::source::{HttpLotSource, LotSource};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.addr().unwrap().port(), 5000);
    }

    #[test]
    fn server_config_rejects_bad_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.addr().is_err());
    }

    #[tokio::test]
    async fn http_source_reads_from_running_server() {
        let catalog = LotCatalog::from_records(vec![LotRecord::new(
            "y1",
            "Yellow Yard",
            LotType::Yellow,
            Position::new(40.5, -74.45).unwrap(),
        )])
        .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_on(listener, ApiState::new(catalog), async {
            let _ = stop_rx.await;
        }));

        let source = HttpLotSource::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let weekday = Filter::new(Permit::None, Day::Wed, "12:00".parse().unwrap());
        let records = source.fetch(&weekday).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].available, Some(false));

        let evening = Filter::new(Permit::None, Day::Wed, "17:00".parse().unwrap());
        let records = source.fetch(&evening).await.unwrap();
        assert_eq!(records[0].available, Some(true));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
