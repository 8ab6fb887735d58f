//! Main entry point for the tfbridge state proxy.
//!
//! Wires configuration, logging, the storage backend, and the lock
//! coordinator into one HTTP server and runs it until a shutdown signal
//! arrives.

use std::sync::Arc;

use tracing::{error, info, warn};

use tfbridge_core::StateCoordinator;
use tfbridge_server::model::{self, AppState};
use tfbridge_server::startup;
use tfbridge_storage::{B2StateStore, MemoryStateStore, StateStore};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = model::Configuration::new();
    let _logging_guard = startup::init_logging(&configuration)?;

    let store: Arc<dyn StateStore> = match configuration.storage_backend().as_str() {
        "memory" => {
            warn!("using the in-memory backend, state will not survive a restart");
            Arc::new(MemoryStateStore::new())
        }
        "b2" => {
            let b2_config = configuration.b2_config()?;
            Arc::new(B2StateStore::connect(b2_config).await?)
        }
        other => {
            return Err(format!("unknown storage backend '{other}'").into());
        }
    };

    let coordinator = Arc::new(StateCoordinator::new(store));
    let app_state = Arc::new(AppState {
        configuration: configuration.clone(),
        coordinator,
    });

    let address = configuration.server_address();
    let port = configuration.server_port();
    info!("state proxy starting at {}:{}", address, port);

    let server = startup::state_server(app_state, address, port)?;
    let handle = server.handle();

    let shutdown = startup::wait_for_shutdown_signal().await;
    let mut shutdown_rx = shutdown.subscribe();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!(
                "shutting down, allowing up to {:?} for in-flight requests",
                configuration.shutdown_grace()
            );
            handle.stop(true).await;
        }
    }

    info!("tfbridge shutdown complete");
    Ok(())
}
