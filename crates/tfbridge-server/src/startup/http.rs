//! HTTP server setup

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, model::AppState};

/// Creates and binds the state proxy server.
///
/// The shutdown timeout bounds how long in-flight requests may run once a
/// stop is requested; workers are force-terminated afterwards.
pub fn state_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    let payload_limit = app_state.configuration.max_payload_bytes();
    let grace = app_state.configuration.shutdown_grace();

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::PayloadConfig::new(payload_limit))
            .app_data(web::Data::from(app_state.clone()))
            .service(api::route::routes())
    })
    .shutdown_timeout(grace.as_secs())
    .bind((address, port))?
    .run())
}
