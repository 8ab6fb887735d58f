//! Route configuration for the state protocol
//!
//! Terraform's HTTP backend drives the lock with the non-standard LOCK and
//! UNLOCK methods (its defaults), so those are registered alongside GET and
//! POST on the same state resource.

use actix_web::http::Method;
use actix_web::web;

use super::state;

fn lock_method() -> Method {
    Method::from_bytes(b"LOCK").expect("LOCK is a valid method token")
}

fn unlock_method() -> Method {
    Method::from_bytes(b"UNLOCK").expect("UNLOCK is a valid method token")
}

/// Configures the state protocol routes.
///
/// The `{path:.*}` tail match lets one server carry any number of state
/// paths, e.g. `/state/prod/network`.
pub fn routes() -> actix_web::Scope {
    web::scope("/state").service(
        web::resource("/{path:.*}")
            .route(web::get().to(state::get_state))
            .route(web::post().to(state::post_state))
            .route(web::route().method(lock_method()).to(state::lock_state))
            .route(web::route().method(unlock_method()).to(state::unlock_state)),
    )
}
