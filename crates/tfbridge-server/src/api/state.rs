//! State protocol HTTP handlers
//!
//! One handler per protocol operation. Request-shape validation happens
//! here, before any storage call; outcome-to-status translation is shared
//! in `failure_response`.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use tfbridge_common::{
    BridgeError, CONTENT_LENGTH_HEADER, CONTENT_MD5_HEADER, verify_length, verify_md5,
};

use super::model::{ErrorBody, LockRequest};
use crate::model::AppState;

/// Query parameters accepted on state writes
#[derive(Debug, Default, Deserialize)]
pub struct WriteQuery {
    /// Lock token; absent or empty means an unlocked write
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
}

/// GET /state/{path} - fetch the current state payload.
///
/// A never-written path answers 200 with an empty body so a first-time
/// caller can initialize state.
pub async fn get_state(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let path = path.into_inner();
    debug!(path, "getting state");

    match data.coordinator.fetch(&path).await {
        Ok(Some(payload)) => HttpResponse::Ok()
            .content_type("application/json")
            .body(payload),
        Ok(None) => HttpResponse::Ok()
            .content_type("application/json")
            .body(Vec::new()),
        Err(err) => {
            error!(path, %err, "failed to retrieve state");
            HttpResponse::InternalServerError().json(ErrorBody::new(err))
        }
    }
}

/// POST /state/{path}?ID={lock_id} - write the state payload.
///
/// `content-md5` and `content-length` are mandatory; the request is
/// rejected before touching storage when either is missing, unparsable, or
/// fails validation against the received bytes.
pub async fn post_state(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WriteQuery>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let path = path.into_inner();
    let lock_id = query.into_inner().id.unwrap_or_default();
    debug!(path, lock_id, "posting state");

    let md5sum = match required_header(&req, CONTENT_MD5_HEADER) {
        Ok(value) => value,
        Err(err) => return reject(&path, err),
    };
    let declared_length = match required_header(&req, CONTENT_LENGTH_HEADER) {
        Ok(value) => match value.parse::<u64>() {
            Ok(length) => length,
            Err(_) => return reject(&path, BridgeError::InvalidHeader(CONTENT_LENGTH_HEADER)),
        },
        Err(err) => return reject(&path, err),
    };

    if let Err(err) = verify_length(declared_length, body.len()) {
        return reject(&path, err);
    }
    if let Err(err) = verify_md5(&body, &md5sum) {
        return reject(&path, err);
    }

    match data.coordinator.write(&path, &lock_id, body.to_vec()).await {
        Ok(()) => {
            info!(path, bytes = declared_length, "state stored");
            HttpResponse::Ok().finish()
        }
        Err(err) => failure_response(&path, err),
    }
}

/// LOCK /state/{path} - acquire the state lock.
pub async fn lock_state(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let path = path.into_inner();
    let lock = match parse_lock_request(&body, "lock") {
        Ok(lock) => lock,
        Err(response) => return response,
    };
    debug!(path, id = lock.id, who = lock.who, "locking state");

    match data.coordinator.acquire(&path, &lock.id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => failure_response(&path, err),
    }
}

/// UNLOCK /state/{path} - release the state lock.
pub async fn unlock_state(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let path = path.into_inner();
    let lock = match parse_lock_request(&body, "unlock") {
        Ok(lock) => lock,
        Err(response) => return response,
    };
    debug!(path, id = lock.id, "unlocking state");

    match data.coordinator.release(&path, &lock.id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => failure_response(&path, err),
    }
}

fn required_header(req: &HttpRequest, name: &'static str) -> Result<String, BridgeError> {
    let value = req
        .headers()
        .get(name)
        .ok_or(BridgeError::MissingHeader(name))?;
    value
        .to_str()
        .map(str::to_string)
        .map_err(|_| BridgeError::InvalidHeader(name))
}

fn parse_lock_request(body: &[u8], operation: &str) -> Result<LockRequest, HttpResponse> {
    serde_json::from_slice(body).map_err(|err| {
        warn!(operation, %err, "failed to JSON-decode lock request body");
        HttpResponse::BadRequest().json(ErrorBody::new(format!("invalid lock request: {err}")))
    })
}

/// Rejects a malformed write before any storage call.
fn reject(path: &str, err: BridgeError) -> HttpResponse {
    warn!(path, %err, "rejecting state write");
    HttpResponse::BadRequest().json(ErrorBody::new(err))
}

/// Maps coordinator failures to protocol responses: conflicts answer 409
/// with a body naming the current holder, everything else is a 500.
fn failure_response(path: &str, err: BridgeError) -> HttpResponse {
    match err {
        BridgeError::LockConflict { requested, holder } => {
            warn!(path, requested, holder, "lock conflict");
            HttpResponse::Conflict().json(LockRequest::holder(holder, path))
        }
        err => {
            error!(path, %err, "state operation failed");
            HttpResponse::InternalServerError().json(ErrorBody::new(err))
        }
    }
}
