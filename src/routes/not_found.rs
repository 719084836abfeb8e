use actix_web::{HttpRequest, HttpResponse};
use anyhow::Result;
use log::debug;
use serde_json::json;

/// Answer for paths outside the route table. This is the normal, typed outcome
/// of a failed lookup and never an internal error.
pub(crate) async fn no_route(request: &HttpRequest) -> Result<HttpResponse> {
    debug!("Got request for non-existent resource: {}", request.path());

    Ok(HttpResponse::NotFound().json(json!({
        "error": "Not found"
    })))
}
