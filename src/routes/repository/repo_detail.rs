use crate::config::Config;
use crate::repository::Repository;
use crate::routing::{ResponseFormat, RouteMatch};
use crate::{die, err};

use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};
use anyhow::Result;

/// Detail view of a repository: owner, name, file count, size and top level listing.
/// Honors the negotiated format suffix, defaulting to JSON.
pub(crate) async fn repo_detail(request: &HttpRequest, route: &RouteMatch, config: &Config) -> Result<HttpResponse> {
    if *request.method() != Method::GET && *request.method() != Method::HEAD {
        die!(METHOD_NOT_ALLOWED, "Repository detail only answers GET requests");
    }

    let repo = Repository::open(config.repos_dir.as_path(), route.username.as_str(), route.name.as_str())
        .ok_or_else(|| err!(NOT_FOUND, "Repository not found"))?;

    let summary = repo.summarize()?;

    Ok(match route.format.unwrap_or(ResponseFormat::Json) {
        ResponseFormat::Json => HttpResponse::Ok().json(&summary),
        ResponseFormat::Text => HttpResponse::Ok().content_type("text/plain").body(summary.to_text())
    })
}
