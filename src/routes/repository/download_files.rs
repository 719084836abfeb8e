use crate::config::Config;
use crate::repository::Repository;
use crate::routing::RouteMatch;
use crate::{die, err};

use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};
use anyhow::{Context, Result};
use async_compression::tokio::write::GzipEncoder;
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio_tar::Builder as TarBuilder;

/// Sends the whole repository directory as a gzipped tar archive.
pub(crate) async fn download_files(request: &HttpRequest, route: &RouteMatch, config: &Config) -> Result<HttpResponse> {
    if *request.method() != Method::GET && *request.method() != Method::HEAD {
        die!(METHOD_NOT_ALLOWED, "File download only answers GET requests");
    }

    let repo = Repository::open(config.repos_dir.as_path(), route.username.as_str(), route.name.as_str())
        .ok_or_else(|| err!(NOT_FOUND, "Repository not found"))?;

    let mut builder = TarBuilder::new(Vec::new());
    builder.append_dir_all(".", repo.path.as_path()).await.context("Unable to add repository files to archive")?;

    let tar_data = builder.into_inner().await.context("Unable to finish archive")?;

    let mut encoder = GzipEncoder::new(Vec::new());
    encoder.write_all(tar_data.as_slice()).await?;
    encoder.shutdown().await?;

    let gzip_data = encoder.into_inner();

    debug!("Sending {} byte archive for {}/{}", gzip_data.len(), route.username, route.name);

    Ok(HttpResponse::Ok()
        .content_type("application/gzip")
        .append_header((CONTENT_DISPOSITION, format!("attachment; filename=\"{}.tar.gz\"", repo.name)))
        .body(gzip_data))
}
