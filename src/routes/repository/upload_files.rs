use crate::config::Config;
use crate::prelude::HttpRequestExtensions;
use crate::repository::Repository;
use crate::routing::RouteMatch;
use crate::utils::identifiers::{is_valid_dir_name, is_valid_file_name};
use crate::die;

use std::fs;

use actix_multipart::Multipart;
use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use anyhow::{Context, Result};
use futures::TryStreamExt;
use log::info;
use serde_json::json;

/// Accepts a multipart/form-data payload and stores every field carrying a file
/// name inside the repository directory. The repository is created on first upload.
///
/// An optional `path` query parameter selects a subdirectory to store into, e.g.
/// `?path=src/models`. Every component has to be a plain identifier, so uploads
/// can never write outside the repository directory.
pub(crate) async fn upload_files(request: &HttpRequest, payload: web::Payload, route: &RouteMatch, config: &Config) -> Result<HttpResponse> {
    if *request.method() != Method::POST && *request.method() != Method::PUT {
        die!(METHOD_NOT_ALLOWED, "File upload only answers POST and PUT requests");
    }

    let content_type = request.get_header("content-type").unwrap_or_default();

    if !content_type.starts_with("multipart/form-data") {
        die!(BAD_REQUEST, "Expected multipart/form-data payload");
    }

    let repo = Repository::open_or_create(config.repos_dir.as_path(), route.username.as_str(), route.name.as_str())?;
    let mut target_dir = repo.path.clone();

    if let Some(sub_path) = request.q_string().get("path") {
        for component in sub_path.split('/').filter(|component| !component.is_empty()) {
            if !is_valid_dir_name(component) {
                die!(BAD_REQUEST, "Invalid target path component `{}`", component);
            }

            target_dir.push(component);
        }

        fs::create_dir_all(target_dir.as_path()).context("Unable to create target directory")?;
    }

    let mut multipart = Multipart::new(request.headers(), payload);
    let mut uploaded = Vec::<String>::new();

    while let Some(mut field) = multipart.try_next().await.context("Failed to read multipart field")? {
        let file_name = match field.content_disposition().get_filename() {
            Some(file_name) => file_name.to_owned(),
            None => continue // Not a file field
        };

        if !is_valid_file_name(file_name.as_str()) {
            die!(BAD_REQUEST, "Invalid file name `{}`", file_name);
        }

        let mut bytes = web::BytesMut::new();

        while let Some(chunk) = field.try_next().await.context("Failed to read multipart data chunk")? {
            bytes.extend_from_slice(chunk.as_ref());
        }

        let frozen_bytes = bytes.freeze();
        let path = target_dir.join(file_name.as_str());

        web::block(move || -> Result<()> {
            fs::write(path.as_path(), frozen_bytes.as_ref()).context("Unable to write uploaded file")?;

            Ok(())
        }).await.context("Failed to save file")?.context("Failed to save file")?;

        uploaded.push(file_name);
    }

    if uploaded.is_empty() {
        die!(BAD_REQUEST, "No files found in multipart payload");
    }

    info!("Uploaded {} file(s) into {}/{}", uploaded.len(), route.username, route.name);

    Ok(HttpResponse::Created().json(json!({
        "uploaded": uploaded
    })))
}
