use crate::config::Config;
use crate::error::RepoHubError;
use crate::routes::not_found;
use crate::routing::{RepoHandler, RouteTable};

use actix_web::{web, HttpRequest, Responder, Result as ActixResult};
use tracing::instrument;

mod download_files;
mod repo_detail;
mod upload_files;

/// Single entry point for repository routes. Consults the route table and hands
/// the request to the matched handler, or answers with the structured 404 when
/// no route matches. The route table itself is method-agnostic, handlers police
/// HTTP methods themselves.
#[instrument(skip_all, fields(path = %request.path()))]
pub(crate) async fn dispatch(request: HttpRequest, payload: web::Payload, table: web::Data<RouteTable>, config: web::Data<Config>) -> ActixResult<impl Responder> {
    let result = match table.lookup(request.path()) {
        Some(route) => match route.handler {
            RepoHandler::Detail => repo_detail::repo_detail(&request, &route, &config).await,
            RepoHandler::Upload => upload_files::upload_files(&request, payload, &route, &config).await,
            RepoHandler::Download => download_files::download_files(&request, &route, &config).await
        },
        None => not_found::no_route(&request).await
    };

    Ok(result.map_err(|err| -> RepoHubError { err.into() }))
}

#[cfg(test)]
mod tests {
    use super::dispatch;
    use crate::config::Config;
    use crate::routing::RouteTable;

    use std::fs;
    use std::path::Path;

    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::to;
    use actix_web::{web, App, Error};
    use serde_json::Value;
    use tempfile::TempDir;

    fn test_config(repos_dir: &Path) -> Config {
        Config {
            bind_address: String::new(),
            repos_dir: repos_dir.to_path_buf()
        }
    }

    async fn test_app(repos_dir: &Path) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
        test::init_service(
            App::new()
                .app_data(web::Data::new(RouteTable::new().expect("Unable to build route table")))
                .app_data(web::Data::new(test_config(repos_dir)))
                .default_service(to(dispatch))
        ).await
    }

    fn seed_repo(repos_dir: &Path) {
        let repo_dir = repos_dir.join("alice").join("myrepo");

        fs::create_dir_all(repo_dir.as_path()).expect("Unable to create repository directory");
        fs::write(repo_dir.join("README"), b"hello world").expect("Unable to write file");
    }

    #[actix_rt::test]
    async fn detail_returns_repository_summary() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        seed_repo(repos_dir.path());

        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::get().uri("/alice/myrepo/repo").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::OK, response.status());

        let body = test::read_body(response).await;
        let value: Value = serde_json::from_slice(body.as_ref()).expect("Expected JSON body");

        assert_eq!("alice", value["username"]);
        assert_eq!("myrepo", value["name"]);
        assert_eq!(1, value["file_count"]);
        assert_eq!(11, value["size_in_bytes"]);
    }

    #[actix_rt::test]
    async fn detail_honors_text_format_suffix() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        seed_repo(repos_dir.path());

        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::get().uri("/alice/myrepo/repo.txt").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::OK, response.status());

        let content_type = response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).unwrap_or_default().to_owned();
        assert!(content_type.starts_with("text/plain"));

        let body = test::read_body(response).await;
        let text = String::from_utf8_lossy(body.as_ref()).into_owned();

        assert!(text.starts_with("alice/myrepo\n"));
        assert!(text.contains("README"));
    }

    #[actix_rt::test]
    async fn unknown_path_yields_structured_not_found() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::get().uri("/alice/myrepo/repo/delete").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let body = test::read_body(response).await;
        let value: Value = serde_json::from_slice(body.as_ref()).expect("Expected JSON body");

        assert_eq!("Not found", value["error"]);
    }

    #[actix_rt::test]
    async fn missing_repository_yields_not_found() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::get().uri("/ghost/nothing/repo").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[actix_rt::test]
    async fn detail_rejects_wrong_method() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        seed_repo(repos_dir.path());

        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::post().uri("/alice/myrepo/repo").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());
    }

    fn multipart_body(boundary: &str, file_name: &str, content: &str) -> String {
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{boundary}--\r\n",
            boundary = boundary,
            file_name = file_name,
            content = content
        )
    }

    #[actix_rt::test]
    async fn upload_writes_files_into_the_repository() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        let app = test_app(repos_dir.path()).await;

        let boundary = "e0e8ed1a8b6c47a9b0caef06d88b3e4e";
        let body = multipart_body(boundary, "model.py", "print('hello')");

        let request = TestRequest::post()
            .uri("/alice/myrepo/repo/upload")
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary)))
            .set_payload(body)
            .to_request();

        let response = test::call_service(&app, request).await;
        assert_eq!(StatusCode::CREATED, response.status());

        let uploaded = repos_dir.path().join("alice").join("myrepo").join("model.py");
        let content = fs::read_to_string(uploaded.as_path()).expect("Uploaded file must exist");

        assert_eq!("print('hello')", content.as_str());
    }

    #[actix_rt::test]
    async fn upload_rejects_path_traversal_file_names() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        let app = test_app(repos_dir.path()).await;

        let boundary = "e0e8ed1a8b6c47a9b0caef06d88b3e4e";
        let body = multipart_body(boundary, "..%2Fevil.py", "boom");

        let request = TestRequest::post()
            .uri("/alice/myrepo/repo/upload")
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary)))
            .set_payload(body)
            .to_request();

        let response = test::call_service(&app, request).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }

    #[actix_rt::test]
    async fn download_sends_gzipped_tar_archive() {
        let repos_dir = TempDir::new().expect("Unable to create temporary directory");
        seed_repo(repos_dir.path());

        let app = test_app(repos_dir.path()).await;

        let request = TestRequest::get().uri("/alice/myrepo/repo/download").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::OK, response.status());

        let disposition = response.headers().get(CONTENT_DISPOSITION).and_then(|value| value.to_str().ok()).unwrap_or_default().to_owned();
        assert!(disposition.contains("myrepo.tar.gz"));

        let body = test::read_body(response).await;

        // Gzip magic bytes
        assert_eq!(&[0x1f, 0x8b], &body.as_ref()[..2]);
    }
}
