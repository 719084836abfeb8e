#![forbid(unsafe_code)]

use std::env::VarError;
use std::error::Error;
use std::io;
use std::path::Path;

use actix_web::dev::Service;
use actix_web::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL};
use actix_web::web::{to, Data};
use actix_web::{App, HttpServer};
use anyhow::{anyhow, Context, Result};
use log::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tracing_unwrap::ResultExt;

use crate::config::Config;
use crate::routing::RouteTable;

mod config;
mod error;
mod prelude;
mod repository;
mod routes;
mod routing;
mod utils;

#[actix_rt::main]
async fn main() -> Result<()> {
    let _log_guards = init_logger()?;

    let config = Config::from_env()?;
    let bind_address = config.bind_address.clone();

    // Built exactly once, before any traffic is accepted. A broken table is a
    // startup failure, never a partially working server.
    let table = Data::new(RouteTable::new().context("Unable to build route table")?);
    let config = Data::new(config);

    info!("Serving repositories from {}", config.repos_dir.display());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(table.clone())
            .app_data(config.clone())
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async {
                    let mut res = fut.await?;

                    if res.request().path().contains("/repo/download") {
                        res.headers_mut().insert(
                            CACHE_CONTROL, HeaderValue::from_static("no-cache, max-age=0, must-revalidate"),
                        );
                    }

                    res.headers_mut().insert(
                        ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"),
                    );

                    Ok(res)
                }
            })
            .default_service(to(routes::repository::dispatch))
    }).bind(bind_address.as_str()).context("Unable to bind HTTP server.")?;

    server.run().await.context("Unable to start HTTP server.")?;

    info!("Thank you and goodbye.");

    Ok(())
}

fn init_logger() -> Result<Vec<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|err| {
        let not_found = err.source()
            .map(|o| o.downcast_ref::<VarError>().map_or_else(|| false, |err| matches!(err, VarError::NotPresent)))
            .unwrap_or(false);

        if !not_found {
            eprintln!("Warning: Unable to parse `{}` environment variable, using default values: {}", EnvFilter::DEFAULT_ENV, err);
        }

        let level = if cfg!(debug_assertions) {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        EnvFilter::default()
            .add_directive(level.into())
            .add_directive("actix_server=info".parse().unwrap_or_log())
            .add_directive("hyper=info".parse().unwrap_or_log())
            .add_directive("mio=info".parse().unwrap_or_log())
    });

    let mut results = Vec::<WorkerGuard>::with_capacity(2);

    // In debug mode we only write to stdout (pretty), in production to stdout and to a file (json)
    if cfg!(debug_assertions) {
        let (writer, guard) = tracing_appender::non_blocking(io::stdout());
        results.push(guard);

        FmtSubscriber::builder()
            .with_writer(writer)
            .with_env_filter(env_filter)
            .with_thread_ids(true)
            .try_init()
            .map_err(|err| anyhow!(err))?; // https://github.com/dtolnay/anyhow/issues/83
    } else {
        let logs_dir = Path::new("logs");

        if !logs_dir.exists() {
            std::fs::create_dir_all(logs_dir)?;
        }

        let appender = rolling::daily("logs", "repohub");
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

        let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(io::stdout());

        results.push(file_guard);
        results.push(stdout_guard);

        FmtSubscriber::builder()
            .with_writer(stdout_writer)
            .with_writer(file_writer)
            .with_env_filter(env_filter)
            .with_thread_ids(true)
            .json()
            .try_init()
            .map_err(|err| anyhow!(err))?; // https://github.com/dtolnay/anyhow/issues/83
    }

    results.shrink_to_fit();
    Ok(results)
}
