use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use anyhow::Error as AnyhowError;
use log::error;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

/// Typed "fail the request with this status" error, carried inside an [anyhow::Error].
/// Usually constructed through the [err!](crate::err) and [die!](crate::die) macros.
#[derive(Error, Debug)]
#[error("{1}")]
pub(crate) struct HttpError(pub(crate) u16, pub(crate) String);

pub(crate) struct RepoHubError {
    error: AnyhowError
}

impl Display for RepoHubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.error)
    }
}

impl Debug for RepoHubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.error)
    }
}

impl Serialize for RepoHubError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
    {
        let cause = format!("{}", self.error);

        let mut state = serializer.serialize_struct("RepoHubError", 1)?;
        state.serialize_field("error", cause.as_str())?;
        state.end()
    }
}

impl From<AnyhowError> for RepoHubError {
    fn from(error: AnyhowError) -> Self {
        RepoHubError { error }
    }
}

impl ResponseError for RepoHubError {
    fn status_code(&self) -> StatusCode {
        if let Some(HttpError(status_code, _)) = self.error.downcast_ref::<HttpError>() {
            StatusCode::from_u16(*status_code).unwrap_or(StatusCode::IM_A_TEAPOT) // A programmer passed an invalid status code
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if let Some(HttpError(_, message)) = self.error.downcast_ref::<HttpError>() {
            message.as_str()
        } else {
            "Internal server error occurred"
        };

        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!("Error occurred while handling route: {}", self.error.root_cause())
        }

        let json = json!({
            "error": message
        });

        HttpResponse::build(status_code).json(json)
    }
}

/// Builds an [anyhow::Error] holding a [HttpError] with the given status code and message.
///
/// # Example
///
/// ```
/// let error = err!(NOT_FOUND, "Repository not found");
/// ```
#[macro_export]
macro_rules! err {
    ($status:ident, $($arg:tt)+) => {
        anyhow::Error::new($crate::error::HttpError(actix_web::http::StatusCode::$status.as_u16(), format!($($arg)+)))
    };
}

/// Immediately returns from the current function with an [err!](crate::err) result.
#[macro_export]
macro_rules! die {
    ($status:ident, $($arg:tt)+) => {
        return Err($crate::err!($status, $($arg)+))
    };
}
