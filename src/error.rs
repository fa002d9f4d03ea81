use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied data that breaks a business rule.
    #[error("{0}")]
    Validation(String),

    /// A referenced film or user does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_found(kind: &str, id: u64) -> Self {
        Error::NotFound(format!("{} {} not found", kind, id))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    description: String,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Error::NotFound(message) => ErrorResponse {
                error: "not found",
                description: message.clone(),
            },
            Error::Validation(message) => ErrorResponse {
                error: "invalid input",
                description: message.clone(),
            },
            _ => {
                log::error!("{:?}", self);
                ErrorResponse {
                    error: "unexpected error",
                    description: "an unexpected error occurred".to_owned(),
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            Error::not_found("film", 1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::validation("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::Internal("boom".to_owned()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message() {
        assert_eq!(Error::not_found("user", 7).to_string(), "user 7 not found");
    }
}
