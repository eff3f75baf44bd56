use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use derive_more::Display;
use log::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display)]
pub enum Error {
    #[display("{_0}")]
    Unauthorized(&'static str),

    #[display("{_0}")]
    InvalidInput(&'static str),

    #[display("upstream request failed: {_0}")]
    Upstream(reqwest::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Upstream(_) = self {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.to_string() }))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Upstream(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_map_to_unauthorized() {
        assert_eq!(
            Error::Unauthorized("missing bearer token").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn missing_fields_map_to_bad_request() {
        assert_eq!(
            Error::InvalidInput("missing drink_id").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
