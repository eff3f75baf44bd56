use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use derive_more::Display;
use log::error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for catalog operations.
///
/// Every handler classifies its failures into exactly one of these kinds;
/// each kind maps to one stable status code. Callers branch on the status,
/// never on message text.
#[derive(Debug, Display)]
pub enum Error {
    #[display("{_0} not found")]
    NotFound(&'static str),

    #[display("{_0}")]
    Conflict(&'static str),

    #[display("{_0}")]
    Forbidden(&'static str),

    #[display("{_0}")]
    InvalidState(&'static str),

    #[display("{_0}")]
    InvalidInput(&'static str),

    #[display("{_0}")]
    Unauthorized(&'static str),

    #[display("store error: {_0}")]
    Store(mongodb::error::Error),

    #[display("malformed stored document: {_0}")]
    Bson(mongodb::bson::de::Error),

    #[display("seed data error: {_0}")]
    SeedIo(std::io::Error),

    #[display("seed data error: {_0}")]
    SeedJson(serde_json::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Bson(_) | Self::SeedIo(_) | Self::SeedJson(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.to_string() }))
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Error {
        Error::Store(e)
    }
}

impl From<mongodb::bson::de::Error> for Error {
    fn from(e: mongodb::bson::de::Error) -> Error {
        Error::Bson(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_failure_kind_has_a_distinct_status() {
        assert_eq!(Error::NotFound("drink").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Conflict("drink already in favorites").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Forbidden("not the owner").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::InvalidState("drink not in favorites").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::InvalidInput("nothing to update").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Unauthorized("invalid username or password").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(Error::NotFound("producer").to_string(), "producer not found");
    }
}
