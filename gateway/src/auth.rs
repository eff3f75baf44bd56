use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Shared HS256 secret, held in app data.
#[derive(Clone)]
pub struct TokenSecret(pub String);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header. Handlers taking this parameter reject unauthenticated requests
/// before any forwarding happens.
#[derive(Debug)]
pub struct AuthUser {
    pub username: String,
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<AuthUser>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser> {
    let secret = req
        .app_data::<web::Data<TokenSecret>>()
        .ok_or(Error::Unauthorized("token secret not configured"))?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Unauthorized("missing bearer token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(Error::Unauthorized("missing bearer token"))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.0.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| Error::Unauthorized("invalid bearer token"))?;

    Ok(AuthUser {
        username: data.claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(username: &str, secret: &str) -> String {
        let claims = Claims {
            sub: username.to_owned(),
            exp: 4_102_444_800, // 2100-01-01
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn request_with(header_value: Option<String>) -> HttpRequest {
        let mut req = TestRequest::default().app_data(web::Data::new(TokenSecret("s3cret".into())));
        if let Some(value) = header_value {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        req.to_http_request()
    }

    #[test]
    fn valid_token_yields_its_subject() {
        let req = request_with(Some(format!("Bearer {}", token("admin", "s3cret"))));
        let user = authenticate(&req).unwrap();
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn missing_header_is_rejected() {
        let req = request_with(None);
        assert!(authenticate(&req).is_err());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let req = request_with(Some(format!("Bearer {}", token("admin", "wrong"))));
        assert!(authenticate(&req).is_err());
    }

    #[test]
    fn non_bearer_schemes_are_rejected() {
        let req = request_with(Some("Basic YWRtaW46YWRtaW4=".to_owned()));
        assert!(authenticate(&req).is_err());
    }
}
