mod credentials;
mod error;

use std::str::FromStr;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use self::credentials::{hash_password, issue_token};
use self::error::{Error, Result};

#[derive(Clone)]
struct AppConfig {
    http: reqwest::Client,
    data_api_url: String,
    jwt_secret: String,
}

impl AppConfig {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.data_api_url, path)
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
    #[serde(default)]
    preferred_style: Option<String>,
}

/// `POST /register` — hash the password and relay the data layer's verdict.
async fn register(
    config: web::Data<AppConfig>,
    form: web::Json<CredentialsForm>,
) -> Result<HttpResponse> {
    let response = config
        .http
        .post(config.url("/register_user"))
        .json(&json!({
            "username": form.username,
            "password": hash_password(&form.password),
            "preferred_style": form.preferred_style,
        }))
        .send()
        .await?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap_or(Value::Null);
    Ok(HttpResponse::build(status).json(body))
}

/// `POST /login` — verify credentials against the data layer and issue a
/// bearer token. The last-login notification is fire-and-forget: it never
/// delays or fails the login response.
async fn login(
    config: web::Data<AppConfig>,
    form: web::Json<CredentialsForm>,
) -> Result<HttpResponse> {
    let response = config
        .http
        .post(config.url("/user_exists"))
        .json(&json!({
            "username": form.username,
            "password": hash_password(&form.password),
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::Unauthorized("invalid credentials, please try again"));
    }

    let token = issue_token(&form.username, &config.jwt_secret)?;
    notify_last_login(config.get_ref().clone(), form.username.clone());

    Ok(HttpResponse::Ok().json(json!({ "access_token": token })))
}

fn notify_last_login(config: AppConfig, username: String) {
    actix_web::rt::spawn(async move {
        let sent = config
            .http
            .post(config.url("/last_login"))
            .json(&json!({ "username": username }))
            .send()
            .await;
        if let Err(err) = sent {
            warn!("last-login notification failed: {}", err);
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let port = u16::from_str(&std::env::var("PORT").unwrap_or("5050".into()))
        .expect("Failed to parse $PORT!");
    let ip = std::net::IpAddr::from_str(&std::env::var("LISTEN_IP").unwrap_or("127.0.0.1".into()))
        .expect("Failed to parse $LISTEN_IP");
    let listen_addr = std::net::SocketAddr::new(ip, port);

    let config = AppConfig {
        http: reqwest::Client::new(),
        data_api_url: std::env::var("DATA_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5051".into()),
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET must be set!"),
    };

    info!("Listening on {}", listen_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(web::resource("/register").route(web::post().to(register)))
            .service(web::resource("/login").route(web::post().to(login)))
    })
    .bind(listen_addr)?
    .run()
    .await
}
