use actix_web::web::{Data, Json, Query};
use actix_web::HttpResponse;
use chrono::Utc;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;

use super::error::{Error, Result};
use super::models::{Profile, User};
use super::ranking::compute_rank;
use super::store::Store;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub preferred_style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferred_style: Option<String>,
}

/// `POST /register_user`
///
/// The username pre-check mirrors client expectations; the unique index
/// created at seed time is what actually guarantees uniqueness.
pub async fn register_user(store: Data<Store>, form: Json<RegisterForm>) -> Result<HttpResponse> {
    if store
        .users()
        .find_one(doc! { "username": &form.username })
        .await?
        .is_some()
    {
        return Err(Error::Conflict("username already exists"));
    }

    store
        .users()
        .insert_one(User::new(
            &form.username,
            &form.password,
            form.preferred_style.clone(),
        ))
        .await?;

    Ok(HttpResponse::Created().json(json!({ "message": "user created successfully" })))
}

/// `POST /user_exists` — credential check for the identity issuer. The
/// password field carries a digest; comparison is exact.
pub async fn user_exists(store: Data<Store>, form: Json<CredentialsForm>) -> Result<HttpResponse> {
    match store
        .users()
        .find_one(doc! { "username": &form.username })
        .await?
    {
        Some(user) if user.password == form.password => {
            Ok(HttpResponse::Ok().json(json!({ "message": "user exists" })))
        }
        _ => Err(Error::Unauthorized("invalid username or password")),
    }
}

/// `GET /profile`
pub async fn get_profile(store: Data<Store>, query: Query<UserQuery>) -> Result<HttpResponse> {
    let user = store
        .users()
        .find_one(doc! { "username": &query.username })
        .await?
        .ok_or(Error::NotFound("user"))?;

    let review_count = user.reviews.len();
    Ok(HttpResponse::Ok().json(Profile {
        username: user.username,
        bio: user.bio,
        preferred_style: user.preferred_style,
        last_login: user.last_login,
        review_count,
        rank: compute_rank(review_count),
    }))
}

/// `PUT /profile` — partial update; a body with nothing to apply is a no-op
/// and reported as such.
pub async fn update_profile(store: Data<Store>, form: Json<ProfileForm>) -> Result<HttpResponse> {
    let mut update = doc! {};
    if let Some(bio) = &form.bio {
        update.insert("bio", bio);
    }
    if let Some(preferred_style) = &form.preferred_style {
        update.insert("preferred_style", preferred_style);
    }
    if update.is_empty() {
        return Err(Error::InvalidInput("nothing to update"));
    }

    let updated = store
        .users()
        .update_one(doc! { "username": &form.username }, doc! { "$set": update })
        .await?;
    if updated.matched_count == 0 {
        return Err(Error::NotFound("user"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "profile updated" })))
}

/// `POST /last_login` — best-effort timestamp update fired by the identity
/// issuer after a successful login.
pub async fn set_last_login(store: Data<Store>, form: Json<UserQuery>) -> Result<HttpResponse> {
    let now = Utc::now().to_rfc3339();
    let updated = store
        .users()
        .update_one(
            doc! { "username": &form.username },
            doc! { "$set": { "last_login": &now } },
        )
        .await?;
    if updated.matched_count == 0 {
        return Err(Error::NotFound("user"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "last login updated", "last_login": now })))
}
