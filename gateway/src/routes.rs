use std::collections::HashMap;

use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use serde_json::{json, Value};

use super::auth::AuthUser;
use super::client::{DataApi, NO_QUERY};
use super::error::{Error, Result};

/// Pull a field out of a JSON body as a string, accepting bare numbers the
/// way the original clients send identifiers.
fn string_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn protected(user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": format!("Welcome, {}", user.username) }))
}

pub async fn get_drinks(
    api: Data<DataApi>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    api.get("/drinks", &query.into_inner()).await
}

pub async fn get_drink_categories(api: Data<DataApi>) -> Result<HttpResponse> {
    api.get("/drinks/categories", NO_QUERY).await
}

pub async fn get_producers(
    api: Data<DataApi>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    api.get("/producers", &query.into_inner()).await
}

pub async fn get_producer(api: Data<DataApi>, path: Path<String>) -> Result<HttpResponse> {
    api.get(&format!("/producers/{}", path.as_str()), NO_QUERY).await
}

pub async fn add_favorite(
    user: AuthUser,
    api: Data<DataApi>,
    body: Json<Value>,
) -> Result<HttpResponse> {
    let drink_id =
        string_field(&body, "drink_id").ok_or(Error::InvalidInput("missing drink_id"))?;
    api.post(
        "/add_to_favorites",
        &json!({ "username": user.username, "drink_id": drink_id }),
    )
    .await
}

pub async fn get_favorites(user: AuthUser, api: Data<DataApi>) -> Result<HttpResponse> {
    api.get("/get_favorites", &[("username", user.username)]).await
}

pub async fn remove_favorite(
    user: AuthUser,
    api: Data<DataApi>,
    body: Json<Value>,
) -> Result<HttpResponse> {
    let drink_id =
        string_field(&body, "drink_id").ok_or(Error::InvalidInput("missing drink_id"))?;
    api.delete(
        "/remove_from_favorites",
        &json!({ "username": user.username, "drink_id": drink_id }),
    )
    .await
}

pub async fn get_recommendations(
    user: AuthUser,
    api: Data<DataApi>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    let mut query = query.into_inner();
    query.insert("username".to_owned(), user.username);
    api.get("/recommendations", &query).await
}

pub async fn get_top_rated(
    api: Data<DataApi>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    api.get("/top_rated", &query.into_inner()).await
}

pub async fn get_drink_reviews(api: Data<DataApi>, path: Path<String>) -> Result<HttpResponse> {
    api.get(&format!("/reviews/drink/{}", path.as_str()), NO_QUERY).await
}

pub async fn add_review(
    user: AuthUser,
    api: Data<DataApi>,
    body: Json<Value>,
) -> Result<HttpResponse> {
    let drink_id = string_field(&body, "drink_id");
    let rating = body.get("rating").and_then(Value::as_f64);
    let (Some(drink_id), Some(rating)) = (drink_id, rating) else {
        return Err(Error::InvalidInput("missing required fields"));
    };

    api.post(
        "/reviews",
        &json!({
            "username": user.username,
            "drink_id": drink_id,
            "rating": rating,
            "review": body.get("review").and_then(Value::as_str).unwrap_or(""),
            "tastes": body.get("tastes").cloned().unwrap_or_else(|| json!([])),
        }),
    )
    .await
}

pub async fn get_my_reviews(user: AuthUser, api: Data<DataApi>) -> Result<HttpResponse> {
    api.get("/reviews", &[("username", user.username)]).await
}

pub async fn delete_review(
    user: AuthUser,
    api: Data<DataApi>,
    path: Path<String>,
) -> Result<HttpResponse> {
    api.delete(
        &format!("/reviews/{}", path.as_str()),
        &json!({ "username": user.username }),
    )
    .await
}

pub async fn get_producer_reviews(api: Data<DataApi>, path: Path<String>) -> Result<HttpResponse> {
    api.get(&format!("/reviews/producer/{}", path.as_str()), NO_QUERY).await
}

pub async fn add_producer_review(
    user: AuthUser,
    api: Data<DataApi>,
    body: Json<Value>,
) -> Result<HttpResponse> {
    let producer_id = string_field(&body, "producer_id");
    let rating = body.get("rating").and_then(Value::as_f64);
    let (Some(producer_id), Some(rating)) = (producer_id, rating) else {
        return Err(Error::InvalidInput("missing required fields"));
    };

    api.post(
        "/producer-reviews",
        &json!({
            "username": user.username,
            "producer_id": producer_id,
            "rating": rating,
            "review": body.get("review").and_then(Value::as_str).unwrap_or(""),
            "tastes": body.get("tastes").cloned().unwrap_or_else(|| json!([])),
        }),
    )
    .await
}

pub async fn get_my_producer_reviews(user: AuthUser, api: Data<DataApi>) -> Result<HttpResponse> {
    api.get("/producer-reviews", &[("username", user.username)]).await
}

pub async fn delete_producer_review(
    user: AuthUser,
    api: Data<DataApi>,
    path: Path<String>,
) -> Result<HttpResponse> {
    api.delete(
        &format!("/producer-reviews/{}", path.as_str()),
        &json!({ "username": user.username }),
    )
    .await
}

pub async fn get_profile(user: AuthUser, api: Data<DataApi>) -> Result<HttpResponse> {
    api.get("/profile", &[("username", user.username)]).await
}

pub async fn update_profile(
    user: AuthUser,
    api: Data<DataApi>,
    body: Json<Value>,
) -> Result<HttpResponse> {
    api.put(
        "/profile",
        &json!({
            "username": user.username,
            "bio": body.get("bio").cloned().unwrap_or(Value::Null),
            "preferred_style": body.get("preferred_style").cloned().unwrap_or(Value::Null),
        }),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_may_arrive_as_strings_or_numbers() {
        assert_eq!(
            string_field(&json!({ "drink_id": "12" }), "drink_id"),
            Some("12".to_owned())
        );
        assert_eq!(
            string_field(&json!({ "drink_id": 12 }), "drink_id"),
            Some("12".to_owned())
        );
        assert_eq!(string_field(&json!({}), "drink_id"), None);
        assert_eq!(string_field(&json!({ "drink_id": [] }), "drink_id"), None);
    }
}
