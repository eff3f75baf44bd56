use actix_web::web::{Data, Json, Query};
use actix_web::HttpResponse;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;

use super::catalog;
use super::error::{Error, Result};
use super::models::FavoriteEntry;
use super::store::Store;
use super::users::UserQuery;

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub username: String,
    pub drink_id: String,
}

/// Classify an add whose membership-qualified update matched nothing:
/// either the user is unknown, or the identifier is already in the set.
fn rejected_add(user_exists: bool) -> Error {
    if user_exists {
        Error::Conflict("drink already in favorites")
    } else {
        Error::NotFound("user")
    }
}

/// Mirror of [`rejected_add`] for removals: an unmatched pull means the
/// identifier was never in the set.
fn rejected_remove(user_exists: bool) -> Error {
    if user_exists {
        Error::InvalidState("drink not in favorites")
    } else {
        Error::NotFound("user")
    }
}

/// `POST /add_to_favorites`
///
/// The membership test and the append are one atomic update: the filter
/// only matches a user document that does not already hold the identifier,
/// so two racing adds cannot both take effect.
pub async fn add_to_favorites(
    store: Data<Store>,
    form: Json<FavoriteForm>,
) -> Result<HttpResponse> {
    if store
        .drinks()
        .find_one(doc! { "id": &form.drink_id })
        .await?
        .is_none()
    {
        return Err(Error::NotFound("drink"));
    }

    let updated = store
        .users()
        .update_one(
            doc! { "username": &form.username, "fav_drinks": { "$ne": &form.drink_id } },
            doc! { "$addToSet": { "fav_drinks": &form.drink_id } },
        )
        .await?;

    if updated.matched_count == 0 {
        let user_exists = store
            .users()
            .find_one(doc! { "username": &form.username })
            .await?
            .is_some();
        return Err(rejected_add(user_exists));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "drink added to favorites" })))
}

/// `DELETE /remove_from_favorites`
pub async fn remove_from_favorites(
    store: Data<Store>,
    form: Json<FavoriteForm>,
) -> Result<HttpResponse> {
    let updated = store
        .users()
        .update_one(
            doc! { "username": &form.username, "fav_drinks": &form.drink_id },
            doc! { "$pull": { "fav_drinks": &form.drink_id } },
        )
        .await?;

    if updated.matched_count == 0 {
        let user_exists = store
            .users()
            .find_one(doc! { "username": &form.username })
            .await?
            .is_some();
        return Err(rejected_remove(user_exists));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "drink removed from favorites" })))
}

/// `GET /get_favorites`
///
/// Resolves each stored identifier in stored order. The catalog join is
/// best-effort: an identifier with no catalog entry still yields an entry,
/// with null drink and producer fields.
pub async fn get_favorites(store: Data<Store>, query: Query<UserQuery>) -> Result<HttpResponse> {
    let user = store
        .users()
        .find_one(doc! { "username": &query.username })
        .await?
        .ok_or(Error::NotFound("user"))?;

    let mut out = Vec::with_capacity(user.fav_drinks.len());
    for drink_id in user.fav_drinks {
        match store.drinks().find_one(doc! { "id": &drink_id }).await? {
            Some(drink) => {
                let joined = catalog::with_producer(&store, drink).await?;
                out.push(FavoriteEntry::Resolved {
                    drink: joined.drink,
                    producer: joined.producer,
                });
            }
            None => out.push(FavoriteEntry::Dangling {
                id: drink_id,
                producer: None,
            }),
        }
    }

    Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Drink;

    #[test]
    fn adding_an_already_held_favorite_is_a_conflict() {
        // The atomic update matched nothing but the user exists, so the
        // identifier must already be in the set.
        assert!(matches!(rejected_add(true), Error::Conflict(_)));
    }

    #[test]
    fn adding_for_an_unknown_user_is_not_found() {
        assert!(matches!(rejected_add(false), Error::NotFound(_)));
    }

    #[test]
    fn removing_an_absent_favorite_is_invalid_state() {
        assert!(matches!(rejected_remove(true), Error::InvalidState(_)));
    }

    #[test]
    fn removing_for_an_unknown_user_is_not_found() {
        assert!(matches!(rejected_remove(false), Error::NotFound(_)));
    }

    #[test]
    fn dangling_favorite_serializes_with_null_producer() {
        let entry = FavoriteEntry::Dangling {
            id: "44".to_owned(),
            producer: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], "44");
        assert!(value["producer"].is_null());
        assert!(value.get("name").is_none());
    }

    #[test]
    fn resolved_favorite_flattens_drink_fields() {
        let entry = FavoriteEntry::Resolved {
            drink: Drink {
                id: "12".to_owned(),
                name: "Twelve Mile".to_owned(),
                category: "IPA".to_owned(),
                abv: 6.4,
                description: "west coast".to_owned(),
                producer_id: None,
            },
            producer: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], "12");
        assert_eq!(value["category"], "IPA");
        assert!(value["producer"].is_null());
    }
}
