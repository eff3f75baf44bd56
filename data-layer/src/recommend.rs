use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde::Deserialize;

use super::catalog;
use super::error::{Error, Result};
use super::models::{Drink, DrinkWithProducer};
use super::ranking::{default_per_page, first_page, Page};
use super::store::Store;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub username: String,
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

/// The categories of a user's favorite drinks. Repeats are kept; the
/// catalog membership query is set-based either way.
pub fn favorite_categories(favorites: &[Drink]) -> Vec<String> {
    favorites.iter().map(|d| d.category.clone()).collect()
}

/// `GET /recommendations` — catalog items sharing a category with any of
/// the user's favorites, paginated.
pub async fn recommendations(
    store: Data<Store>,
    query: Query<RecommendQuery>,
) -> Result<HttpResponse> {
    let user = store
        .users()
        .find_one(doc! { "username": &query.username })
        .await?
        .ok_or(Error::NotFound("user"))?;

    // An empty favorite set is an empty page, not an error.
    if user.fav_drinks.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<DrinkWithProducer>::new()));
    }

    let favorites: Vec<Drink> = store
        .drinks()
        .find(doc! { "id": { "$in": &user.fav_drinks } })
        .await?
        .try_collect()
        .await?;
    let categories = favorite_categories(&favorites);

    let page = Page {
        page: query.page,
        per_page: query.per_page,
    };
    let drinks: Vec<Drink> = store
        .drinks()
        .find(doc! { "category": { "$in": categories } })
        .skip(page.skip())
        .limit(page.limit())
        .await?
        .try_collect()
        .await?;

    let out = catalog::with_producers(&store, drinks).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drink(id: &str, category: &str) -> Drink {
        Drink {
            id: id.to_owned(),
            name: format!("drink {id}"),
            category: category.to_owned(),
            abv: 5.0,
            description: String::new(),
            producer_id: None,
        }
    }

    #[test]
    fn no_favorites_means_no_categories() {
        assert!(favorite_categories(&[]).is_empty());
    }

    #[test]
    fn repeated_categories_are_kept() {
        let favorites = [drink("1", "IPA"), drink("2", "Stout"), drink("3", "IPA")];
        assert_eq!(favorite_categories(&favorites), ["IPA", "Stout", "IPA"]);
    }
}
