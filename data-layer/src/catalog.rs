use std::collections::HashMap;

use actix_web::web::{Data, Path, Query};
use actix_web::HttpResponse;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

use super::error::{Error, Result};
use super::models::{Drink, DrinkWithProducer};
use super::store::Store;

/// Attach the producer to a drink. Left join: a dangling or absent
/// `producer_id` yields `producer: null`.
pub async fn with_producer(store: &Store, drink: Drink) -> Result<DrinkWithProducer> {
    let producer = match &drink.producer_id {
        Some(producer_id) => store.producers().find_one(doc! { "id": producer_id }).await?,
        None => None,
    };
    Ok(DrinkWithProducer { drink, producer })
}

pub async fn with_producers(store: &Store, drinks: Vec<Drink>) -> Result<Vec<DrinkWithProducer>> {
    let mut out = Vec::with_capacity(drinks.len());
    for drink in drinks {
        out.push(with_producer(store, drink).await?);
    }
    Ok(out)
}

/// Query-string keys that may become filter fields. Anything else,
/// operator keys like `$where` included, is dropped.
const FILTER_FIELDS: &[&str] = &[
    "id",
    "name",
    "category",
    "producer_id",
    "producer_type",
    "city",
    "country",
];

fn filter_from_query(query: &HashMap<String, String>) -> Document {
    let mut filter = Document::new();
    for (key, value) in query {
        if FILTER_FIELDS.contains(&key.as_str()) {
            filter.insert(key.clone(), value.clone());
        }
    }
    filter
}

/// `GET /drinks` — catalog listing, optionally filtered by exact matches
/// on a fixed set of string fields taken from the query string.
pub async fn get_drinks(
    store: Data<Store>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    let drinks: Vec<Drink> = store
        .drinks()
        .find(filter_from_query(&query))
        .await?
        .try_collect()
        .await?;
    let out = with_producers(&store, drinks).await?;
    Ok(HttpResponse::Ok().json(out))
}

/// `GET /drinks/categories` — the distinct category tags in the catalog.
pub async fn get_categories(store: Data<Store>) -> Result<HttpResponse> {
    let categories: Vec<String> = store
        .drinks()
        .distinct("category", doc! {})
        .await?
        .iter()
        .filter_map(|value| value.as_str().map(str::to_owned))
        .collect();
    Ok(HttpResponse::Ok().json(categories))
}

/// `GET /producers`
pub async fn get_producers(
    store: Data<Store>,
    query: Query<HashMap<String, String>>,
) -> Result<HttpResponse> {
    let producers: Vec<_> = store
        .producers()
        .find(filter_from_query(&query))
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(producers))
}

/// `GET /producers/{producer_id}`
pub async fn get_producer(store: Data<Store>, path: Path<String>) -> Result<HttpResponse> {
    let producer = store
        .producers()
        .find_one(doc! { "id": path.as_str() })
        .await?
        .ok_or(Error::NotFound("producer"))?;
    Ok(HttpResponse::Ok().json(producer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_become_an_exact_match_filter() {
        let mut query = HashMap::new();
        query.insert("category".to_owned(), "IPA".to_owned());
        let filter = filter_from_query(&query);
        assert_eq!(filter.get_str("category").unwrap(), "IPA");
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(filter_from_query(&HashMap::new()).is_empty());
    }

    #[test]
    fn unknown_and_operator_keys_never_reach_the_store() {
        let mut query = HashMap::new();
        query.insert("category".to_owned(), "IPA".to_owned());
        query.insert("$where".to_owned(), "sleep(1000)".to_owned());
        query.insert("fav_drinks".to_owned(), "44".to_owned());
        let filter = filter_from_query(&query);
        assert_eq!(filter.get_str("category").unwrap(), "IPA");
        assert_eq!(filter.len(), 1);
    }
}
