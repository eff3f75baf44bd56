use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// `fav_drinks` holds catalog identifiers (not `_id`s); `reviews` and
/// `producer_reviews` hold references to documents owned by this user.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub fav_drinks: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<ObjectId>,
    #[serde(default)]
    pub producer_reviews: Vec<ObjectId>,
    #[serde(default)]
    pub preferred_style: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

impl User {
    pub fn new(username: &str, password: &str, preferred_style: Option<String>) -> User {
        User {
            id: None,
            username: username.to_owned(),
            password: password.to_owned(),
            fav_drinks: Vec::new(),
            reviews: Vec::new(),
            producer_reviews: Vec::new(),
            preferred_style,
            bio: String::new(),
            last_login: None,
        }
    }
}

/// Immutable catalog item. `id` is the stable catalog identifier, kept
/// separate from the store-internal `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drink {
    pub id: String,
    pub name: String,
    pub category: String,
    pub abv: f64,
    pub description: String,
    pub producer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub id: String,
    pub name: String,
    pub producer_type: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub drink_id: String,
    pub rating: f64,
    pub review: String,
    #[serde(default)]
    pub tastes: Vec<String>,
    pub user_id: ObjectId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProducerReview {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub producer_id: String,
    pub rating: f64,
    pub review: String,
    #[serde(default)]
    pub tastes: Vec<String>,
    pub user_id: ObjectId,
}

/// A catalog item with its producer attached. The join is best-effort:
/// a missing producer serializes as `null`, it never drops the drink.
#[derive(Debug, Serialize)]
pub struct DrinkWithProducer {
    #[serde(flatten)]
    pub drink: Drink,
    pub producer: Option<Producer>,
}

/// One entry of a favorites listing. A favorite identifier whose catalog
/// entry has disappeared still produces an entry, with null fields.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FavoriteEntry {
    Resolved {
        #[serde(flatten)]
        drink: Drink,
        producer: Option<Producer>,
    },
    Dangling {
        id: String,
        producer: Option<Producer>,
    },
}

/// A drink review as seen by visitors of a drink page.
#[derive(Debug, Serialize)]
pub struct ReviewWithUser {
    pub id: String,
    pub drink_id: String,
    pub rating: f64,
    pub review: String,
    pub tastes: Vec<String>,
    pub user: Option<String>,
}

/// A drink review in the owner's "my reviews" listing, fanned out to the
/// catalog record it targets.
#[derive(Debug, Serialize)]
pub struct MyReview {
    pub id: String,
    pub drink_id: String,
    pub rating: f64,
    pub review: String,
    pub tastes: Vec<String>,
    pub user: String,
    pub drink: Option<Drink>,
}

#[derive(Debug, Serialize)]
pub struct ProducerReviewWithUser {
    pub id: String,
    pub producer_id: String,
    pub rating: f64,
    pub review: String,
    pub tastes: Vec<String>,
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MyProducerReview {
    pub id: String,
    pub producer_id: String,
    pub rating: f64,
    pub review: String,
    pub tastes: Vec<String>,
    pub user: String,
    pub producer: Option<Producer>,
}

/// One row of the top-rated listing. Both joins are left joins.
#[derive(Debug, Serialize)]
pub struct TopRatedEntry {
    pub drink: Option<Drink>,
    pub producer: Option<Producer>,
    pub avg_rating: f64,
    pub review_count: i64,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub preferred_style: Option<String>,
    pub last_login: Option<String>,
    pub review_count: usize,
    pub rank: &'static str,
}
