use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::json;

use super::error::{Error, Result};
use super::models::{
    MyProducerReview, MyReview, ProducerReview, ProducerReviewWithUser, Review, ReviewWithUser,
    User,
};
use super::store::Store;
use super::users::UserQuery;

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub username: String,
    pub drink_id: String,
    pub rating: f64,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub tastes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProducerReviewForm {
    pub username: String,
    pub producer_id: String,
    pub rating: f64,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub tastes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerForm {
    pub username: String,
}

async fn lookup_user(store: &Store, username: &str) -> Result<User> {
    store
        .users()
        .find_one(doc! { "username": username })
        .await?
        .ok_or(Error::NotFound("user"))
}

fn user_object_id(user: &User) -> Result<ObjectId> {
    // Users read back from the store always carry an _id.
    user.id.ok_or(Error::NotFound("user"))
}

/// Verdict of the direct duplicate lookup: any prior review by this user
/// for this target forbids a second one, whatever its rating or text.
fn reject_duplicate<T>(prior: Option<T>, message: &'static str) -> Result<()> {
    match prior {
        Some(_) => Err(Error::Conflict(message)),
        None => Ok(()),
    }
}

/// Ownership is decided by the stored user reference alone; usernames play
/// no part in it.
fn ensure_owner(user: &User, owner_id: ObjectId) -> Result<()> {
    if user.id == Some(owner_id) {
        Ok(())
    } else {
        Err(Error::Forbidden("you are not the owner of this review"))
    }
}

/// `POST /reviews`
///
/// Duplicate prevention is a direct lookup on the (user, drink) pair. The
/// review insert and the reference append are two writes; the append itself
/// is a single atomic array update.
pub async fn add_review(store: Data<Store>, form: Json<ReviewForm>) -> Result<HttpResponse> {
    let user = lookup_user(&store, &form.username).await?;
    let user_id = user_object_id(&user)?;

    if store
        .drinks()
        .find_one(doc! { "id": &form.drink_id })
        .await?
        .is_none()
    {
        return Err(Error::NotFound("drink"));
    }

    let prior = store
        .reviews()
        .find_one(doc! { "user_id": user_id, "drink_id": &form.drink_id })
        .await?;
    reject_duplicate(prior, "you have already reviewed this drink")?;

    let review_id = ObjectId::new();
    store
        .reviews()
        .insert_one(Review {
            id: Some(review_id),
            drink_id: form.drink_id.clone(),
            rating: form.rating,
            review: form.review.clone(),
            tastes: form.tastes.clone(),
            user_id,
        })
        .await?;
    store
        .users()
        .update_one(
            doc! { "_id": user_id },
            doc! { "$addToSet": { "reviews": review_id } },
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "review added",
        "id": review_id.to_hex(),
    })))
}

/// `GET /reviews` — the requester's reviews, fanned out to the catalog
/// records they target. Output follows store iteration order.
pub async fn get_my_reviews(store: Data<Store>, query: Query<UserQuery>) -> Result<HttpResponse> {
    let user = lookup_user(&store, &query.username).await?;

    let reviews: Vec<Review> = store
        .reviews()
        .find(doc! { "_id": { "$in": &user.reviews } })
        .await?
        .try_collect()
        .await?;

    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        let drink = store.drinks().find_one(doc! { "id": &review.drink_id }).await?;
        out.push(MyReview {
            id: review.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            drink_id: review.drink_id,
            rating: review.rating,
            review: review.review,
            tastes: review.tastes,
            user: user.username.clone(),
            drink,
        });
    }

    Ok(HttpResponse::Ok().json(out))
}

/// `DELETE /reviews/{review_id}`
///
/// Ownership is compared on the stored user reference, not the username.
pub async fn delete_review(
    store: Data<Store>,
    path: Path<String>,
    form: Json<OwnerForm>,
) -> Result<HttpResponse> {
    let review_id = ObjectId::parse_str(path.as_str()).map_err(|_| Error::NotFound("review"))?;

    let review = store
        .reviews()
        .find_one(doc! { "_id": review_id })
        .await?
        .ok_or(Error::NotFound("review"))?;

    let user = lookup_user(&store, &form.username).await?;
    ensure_owner(&user, review.user_id)?;

    store.reviews().delete_one(doc! { "_id": review_id }).await?;
    store
        .users()
        .update_one(
            doc! { "_id": review.user_id },
            doc! { "$pull": { "reviews": review_id } },
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "review deleted" })))
}

/// `GET /reviews/drink/{drink_id}` — all reviews of one drink, with each
/// reviewer's display name attached (null if the account is gone).
pub async fn get_drink_reviews(store: Data<Store>, path: Path<String>) -> Result<HttpResponse> {
    if store
        .drinks()
        .find_one(doc! { "id": path.as_str() })
        .await?
        .is_none()
    {
        return Err(Error::NotFound("drink"));
    }

    let reviews: Vec<Review> = store
        .reviews()
        .find(doc! { "drink_id": path.as_str() })
        .await?
        .try_collect()
        .await?;

    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        let reviewer = store
            .users()
            .find_one(doc! { "_id": review.user_id })
            .await?;
        out.push(ReviewWithUser {
            id: review.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            drink_id: review.drink_id,
            rating: review.rating,
            review: review.review,
            tastes: review.tastes,
            user: reviewer.map(|u| u.username),
        });
    }

    Ok(HttpResponse::Ok().json(out))
}

/// `POST /producer-reviews` — mirror of `add_review`, scoped to a producer.
pub async fn add_producer_review(
    store: Data<Store>,
    form: Json<ProducerReviewForm>,
) -> Result<HttpResponse> {
    let user = lookup_user(&store, &form.username).await?;
    let user_id = user_object_id(&user)?;

    if store
        .producers()
        .find_one(doc! { "id": &form.producer_id })
        .await?
        .is_none()
    {
        return Err(Error::NotFound("producer"));
    }

    let prior = store
        .producer_reviews()
        .find_one(doc! { "user_id": user_id, "producer_id": &form.producer_id })
        .await?;
    reject_duplicate(prior, "you have already reviewed this producer")?;

    let review_id = ObjectId::new();
    store
        .producer_reviews()
        .insert_one(ProducerReview {
            id: Some(review_id),
            producer_id: form.producer_id.clone(),
            rating: form.rating,
            review: form.review.clone(),
            tastes: form.tastes.clone(),
            user_id,
        })
        .await?;
    store
        .users()
        .update_one(
            doc! { "_id": user_id },
            doc! { "$addToSet": { "producer_reviews": review_id } },
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "producer review added",
        "id": review_id.to_hex(),
    })))
}

/// `GET /producer-reviews`
pub async fn get_my_producer_reviews(
    store: Data<Store>,
    query: Query<UserQuery>,
) -> Result<HttpResponse> {
    let user = lookup_user(&store, &query.username).await?;

    let reviews: Vec<ProducerReview> = store
        .producer_reviews()
        .find(doc! { "_id": { "$in": &user.producer_reviews } })
        .await?
        .try_collect()
        .await?;

    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        let producer = store
            .producers()
            .find_one(doc! { "id": &review.producer_id })
            .await?;
        out.push(MyProducerReview {
            id: review.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            producer_id: review.producer_id,
            rating: review.rating,
            review: review.review,
            tastes: review.tastes,
            user: user.username.clone(),
            producer,
        });
    }

    Ok(HttpResponse::Ok().json(out))
}

/// `DELETE /producer-reviews/{review_id}`
pub async fn delete_producer_review(
    store: Data<Store>,
    path: Path<String>,
    form: Json<OwnerForm>,
) -> Result<HttpResponse> {
    let review_id = ObjectId::parse_str(path.as_str()).map_err(|_| Error::NotFound("review"))?;

    let review = store
        .producer_reviews()
        .find_one(doc! { "_id": review_id })
        .await?
        .ok_or(Error::NotFound("review"))?;

    let user = lookup_user(&store, &form.username).await?;
    ensure_owner(&user, review.user_id)?;

    store
        .producer_reviews()
        .delete_one(doc! { "_id": review_id })
        .await?;
    store
        .users()
        .update_one(
            doc! { "_id": review.user_id },
            doc! { "$pull": { "producer_reviews": review_id } },
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "producer review deleted" })))
}

/// `GET /reviews/producer/{producer_id}`
pub async fn get_producer_reviews(store: Data<Store>, path: Path<String>) -> Result<HttpResponse> {
    if store
        .producers()
        .find_one(doc! { "id": path.as_str() })
        .await?
        .is_none()
    {
        return Err(Error::NotFound("producer"));
    }

    let reviews: Vec<ProducerReview> = store
        .producer_reviews()
        .find(doc! { "producer_id": path.as_str() })
        .await?
        .try_collect()
        .await?;

    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        let reviewer = store
            .users()
            .find_one(doc! { "_id": review.user_id })
            .await?;
        out.push(ProducerReviewWithUser {
            id: review.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            producer_id: review.producer_id,
            rating: review.rating,
            review: review.review,
            tastes: review.tastes,
            user: reviewer.map(|u| u.username),
        });
    }

    Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_is_compared_on_stored_ids_not_usernames() {
        let owner_id = ObjectId::new();
        let mut owner = User::new("alice", "digest", None);
        owner.id = Some(owner_id);

        let mut impostor = User::new("alice", "digest", None);
        impostor.id = Some(ObjectId::new());

        // Same username, different identity: only the stored id matters.
        assert!(ensure_owner(&owner, owner_id).is_ok());
        assert!(matches!(
            ensure_owner(&impostor, owner_id),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn any_prior_review_is_a_conflict_whatever_its_content() {
        let glowing = Review {
            id: Some(ObjectId::new()),
            drink_id: "12".to_owned(),
            rating: 5.0,
            review: "superb".to_owned(),
            tastes: vec!["citrus".to_owned()],
            user_id: ObjectId::new(),
        };
        assert!(matches!(
            reject_duplicate(Some(glowing), "you have already reviewed this drink"),
            Err(Error::Conflict(_))
        ));

        let terse = Review {
            id: Some(ObjectId::new()),
            drink_id: "12".to_owned(),
            rating: 1.0,
            review: String::new(),
            tastes: vec![],
            user_id: ObjectId::new(),
        };
        assert!(matches!(
            reject_duplicate(Some(terse), "you have already reviewed this drink"),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn no_prior_review_passes_the_duplicate_check() {
        assert!(reject_duplicate::<Review>(None, "you have already reviewed this drink").is_ok());
    }

    #[test]
    fn malformed_review_ids_read_as_absent() {
        assert!(ObjectId::parse_str("not-an-object-id").is_err());
    }
}
