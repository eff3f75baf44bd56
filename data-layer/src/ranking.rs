use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use serde::Deserialize;

use super::error::Result;
use super::models::TopRatedEntry;
use super::store::Store;

/// A reviewer with this many drink reviews or fewer is still a novice.
pub const NOVICE_MAX_REVIEWS: usize = 5;

/// Coarse reviewer tier, derived from review count alone.
pub fn compute_rank(review_count: usize) -> &'static str {
    if review_count <= NOVICE_MAX_REVIEWS {
        "Novice"
    } else {
        "Expert"
    }
}

/// 1-indexed pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl Page {
    /// Saturates rather than overflows: both fields arrive from the query
    /// string and may hold arbitrary u64 values.
    pub fn skip(&self) -> u64 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.per_page).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

pub fn first_page() -> u64 {
    1
}

pub fn default_per_page() -> u64 {
    10
}

fn default_min_reviews() -> i64 {
    1
}

/// Primary sort key for the top-rated listing. The other statistic is
/// always the secondary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Avg,
    Count,
}

/// Per-drink review statistics, as produced by the store's `$group` stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingGroup {
    #[serde(rename = "_id")]
    pub drink_id: String,
    pub avg_rating: f64,
    pub review_count: i64,
}

/// Drop groups under the review-count threshold and order the rest by the
/// selected key, descending, with the other statistic breaking ties.
///
/// Full ties keep their incoming order (stable sort), which is the store's
/// natural iteration order — accepted non-determinism, not imposed on.
pub fn rank_groups(
    mut groups: Vec<RatingGroup>,
    min_reviews: i64,
    sort: SortKey,
) -> Vec<RatingGroup> {
    groups.retain(|g| g.review_count >= min_reviews);
    match sort {
        SortKey::Avg => groups.sort_by(|a, b| {
            b.avg_rating
                .total_cmp(&a.avg_rating)
                .then(b.review_count.cmp(&a.review_count))
        }),
        SortKey::Count => groups.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then(b.avg_rating.total_cmp(&a.avg_rating))
        }),
    }
    groups
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn group_by_drink_pipeline() -> Vec<Document> {
    vec![doc! {
        "$group": {
            "_id": "$drink_id",
            "avg_rating": { "$avg": "$rating" },
            "review_count": { "$sum": 1 },
        }
    }]
}

#[derive(Debug, Deserialize)]
pub struct TopRatedQuery {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    #[serde(default = "default_min_reviews")]
    pub min_reviews: i64,
    #[serde(default)]
    pub sort: SortKey,
}

/// `GET /top_rated` — catalog items ranked by aggregate review statistics.
///
/// Grouping runs in the store; threshold, ordering, pagination and the
/// drink/producer left joins happen here.
pub async fn top_rated(store: Data<Store>, query: Query<TopRatedQuery>) -> Result<HttpResponse> {
    let mut cursor = store.reviews().aggregate(group_by_drink_pipeline()).await?;

    let mut groups = Vec::new();
    while let Some(group) = cursor.try_next().await? {
        groups.push(bson::from_document::<RatingGroup>(group)?);
    }

    let page = Page {
        page: query.page,
        per_page: query.per_page,
    };
    let ranked = page.slice(rank_groups(groups, query.min_reviews, query.sort));

    let mut out = Vec::with_capacity(ranked.len());
    for group in ranked {
        let drink = store.drinks().find_one(doc! { "id": &group.drink_id }).await?;
        let producer = match drink.as_ref().and_then(|d| d.producer_id.as_ref()) {
            Some(producer_id) => store.producers().find_one(doc! { "id": producer_id }).await?,
            None => None,
        };
        out.push(TopRatedEntry {
            drink,
            producer,
            avg_rating: round2(group.avg_rating),
            review_count: group.review_count,
        });
    }

    Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(drink_id: &str, avg_rating: f64, review_count: i64) -> RatingGroup {
        RatingGroup {
            drink_id: drink_id.to_owned(),
            avg_rating,
            review_count,
        }
    }

    #[test]
    fn rank_is_novice_up_to_five_reviews() {
        for count in [0, 1, 5] {
            assert_eq!(compute_rank(count), "Novice");
        }
    }

    #[test]
    fn rank_is_expert_past_five_reviews() {
        for count in [6, 100] {
            assert_eq!(compute_rank(count), "Expert");
        }
    }

    #[test]
    fn groups_below_the_review_threshold_never_appear() {
        let ranked = rank_groups(
            vec![group("a", 5.0, 2), group("b", 3.0, 3), group("c", 4.0, 4)],
            3,
            SortKey::Avg,
        );
        assert!(ranked.iter().all(|g| g.drink_id != "a"));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn avg_sort_prefers_rating_over_count() {
        // A: avg 4.5 over 2 reviews, B: avg 4.8 over 1 review. B wins.
        let ranked = rank_groups(
            vec![group("a", 4.5, 2), group("b", 4.8, 1)],
            1,
            SortKey::Avg,
        );
        assert_eq!(ranked[0].drink_id, "b");
        assert_eq!(ranked[1].drink_id, "a");
    }

    #[test]
    fn avg_sort_breaks_ties_by_count() {
        let ranked = rank_groups(
            vec![group("a", 4.5, 2), group("b", 4.5, 7)],
            1,
            SortKey::Avg,
        );
        assert_eq!(ranked[0].drink_id, "b");
    }

    #[test]
    fn count_sort_breaks_ties_by_rating() {
        let ranked = rank_groups(
            vec![group("a", 2.0, 4), group("b", 4.9, 4), group("c", 1.0, 9)],
            1,
            SortKey::Count,
        );
        assert_eq!(ranked[0].drink_id, "c");
        assert_eq!(ranked[1].drink_id, "b");
        assert_eq!(ranked[2].drink_id, "a");
    }

    #[test]
    fn full_ties_keep_store_order() {
        let ranked = rank_groups(
            vec![group("first", 4.0, 2), group("second", 4.0, 2)],
            1,
            SortKey::Avg,
        );
        assert_eq!(ranked[0].drink_id, "first");
        assert_eq!(ranked[1].drink_id, "second");
    }

    #[test]
    fn pages_are_one_indexed() {
        let items: Vec<u64> = (0..25).collect();
        let first = Page { page: 1, per_page: 10 };
        let third = Page { page: 3, per_page: 10 };
        assert_eq!(first.slice(items.clone()), (0..10).collect::<Vec<_>>());
        assert_eq!(third.slice(items.clone()), (20..25).collect::<Vec<_>>());
        assert!(Page { page: 4, per_page: 10 }.slice(items).is_empty());
    }

    #[test]
    fn page_zero_is_treated_as_the_first_page() {
        let items: Vec<u64> = (0..5).collect();
        let page = Page { page: 0, per_page: 3 };
        assert_eq!(page.slice(items), vec![0, 1, 2]);
    }

    #[test]
    fn oversized_page_values_saturate_instead_of_overflowing() {
        let page = Page {
            page: u64::MAX,
            per_page: u64::MAX,
        };
        assert_eq!(page.skip(), u64::MAX);
        assert_eq!(page.limit(), i64::MAX);
        assert!(page.slice((0..5).collect::<Vec<u64>>()).is_empty());
    }

    #[test]
    fn mean_ratings_round_to_two_decimals() {
        assert_eq!(round2(4.666_666_7), 4.67);
        assert_eq!(round2(4.0), 4.0);
        assert_eq!(round2(3.333_333_3), 3.33);
    }
}
