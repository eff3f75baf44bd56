use std::path::Path;

use log::info;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;

use super::error::{Error, Result};
use super::models::{Drink, Producer, ProducerReview, Review, User};

/// Handle on the document store. Cheap to clone; the driver pools
/// connections internally.
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    pub async fn connect(uri: &str) -> Result<Store> {
        let client = Client::with_uri_str(uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database("taplist"));
        Ok(Store { db })
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn drinks(&self) -> Collection<Drink> {
        self.db.collection("drinks")
    }

    pub fn producers(&self) -> Collection<Producer> {
        self.db.collection("producers")
    }

    pub fn reviews(&self) -> Collection<Review> {
        self.db.collection("reviews")
    }

    pub fn producer_reviews(&self) -> Collection<ProducerReview> {
        self.db.collection("producer_reviews")
    }

    /// One-time catalog bootstrap. Idempotent: the admin account is inserted
    /// only if absent, catalog collections only if empty.
    pub async fn seed(&self, data_dir: &Path) -> Result<()> {
        let unique_username = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(unique_username).await?;

        if self
            .users()
            .find_one(doc! { "username": "admin" })
            .await?
            .is_none()
        {
            self.users()
                .insert_one(User::new("admin", "admin", None))
                .await?;
            info!("seeded admin user");
        }

        if self.drinks().estimated_document_count().await? == 0 {
            let drinks: Vec<Drink> = load_seed_file(&data_dir.join("drinks.json"))?;
            if !drinks.is_empty() {
                info!("seeding {} drinks", drinks.len());
                self.drinks().insert_many(drinks).await?;
            }
        }

        if self.producers().estimated_document_count().await? == 0 {
            let producers: Vec<Producer> = load_seed_file(&data_dir.join("producers.json"))?;
            if !producers.is_empty() {
                info!("seeding {} producers", producers.len());
                self.producers().insert_many(producers).await?;
            }
        }

        Ok(())
    }
}

fn load_seed_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path).map_err(Error::SeedIo)?;
    serde_json::from_str(&raw).map_err(Error::SeedJson)
}
