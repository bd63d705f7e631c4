//! Storage for itineraries, their days and destinations, and user records.
//!
//! Two backends implement the traits below: [`mongo::MongoStore`] for
//! deployments and [`memory::MemoryStore`] for tests and local runs without a
//! database. Neither offers multi-record transactions, so the services compose
//! the cascading operations out of single-record calls.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    itinerary::{Destination, Itinerary, Preferences},
    user::User,
};

pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was hit (trip id, day, destination name, username).
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn insert_itinerary(&self, itinerary: &Itinerary) -> Result<(), StoreError>;
    async fn find_itinerary(&self, trip_id: &str) -> Result<Option<Itinerary>, StoreError>;
    /// Newest first. `owner` restricts the listing to one user's trips.
    async fn list_itineraries(&self, owner: Option<&str>) -> Result<Vec<Itinerary>, StoreError>;
    async fn delete_itinerary(&self, trip_id: &str) -> Result<(), StoreError>;

    async fn put_preferences(
        &self,
        trip_id: &str,
        preferences: &Preferences,
    ) -> Result<(), StoreError>;
    async fn find_preferences(&self, trip_id: &str) -> Result<Option<Preferences>, StoreError>;
    async fn delete_preferences(&self, trip_id: &str) -> Result<(), StoreError>;

    async fn insert_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError>;
    async fn day_exists(&self, trip_id: &str, day_id: i64) -> Result<bool, StoreError>;
    /// Day ids in ascending order.
    async fn list_days(&self, trip_id: &str) -> Result<Vec<i64>, StoreError>;
    async fn delete_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError>;

    async fn insert_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        destination: &Destination,
    ) -> Result<(), StoreError>;
    async fn find_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<Option<Destination>, StoreError>;
    /// Insertion order.
    async fn list_destinations(
        &self,
        trip_id: &str,
        day_id: i64,
    ) -> Result<Vec<Destination>, StoreError>;
    /// Removing a destination that is not there is not an error.
    async fn delete_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<(), StoreError>;
    async fn delete_destinations(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError>;
    /// Re-homes one destination, appending it to the target day. Returns
    /// `Ok(false)` when the source day does not hold it and
    /// `Err(StoreError::Duplicate)` when the target day already has the name.
    async fn move_destination(
        &self,
        trip_id: &str,
        source_day: i64,
        target_day: i64,
        name: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// `None` when the user does not exist.
    async fn add_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn remove_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError>;
}
