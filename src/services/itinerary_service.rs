use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::db::{ItineraryStore, StoreError};
use crate::error::ApiError;
use crate::models::itinerary::{DayView, Itinerary, ItineraryView, MoveDestination, NewItinerary};

/// Operations on the itinerary → day → destination tree.
///
/// The store has no multi-record transactions. Create and delete write one
/// record at a time, so a failure partway leaves a partial tree behind; the
/// failing step is logged with the trip id.
#[derive(Clone)]
pub struct ItineraryService {
    store: Arc<dyn ItineraryStore>,
}

impl ItineraryService {
    pub fn new(store: Arc<dyn ItineraryStore>) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    pub async fn exists(&self, trip_id: &str) -> Result<bool, ApiError> {
        Ok(self.store.find_itinerary(trip_id).await?.is_some())
    }

    async fn require(&self, trip_id: &str) -> Result<Itinerary, ApiError> {
        self.store
            .find_itinerary(trip_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Itinerary not found".to_string()))
    }

    pub async fn create(&self, input: NewItinerary) -> Result<String, ApiError> {
        input.validate().map_err(ApiError::BadRequest)?;

        let itinerary = input.to_itinerary(Utc::now());
        self.store.insert_itinerary(&itinerary).await?;

        let trip_id = itinerary.trip_id;
        if let Err(err) = self.write_tree(&trip_id, &input).await {
            warn!(
                "Itinerary {} partially written, no rollback attempted: {}",
                trip_id, err
            );
            return Err(err.into());
        }

        info!(
            "Created itinerary {} with {} days for user {}",
            trip_id,
            input.days.len(),
            itinerary.user_id
        );
        Ok(trip_id)
    }

    async fn write_tree(&self, trip_id: &str, input: &NewItinerary) -> Result<(), StoreError> {
        self.store
            .put_preferences(trip_id, &input.preferences)
            .await?;
        for day in &input.days {
            self.store.insert_day(trip_id, day.day_id).await?;
            for destination in &day.destinations {
                self.store
                    .insert_destination(trip_id, day.day_id, destination)
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn view(&self, trip_id: &str) -> Result<ItineraryView, ApiError> {
        let itinerary = self.require(trip_id).await?;
        let preferences = self.store.find_preferences(trip_id).await?;

        let mut days = Vec::new();
        for day_id in self.store.list_days(trip_id).await? {
            let destinations = self.store.list_destinations(trip_id, day_id).await?;
            days.push(DayView {
                day_id,
                destinations,
            });
        }

        Ok(ItineraryView {
            itinerary,
            preferences,
            days,
        })
    }

    /// Deletes children before parents, so an interrupted delete leaves the
    /// itinerary visible and the request can simply be repeated.
    pub async fn delete(&self, trip_id: &str) -> Result<(), ApiError> {
        self.require(trip_id).await?;

        for day_id in self.store.list_days(trip_id).await? {
            self.store.delete_destinations(trip_id, day_id).await?;
            self.store.delete_day(trip_id, day_id).await?;
        }
        self.store.delete_preferences(trip_id).await?;
        self.store.delete_itinerary(trip_id).await?;

        info!("Deleted itinerary {}", trip_id);
        Ok(())
    }

    pub async fn delete_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<(), ApiError> {
        self.require(trip_id).await?;
        if !self.store.day_exists(trip_id, day_id).await? {
            return Err(ApiError::NotFound("Day not found".to_string()));
        }

        // Missing destinations are not reported.
        self.store.delete_destination(trip_id, day_id, name).await?;
        Ok(())
    }

    pub async fn move_destination(
        &self,
        trip_id: &str,
        request: MoveDestination,
    ) -> Result<(), ApiError> {
        let (source_day, target_day, name) =
            match (request.source_day_id, request.target_day_id, request.dest_name) {
                (Some(source), Some(target), Some(name)) if !name.is_empty() => {
                    (source, target, name)
                }
                _ => return Err(ApiError::BadRequest("Missing required parameters".to_string())),
            };

        self.require(trip_id).await?;
        if !self.store.day_exists(trip_id, source_day).await? {
            return Err(ApiError::NotFound("Source day not found".to_string()));
        }
        if !self.store.day_exists(trip_id, target_day).await? {
            return Err(ApiError::NotFound("Target day not found".to_string()));
        }
        if self
            .store
            .find_destination(trip_id, source_day, &name)
            .await?
            .is_none()
        {
            return Err(ApiError::NotFound(
                "Destination not found in source day".to_string(),
            ));
        }
        if source_day == target_day {
            return Ok(());
        }
        if self
            .store
            .find_destination(trip_id, target_day, &name)
            .await?
            .is_some()
        {
            return Err(ApiError::BadRequest(
                "Destination already exists in target day".to_string(),
            ));
        }

        match self
            .store
            .move_destination(trip_id, source_day, target_day, &name)
            .await
        {
            Ok(true) => {
                info!(
                    "Moved '{}' in itinerary {} from day {} to day {}",
                    name, trip_id, source_day, target_day
                );
                Ok(())
            }
            // Another request moved or deleted it after the checks above.
            Ok(false) => Err(ApiError::NotFound(
                "Destination not found in source day".to_string(),
            )),
            Err(StoreError::Duplicate(_)) => Err(ApiError::BadRequest(
                "Destination already exists in target day".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Itinerary>, ApiError> {
        Ok(self.store.list_itineraries(None).await?)
    }

    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Itinerary>, ApiError> {
        Ok(self.store.list_itineraries(Some(user_id)).await?)
    }
}
