use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::db::{StoreError, UserStore};
use crate::error::ApiError;
use crate::models::itinerary::{Itinerary, ItinerarySummary};
use crate::models::user::{NewUser, User};
use crate::services::itinerary_service::ItineraryService;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    itineraries: ItineraryService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, itineraries: ItineraryService) -> Self {
        Self { store, itineraries }
    }

    pub async fn create(&self, input: NewUser) -> Result<User, ApiError> {
        input.validate().map_err(ApiError::BadRequest)?;

        if self
            .store
            .find_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let user = input.into_user(Utc::now());
        match self.store.insert_user(&user).await {
            Ok(()) => {
                info!("Registered user {} ({})", user.id, user.username);
                Ok(user)
            }
            Err(StoreError::Duplicate(what)) => Err(ApiError::Conflict(format!(
                "User already exists: {}",
                what
            ))),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, ApiError> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("No account found with username {}", username))
            })
    }

    /// Pairs each itinerary with its owner's username, looking each owner up once.
    pub async fn with_owner_names(
        &self,
        itineraries: Vec<Itinerary>,
    ) -> Result<Vec<ItinerarySummary>, ApiError> {
        let mut usernames: HashMap<String, Option<String>> = HashMap::new();
        let mut summaries = Vec::with_capacity(itineraries.len());
        for itinerary in itineraries {
            let owner_username = match usernames.get(&itinerary.user_id) {
                Some(username) => username.clone(),
                None => {
                    let username = self
                        .store
                        .find_user(&itinerary.user_id)
                        .await?
                        .map(|user| user.username);
                    usernames.insert(itinerary.user_id.clone(), username.clone());
                    username
                }
            };
            summaries.push(ItinerarySummary {
                itinerary,
                owner_username,
            });
        }
        Ok(summaries)
    }

    pub async fn save_itinerary(&self, user_id: &str, trip_id: &str) -> Result<User, ApiError> {
        if !self.itineraries.exists(trip_id).await? {
            return Err(ApiError::NotFound("Itinerary not found".to_string()));
        }
        self.store
            .add_saved_itinerary(user_id, trip_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn unsave_itinerary(&self, user_id: &str, trip_id: &str) -> Result<User, ApiError> {
        self.store
            .remove_saved_itinerary(user_id, trip_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
    }
}
