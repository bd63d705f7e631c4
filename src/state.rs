use std::sync::Arc;

use crate::db::{ItineraryStore, UserStore};
use crate::services::{
    itinerary_generation_service::ItineraryGenerationService,
    itinerary_service::ItineraryService, openai_service::TextGenerator,
    user_service::UserService,
};

/// Services shared by every worker, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub itineraries: ItineraryService,
    pub users: UserService,
    pub generation: ItineraryGenerationService,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, generator: Option<Arc<dyn TextGenerator>>) -> Self
    where
        S: ItineraryStore + UserStore + 'static,
    {
        let itinerary_store: Arc<dyn ItineraryStore> = store.clone();
        let user_store: Arc<dyn UserStore> = store;

        let itineraries = ItineraryService::new(itinerary_store);
        let users = UserService::new(user_store, itineraries.clone());

        Self {
            itineraries,
            users,
            generation: ItineraryGenerationService::new(generator),
        }
    }
}
