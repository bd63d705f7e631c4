#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use tripplanner_api::{
    db::{memory::MemoryStore, ItineraryStore, StoreError, UserStore},
    models::{
        itinerary::{Destination, Itinerary, Preferences},
        user::User,
    },
    routes,
    services::openai_service::{GenerationError, TextGenerator},
    state::AppState,
};

/// Replays a canned model reply and records the prompts it was given.
pub struct ScriptedGenerator {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(GenerationError::EmptyResponse)
    }
}

pub fn scripted(generator: &Arc<ScriptedGenerator>) -> Option<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = generator.clone();
    Some(generator)
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_generator(None)
    }

    pub fn with_generator(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = web::Data::new(AppState::new(store.clone(), generator));
        Self { store, state }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        app_with_state(self.state.clone())
    }
}

/// The full route table over an arbitrary store.
pub fn app_with_state(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).configure(routes::configure)
}

pub const STORE_OFFLINE: &str = "store offline";

/// A store whose every call fails, standing in for an unreachable database.
pub struct FailingStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Backend(STORE_OFFLINE.to_string()))
}

#[async_trait]
impl ItineraryStore for FailingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        offline()
    }
    async fn insert_itinerary(&self, _: &Itinerary) -> Result<(), StoreError> {
        offline()
    }
    async fn find_itinerary(&self, _: &str) -> Result<Option<Itinerary>, StoreError> {
        offline()
    }
    async fn list_itineraries(&self, _: Option<&str>) -> Result<Vec<Itinerary>, StoreError> {
        offline()
    }
    async fn delete_itinerary(&self, _: &str) -> Result<(), StoreError> {
        offline()
    }
    async fn put_preferences(&self, _: &str, _: &Preferences) -> Result<(), StoreError> {
        offline()
    }
    async fn find_preferences(&self, _: &str) -> Result<Option<Preferences>, StoreError> {
        offline()
    }
    async fn delete_preferences(&self, _: &str) -> Result<(), StoreError> {
        offline()
    }
    async fn insert_day(&self, _: &str, _: i64) -> Result<(), StoreError> {
        offline()
    }
    async fn day_exists(&self, _: &str, _: i64) -> Result<bool, StoreError> {
        offline()
    }
    async fn list_days(&self, _: &str) -> Result<Vec<i64>, StoreError> {
        offline()
    }
    async fn delete_day(&self, _: &str, _: i64) -> Result<(), StoreError> {
        offline()
    }
    async fn insert_destination(&self, _: &str, _: i64, _: &Destination) -> Result<(), StoreError> {
        offline()
    }
    async fn find_destination(
        &self,
        _: &str,
        _: i64,
        _: &str,
    ) -> Result<Option<Destination>, StoreError> {
        offline()
    }
    async fn list_destinations(&self, _: &str, _: i64) -> Result<Vec<Destination>, StoreError> {
        offline()
    }
    async fn delete_destination(&self, _: &str, _: i64, _: &str) -> Result<(), StoreError> {
        offline()
    }
    async fn delete_destinations(&self, _: &str, _: i64) -> Result<(), StoreError> {
        offline()
    }
    async fn move_destination(&self, _: &str, _: i64, _: i64, _: &str) -> Result<bool, StoreError> {
        offline()
    }
}

#[async_trait]
impl UserStore for FailingStore {
    async fn insert_user(&self, _: &User) -> Result<(), StoreError> {
        offline()
    }
    async fn find_user(&self, _: &str) -> Result<Option<User>, StoreError> {
        offline()
    }
    async fn find_user_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
        offline()
    }
    async fn add_saved_itinerary(&self, _: &str, _: &str) -> Result<Option<User>, StoreError> {
        offline()
    }
    async fn remove_saved_itinerary(&self, _: &str, _: &str) -> Result<Option<User>, StoreError> {
        offline()
    }
}

pub fn eiffel_tower() -> Value {
    json!({ "name": "Eiffel Tower", "latitude": 48.8584, "longitude": 2.2945 })
}

/// Itinerary body with `days` days of `per_day` uniquely named destinations each.
pub fn itinerary_body(trip_id: &str, user_id: &str, days: i64, per_day: usize) -> Value {
    let days: Vec<Value> = (1..=days)
        .map(|day| {
            let destinations: Vec<Value> = (0..per_day)
                .map(|n| {
                    json!({
                        "name": format!("Stop {}-{}", day, n),
                        "latitude": 40.0 + n as f64 / 100.0,
                        "longitude": -3.0 - day as f64 / 100.0,
                    })
                })
                .collect();
            json!({ "dayId": day, "destinations": destinations })
        })
        .collect();

    json!({
        "tripId": trip_id,
        "startDate": "2024-06-01",
        "endDate": "2024-06-07",
        "userId": user_id,
        "tripName": format!("Trip {}", trip_id),
        "preferences": {
            "pace": "relaxed",
            "budget": "1500",
            "group": "couple",
            "interests": ["food", "history"]
        },
        "days": days
    })
}

pub fn get_test_user_id() -> String {
    "test_user_123".to_string()
}
