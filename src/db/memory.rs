use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::{ItineraryStore, StoreError, UserStore};
use crate::models::{
    itinerary::{Destination, Itinerary, Preferences},
    user::User,
};

struct TripEntry {
    itinerary: Option<Itinerary>,
    preferences: Option<Preferences>,
    days: BTreeMap<i64, Vec<Destination>>,
}

impl TripEntry {
    fn empty() -> Self {
        Self {
            itinerary: None,
            preferences: None,
            days: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
struct State {
    trips: HashMap<String, TripEntry>,
    users: HashMap<String, User>,
}

impl State {
    fn day(&self, trip_id: &str, day_id: i64) -> Option<&Vec<Destination>> {
        self.trips.get(trip_id).and_then(|trip| trip.days.get(&day_id))
    }

    fn day_mut(&mut self, trip_id: &str, day_id: i64) -> Option<&mut Vec<Destination>> {
        self.trips
            .get_mut(trip_id)
            .and_then(|trip| trip.days.get_mut(&day_id))
    }

    // Drops entries nothing points at any more, like a document store would.
    fn prune(&mut self, trip_id: &str) {
        let unused = self.trips.get(trip_id).is_some_and(|trip| {
            trip.itinerary.is_none() && trip.preferences.is_none() && trip.days.is_empty()
        });
        if unused {
            self.trips.remove(trip_id);
        }
    }
}

/// Process-local store with the same record layout as the MongoDB backend.
/// Records are independent: a day can outlive its itinerary record, just as
/// it can in the document store when a cascade is interrupted.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_itinerary(&self, itinerary: &Itinerary) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let entry = state
            .trips
            .entry(itinerary.trip_id.clone())
            .or_insert_with(TripEntry::empty);
        if entry.itinerary.is_some() {
            return Err(StoreError::Duplicate(format!(
                "itinerary {}",
                itinerary.trip_id
            )));
        }
        entry.itinerary = Some(itinerary.clone());
        Ok(())
    }

    async fn find_itinerary(&self, trip_id: &str) -> Result<Option<Itinerary>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .trips
            .get(trip_id)
            .and_then(|trip| trip.itinerary.clone()))
    }

    async fn list_itineraries(&self, owner: Option<&str>) -> Result<Vec<Itinerary>, StoreError> {
        let state = self.state.read().await;
        let mut itineraries: Vec<Itinerary> = state
            .trips
            .values()
            .filter_map(|trip| trip.itinerary.as_ref())
            .filter(|itinerary| owner.map_or(true, |owner| itinerary.user_id == owner))
            .cloned()
            .collect();
        itineraries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.trip_id.cmp(&b.trip_id))
        });
        Ok(itineraries)
    }

    async fn delete_itinerary(&self, trip_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(trip) = state.trips.get_mut(trip_id) {
            trip.itinerary = None;
        }
        state.prune(trip_id);
        Ok(())
    }

    async fn put_preferences(
        &self,
        trip_id: &str,
        preferences: &Preferences,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .trips
            .entry(trip_id.to_string())
            .or_insert_with(TripEntry::empty)
            .preferences = Some(preferences.clone());
        Ok(())
    }

    async fn find_preferences(&self, trip_id: &str) -> Result<Option<Preferences>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .trips
            .get(trip_id)
            .and_then(|trip| trip.preferences.clone()))
    }

    async fn delete_preferences(&self, trip_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(trip) = state.trips.get_mut(trip_id) {
            trip.preferences = None;
        }
        state.prune(trip_id);
        Ok(())
    }

    async fn insert_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let trip = state
            .trips
            .entry(trip_id.to_string())
            .or_insert_with(TripEntry::empty);
        if trip.days.contains_key(&day_id) {
            return Err(StoreError::Duplicate(format!("day {} of {}", day_id, trip_id)));
        }
        trip.days.insert(day_id, Vec::new());
        Ok(())
    }

    async fn day_exists(&self, trip_id: &str, day_id: i64) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state.day(trip_id, day_id).is_some())
    }

    async fn list_days(&self, trip_id: &str) -> Result<Vec<i64>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .trips
            .get(trip_id)
            .map(|trip| trip.days.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn delete_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(trip) = state.trips.get_mut(trip_id) {
            trip.days.remove(&day_id);
        }
        state.prune(trip_id);
        Ok(())
    }

    async fn insert_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        destination: &Destination,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let day = state.day_mut(trip_id, day_id).ok_or_else(|| {
            StoreError::Backend(format!("day {} of {} does not exist", day_id, trip_id))
        })?;
        if day.iter().any(|existing| existing.name == destination.name) {
            return Err(StoreError::Duplicate(format!(
                "destination {} in day {}",
                destination.name, day_id
            )));
        }
        day.push(destination.clone());
        Ok(())
    }

    async fn find_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<Option<Destination>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .day(trip_id, day_id)
            .and_then(|day| day.iter().find(|d| d.name == name).cloned()))
    }

    async fn list_destinations(
        &self,
        trip_id: &str,
        day_id: i64,
    ) -> Result<Vec<Destination>, StoreError> {
        let state = self.state.read().await;
        Ok(state.day(trip_id, day_id).cloned().unwrap_or_default())
    }

    async fn delete_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(day) = state.day_mut(trip_id, day_id) {
            day.retain(|d| d.name != name);
        }
        Ok(())
    }

    async fn delete_destinations(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(day) = state.day_mut(trip_id, day_id) {
            day.clear();
        }
        Ok(())
    }

    async fn move_destination(
        &self,
        trip_id: &str,
        source_day: i64,
        target_day: i64,
        name: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        let position = match state
            .day(trip_id, source_day)
            .and_then(|day| day.iter().position(|d| d.name == name))
        {
            Some(position) => position,
            None => return Ok(false),
        };
        if source_day == target_day {
            return Ok(true);
        }

        match state.day(trip_id, target_day) {
            None => {
                return Err(StoreError::Backend(format!(
                    "day {} of {} does not exist",
                    target_day, trip_id
                )))
            }
            Some(day) if day.iter().any(|d| d.name == name) => {
                return Err(StoreError::Duplicate(format!(
                    "destination {} in day {}",
                    name, target_day
                )))
            }
            Some(_) => {}
        }

        // Both days were checked above under the same write lock.
        let destination = match state.day_mut(trip_id, source_day) {
            Some(day) => day.remove(position),
            None => return Ok(false),
        };
        if let Some(day) = state.day_mut(trip_id, target_day) {
            day.push(destination);
        }
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {}", user.id)));
        }
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(format!("username {}", user.username)));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn add_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            if !user.saved_itineraries.iter().any(|id| id == trip_id) {
                user.saved_itineraries.push(trip_id.to_string());
            }
            user.clone()
        }))
    }

    async fn remove_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            user.saved_itineraries.retain(|id| id != trip_id);
            user.clone()
        }))
    }
}
