use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::scalar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub trip_id: String,
    pub user_id: String,
    pub trip_name: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub pace: String,
    #[serde(default, deserialize_with = "scalar::loose_string")]
    pub budget: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    #[serde(deserialize_with = "scalar::coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "scalar::coordinate")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl Destination {
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Destination name must not be empty".to_string());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!(
                "Latitude {} of '{}' is out of range",
                self.latitude, self.name
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "Longitude {} of '{}' is out of range",
                self.longitude, self.name
            ));
        }
        Ok(())
    }
}

/// Checks a day's destination list: valid entries, no repeated names.
pub fn check_destinations(day_id: i64, destinations: &[Destination]) -> Result<(), String> {
    let mut names = HashSet::new();
    for destination in destinations {
        destination.check()?;
        if !names.insert(destination.name.as_str()) {
            return Err(format!(
                "Destination '{}' appears more than once in day {}",
                destination.name, day_id
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDay {
    #[serde(deserialize_with = "scalar::day_number")]
    pub day_id: i64,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

/*
    Body of POST /api/createItinerary
*/
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItinerary {
    pub trip_id: String,
    pub user_id: String,
    pub trip_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub days: Vec<NewDay>,
}

impl NewItinerary {
    pub fn validate(&self) -> Result<(), String> {
        if self.trip_id.trim().is_empty() {
            return Err("tripId must not be empty".to_string());
        }
        if self.user_id.trim().is_empty() {
            return Err("userId must not be empty".to_string());
        }

        let mut day_ids = HashSet::new();
        for day in &self.days {
            if !day_ids.insert(day.day_id) {
                return Err(format!("Day {} appears more than once", day.day_id));
            }
            check_destinations(day.day_id, &day.destinations)?;
        }
        Ok(())
    }

    pub fn to_itinerary(&self, created_at: DateTime<Utc>) -> Itinerary {
        Itinerary {
            trip_id: self.trip_id.clone(),
            user_id: self.user_id.clone(),
            trip_name: self.trip_name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub day_id: i64,
    pub destinations: Vec<Destination>,
}

/*
    Response of GET /api/view/{id}
*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryView {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub preferences: Option<Preferences>,
    pub days: Vec<DayView>,
}

/// Entry of GET /api/view and /api/view/user/{userId}. `ownerUsername` is
/// omitted when the owner has no user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySummary {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    #[serde(default, deserialize_with = "scalar::optional_day_number")]
    pub source_day_id: Option<i64>,
    #[serde(default, deserialize_with = "scalar::optional_day_number")]
    pub target_day_id: Option<i64>,
    #[serde(default)]
    pub dest_name: Option<String>,
}
