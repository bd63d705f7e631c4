use serde::{Deserialize, Serialize};

use crate::models::itinerary::{check_destinations, Destination, Preferences};
use crate::models::scalar;

/*
    Body of POST /api/generateItinerary
*/
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub pace: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "scalar::loose_string")]
    pub budget: String,
    #[serde(default)]
    pub destinations: Vec<String>,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.start_date.trim().is_empty() || self.end_date.trim().is_empty() {
            return Err("startDate and endDate are required".to_string());
        }
        if self.destinations.iter().all(|d| d.trim().is_empty()) {
            return Err("At least one destination is required".to_string());
        }
        Ok(())
    }
}

/// The JSON shape the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratedPlan {
    pub itinerary: GeneratedItinerary,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratedItinerary {
    #[serde(default)]
    pub preferences: Preferences,
    pub days: Vec<GeneratedDay>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDay {
    #[serde(deserialize_with = "scalar::day_number")]
    pub day_number: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl GeneratedPlan {
    /// Parses model output, tolerating prose or code fences around the JSON object.
    pub fn from_model_text(text: &str) -> Result<Self, String> {
        let start = text.find('{').ok_or("no JSON object in model output")?;
        let end = text.rfind('}').ok_or("no JSON object in model output")?;
        if end < start {
            return Err("no JSON object in model output".to_string());
        }

        let plan: GeneratedPlan = serde_json::from_str(&text[start..=end])
            .map_err(|e| format!("model output does not match the itinerary shape: {}", e))?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), String> {
        if self.itinerary.days.is_empty() {
            return Err("model output contains no days".to_string());
        }
        for day in &self.itinerary.days {
            check_destinations(day.day_number, &day.destinations)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Model text exactly as returned
    pub itinerary: String,
    pub plan: GeneratedPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_TEXT: &str = r#"```json
{
    "itinerary": {
        "preferences": { "pace": "fast", "budget": "2000", "group": "family", "interests": ["food"] },
        "days": [
            { "dayNumber": 1, "date": "2024-06-01", "destinations": [
                { "name": "Eiffel Tower", "longitude": "2.2945", "latitude": "48.8584" }
            ]},
            { "dayNumber": "2", "date": "2024-06-02", "destinations": [] }
        ]
    }
}
```"#;

    #[test]
    fn test_parses_fenced_output_with_string_coordinates() {
        let plan = GeneratedPlan::from_model_text(MODEL_TEXT).unwrap();
        assert_eq!(plan.itinerary.days.len(), 2);
        assert_eq!(plan.itinerary.days[1].day_number, 2);

        let tower = &plan.itinerary.days[0].destinations[0];
        assert_eq!(tower.name, "Eiffel Tower");
        assert_eq!(tower.latitude, 48.8584);
        assert_eq!(tower.longitude, 2.2945);
        assert_eq!(plan.itinerary.preferences.group, "family");
    }

    #[test]
    fn test_rejects_output_without_json() {
        assert!(GeneratedPlan::from_model_text("Sorry, I can't help with that.").is_err());
        assert!(GeneratedPlan::from_model_text("} nothing {").is_err());
    }

    #[test]
    fn test_rejects_wrong_shape_and_empty_days() {
        assert!(GeneratedPlan::from_model_text(r#"{"days": []}"#).is_err());
        assert!(GeneratedPlan::from_model_text(r#"{"itinerary": {"days": []}}"#).is_err());
    }

    #[test]
    fn test_rejects_truncated_output() {
        let truncated = &MODEL_TEXT[..MODEL_TEXT.len() / 2];
        assert!(GeneratedPlan::from_model_text(truncated).is_err());
    }

    #[test]
    fn test_request_requires_destinations() {
        let request = GenerateRequest {
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-03".to_string(),
            group: "solo".to_string(),
            pace: "relaxed".to_string(),
            interests: vec![],
            budget: "500".to_string(),
            destinations: vec![" ".to_string()],
        };
        assert!(request.validate().is_err());
    }
}
