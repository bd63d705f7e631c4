use std::sync::Arc;

use log::{error, warn};

use crate::error::ApiError;
use crate::models::generation::{GenerateRequest, GenerateResponse, GeneratedPlan};
use crate::services::openai_service::TextGenerator;

const RESPONSE_SHAPE: &str = r#"{
    "itinerary": {
        "preferences": {
            "pace": "<input>",
            "budget": "<input>",
            "group": "<input>",
            "interests": ["<input1>", "<input2>"]
        },
        "days": [
            {
                "dayNumber": <output>,
                "date": "<output>",
                "destinations": [
                    {
                        "name": "<output>",
                        "longitude": "<output>",
                        "latitude": "<output>"
                    }
                ]
            }
        ]
    }
}"#;

pub fn build_prompt(request: &GenerateRequest) -> String {
    format!(
        "Generate an itinerary from {start} to {end} for a {group} with a {pace} pace.\n\
         Interests: {interests}.\n\
         Budget: {budget}.\n\
         Destinations: {destinations}.\n\
         Respond with JSON only, no commentary, in this format:\n{shape}",
        start = request.start_date,
        end = request.end_date,
        group = request.group,
        pace = request.pace,
        interests = request.interests.join(", "),
        budget = request.budget,
        destinations = request.destinations.join(", "),
        shape = RESPONSE_SHAPE,
    )
}

#[derive(Clone)]
pub struct ItineraryGenerationService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ItineraryGenerationService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Asks the model for an itinerary and checks the reply against the
    /// requested shape. The raw text is handed back next to the parsed plan.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        request.validate().map_err(ApiError::BadRequest)?;

        let generator = self.generator.as_ref().ok_or_else(|| {
            ApiError::Internal("Text generation is not configured".to_string())
        })?;

        let prompt = build_prompt(request);
        let text = generator.complete(&prompt).await.map_err(|e| {
            error!("Itinerary generation failed: {}", e);
            ApiError::Internal(format!("Could not generate itinerary: {}", e))
        })?;

        match GeneratedPlan::from_model_text(&text) {
            Ok(plan) => Ok(GenerateResponse {
                itinerary: text,
                plan,
            }),
            Err(reason) => {
                warn!("Rejected model output: {}", reason);
                Err(ApiError::BadGateway(format!(
                    "Generated itinerary was not usable: {}",
                    reason
                )))
            }
        }
    }
}
