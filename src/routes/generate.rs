use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::generation::GenerateRequest;
use crate::state::AppState;

/*
    POST /api/generateItinerary

    Nothing is stored here; the client posts the plan it keeps to /api/createItinerary.
*/
pub async fn generate(
    state: web::Data<AppState>,
    input: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.generation.generate(&input).await?;
    Ok(HttpResponse::Ok().json(response))
}
