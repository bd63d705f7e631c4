use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::models::itinerary::{MoveDestination, NewItinerary};
use crate::state::AppState;

/*
    POST /api/createItinerary
*/
pub async fn create(
    state: web::Data<AppState>,
    input: web::Json<NewItinerary>,
) -> Result<HttpResponse, ApiError> {
    let trip_id = state.itineraries.create(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Itinerary created successfully",
        "tripId": trip_id,
    })))
}

/*
    GET /api/view/{id}
*/
pub async fn view(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let itinerary = state.itineraries.view(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(itinerary))
}

/*
    DELETE /api/view/{id}
*/
pub async fn delete(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.itineraries.delete(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Itinerary and all associated data deleted successfully"
    })))
}

/*
    DELETE /api/view/{id}/{day_id}/{dest_name}
*/
pub async fn delete_destination(
    path: web::Path<(String, i64, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, day_id, dest_name) = path.into_inner();
    state
        .itineraries
        .delete_destination(&trip_id, day_id, &dest_name)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Destination deleted successfully" })))
}

/*
    PUT /api/view/{id}/move-destination
*/
pub async fn move_destination(
    path: web::Path<String>,
    state: web::Data<AppState>,
    input: web::Json<MoveDestination>,
) -> Result<HttpResponse, ApiError> {
    state
        .itineraries
        .move_destination(&path.into_inner(), input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Destination moved successfully" })))
}

/*
    GET /api/view
*/
pub async fn list_all(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let itineraries = state.itineraries.list_all().await?;
    if itineraries.is_empty() {
        return Err(ApiError::NotFound("No itineraries found".to_string()));
    }
    let summaries = state.users.with_owner_names(itineraries).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/*
    GET /api/view/user/{user_id}
*/
pub async fn list_by_owner(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let itineraries = state.itineraries.list_by_owner(&user_id).await?;
    if itineraries.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No itineraries found for user {}",
            user_id
        )));
    }
    let summaries = state.users.with_owner_names(itineraries).await?;
    Ok(HttpResponse::Ok().json(summaries))
}
