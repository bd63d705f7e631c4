use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::user::NewUser;
use crate::state::AppState;

/*
    POST /api/users
*/
pub async fn create(
    state: web::Data<AppState>,
    input: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.create(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/*
    GET /api/users/{id}
*/
pub async fn get_by_id(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/*
    GET /api/users/username/{username}
*/
pub async fn get_by_username(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.find_by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/*
    PUT /api/users/{id}/saved/{trip_id}
*/
pub async fn save_itinerary(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, trip_id) = path.into_inner();
    let user = state.users.save_itinerary(&user_id, &trip_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/*
    DELETE /api/users/{id}/saved/{trip_id}
*/
pub async fn unsave_itinerary(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, trip_id) = path.into_inner();
    let user = state.users.unsave_itinerary(&user_id, &trip_id).await?;
    Ok(HttpResponse::Ok().json(user))
}
