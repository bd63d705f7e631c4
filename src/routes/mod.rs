use actix_web::web;

use crate::error::ApiError;

pub mod generate;
pub mod health;
pub mod itinerary;
pub mod user;

/// Route table shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    // Only a non-numeric day id can fail to extract; such a day cannot exist.
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::NotFound(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api")
            .route("/createItinerary", web::post().to(itinerary::create))
            .route("/generateItinerary", web::post().to(generate::generate))
            .route("/view", web::get().to(itinerary::list_all))
            .route("/view/user/{user_id}", web::get().to(itinerary::list_by_owner))
            .service(
                web::resource("/view/{id}")
                    .route(web::get().to(itinerary::view))
                    .route(web::delete().to(itinerary::delete)),
            )
            .route(
                "/view/{id}/move-destination",
                web::put().to(itinerary::move_destination),
            )
            .route(
                "/view/{id}/{day_id}/{dest_name}",
                web::delete().to(itinerary::delete_destination),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(user::create))
                    .route("/username/{username}", web::get().to(user::get_by_username))
                    .route("/{id}", web::get().to(user::get_by_id))
                    .service(
                        web::resource("/{id}/saved/{trip_id}")
                            .route(web::put().to(user::save_itinerary))
                            .route(web::delete().to(user::unsave_itinerary)),
                    ),
            ),
    );
}
