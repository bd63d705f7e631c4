use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let store = match state.itineraries.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    health.services.insert("store".to_string(), store.clone());

    // Only whether a key was supplied; the model API is not called from here.
    let generation = if state.generation.is_configured() {
        ServiceStatus {
            status: "ok".to_string(),
            details: None,
        }
    } else {
        ServiceStatus {
            status: "unconfigured".to_string(),
            details: Some("OPENAI_API_KEY not set".to_string()),
        }
    };
    health
        .services
        .insert("text_generation".to_string(), generation);

    if store.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}
