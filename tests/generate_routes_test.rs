mod common;

use actix_web::test;
use serde_json::{json, Value};
use std::sync::Arc;

use common::{scripted, ScriptedGenerator, TestApp};

const MODEL_REPLY: &str = r#"Here is your trip:
```json
{
    "itinerary": {
        "preferences": { "pace": "relaxed", "budget": "1500", "group": "couple", "interests": ["food"] },
        "days": [
            { "dayNumber": 1, "date": "2024-06-01", "destinations": [
                { "name": "Eiffel Tower", "longitude": "2.2945", "latitude": "48.8584" },
                { "name": "Louvre", "longitude": 2.3376, "latitude": 48.8606 }
            ]}
        ]
    }
}
```"#;

fn generate_body() -> Value {
    json!({
        "startDate": "2024-06-01",
        "endDate": "2024-06-02",
        "group": "couple",
        "pace": "relaxed",
        "interests": ["food", "art"],
        "budget": 1500,
        "destinations": ["Paris"]
    })
}

#[actix_rt::test]
async fn test_generate_returns_raw_text_and_parsed_plan() {
    let generator = Arc::new(ScriptedGenerator::replying(MODEL_REPLY));
    let test_app = TestApp::with_generator(scripted(&generator));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generateItinerary")
        .set_json(&generate_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["itinerary"], MODEL_REPLY);
    assert!(body.get("tripId").is_none());

    let destinations = &body["plan"]["itinerary"]["days"][0]["destinations"];
    assert_eq!(destinations[0]["name"], "Eiffel Tower");
    assert_eq!(destinations[0]["latitude"], 48.8584);
    assert_eq!(destinations[1]["longitude"], 2.3376);

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Destinations: Paris."));
    assert!(prompts[0].contains("Interests: food, art."));
    assert!(prompts[0].contains("Budget: 1500."));
}

#[actix_rt::test]
async fn test_unusable_model_output_is_a_bad_gateway() {
    let generator = Arc::new(ScriptedGenerator::replying("I cannot plan trips, sorry."));
    let test_app = TestApp::with_generator(scripted(&generator));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generateItinerary")
        .set_json(&generate_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
}

#[actix_rt::test]
async fn test_model_failure_is_an_internal_error() {
    let test_app = TestApp::with_generator(scripted(&Arc::new(ScriptedGenerator::empty())));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generateItinerary")
        .set_json(&generate_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Could not generate itinerary"));
}

#[actix_rt::test]
async fn test_generate_validates_request_before_calling_model() {
    let generator = Arc::new(ScriptedGenerator::replying(MODEL_REPLY));
    let test_app = TestApp::with_generator(scripted(&generator));
    let app = test::init_service(test_app.create_app()).await;

    let mut body = generate_body();
    body["destinations"] = json!([]);
    let req = test::TestRequest::post()
        .uri("/api/generateItinerary")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_generate_without_api_key_fails() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generateItinerary")
        .set_json(&generate_body())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 500);
}
