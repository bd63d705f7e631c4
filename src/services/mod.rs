pub mod itinerary_generation_service;
pub mod itinerary_service;
pub mod openai_service;
pub mod user_service;
