pub mod generation;
pub mod itinerary;
pub mod scalar;
pub mod user;
