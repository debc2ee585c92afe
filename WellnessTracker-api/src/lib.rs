// WellnessTracker-api lib.rs
//
// HTTP surface of the WellnessTracker service: configuration, public
// entities, handlers, routing and the OpenAPI document.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::routes::{create_app, AppState};
pub use config::AppConfig;
