// Application layer - Use cases and the seams they depend on
pub mod api_client;
pub mod auth_service;
pub mod battery_api;
pub mod dashboard_service;
pub mod http_transport;
pub mod navigator;
pub mod refresh_scheduler;
pub mod renderer;
pub mod sample_generator;
pub mod session_store;
