// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_session_store;
pub mod memory_session_store;
pub mod reqwest_transport;
