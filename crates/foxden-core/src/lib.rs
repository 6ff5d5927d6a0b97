pub mod config;
pub mod error;
pub mod models;
pub mod publisher;
pub mod store;
