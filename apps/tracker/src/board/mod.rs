pub mod drag;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod mutation;
pub mod service;
pub mod status;
pub mod store;
